use hpt_wire::{Frame, FrameKind};

/// Whether `frame` goes to the engine.
///
/// Control headers (`hp93000,...`) are dropped; every task is dispatched,
/// binary segment or not.
#[must_use]
pub fn should_dispatch(frame: &Frame) -> bool {
    match frame.kind {
        FrameKind::Task => true,
        FrameKind::ControlHeader => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpt_reader::FrameReader;

    #[test]
    fn headers_are_dropped_and_tasks_kept() {
        let input: &[u8] = b"hp93000,config,0.1\nFTST?\nPUT #9000000002ok\n";
        let verdicts: Vec<bool> = FrameReader::new(input)
            .map(|f| should_dispatch(&f.unwrap()))
            .collect();
        assert_eq!(verdicts, [false, true, true]);
    }
}
