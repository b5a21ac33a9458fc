use crate::segment::BinarySegment;

/// What a frame is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// A firmware task, to be submitted to the engine.
    Task,

    /// A `hp93000,...` header record. Reported and dropped.
    ControlHeader,
}

/// One complete protocol message.
///
/// ```text
/// ┌──────────────────────────────┬─────────────────────────────┐
/// │ line (line_len bytes, incl.  │ binary tail (extra bytes,   │
/// │ terminator and marker)       │ only if segment is Some)    │
/// └──────────────────────────────┴─────────────────────────────┘
/// ```
///
/// A frame owns its buffer. It is produced by the reader, handed to the
/// dispatcher by value and dropped at the end of that iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Full frame bytes: the line followed by any binary tail.
    pub bytes: Vec<u8>,

    /// Length of the line part of `bytes`.
    pub line_len: usize,

    /// Binary segment descriptor, when the line carried a marker.
    pub segment: Option<BinarySegment>,

    pub kind: FrameKind,

    /// 1-based line number of the frame's first line in the stream.
    pub line_number: u64,
}

impl Frame {
    /// Total frame length, `line_len + extra`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The line as read, terminator included.
    #[must_use]
    pub fn line(&self) -> &[u8] {
        &self.bytes[..self.line_len]
    }

    /// Bytes consumed from the stream after the line.
    #[must_use]
    pub fn tail(&self) -> &[u8] {
        &self.bytes[self.line_len..]
    }

    /// Number of extra bytes the segment header asked for (0 without one).
    #[must_use]
    pub fn extra(&self) -> usize {
        self.segment.map_or(0, |s| s.extra)
    }

    #[must_use]
    pub fn is_task(&self) -> bool {
        self.kind == FrameKind::Task
    }
}
