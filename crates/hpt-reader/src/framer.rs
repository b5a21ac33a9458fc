use std::io::{BufRead, Read};

use hpt_wire::record::is_control_header;
use hpt_wire::{BinarySegment, Frame, FrameKind};
use tracing::debug;

use crate::error::FramerError;

/// Maximum number of line bytes quoted in an error preview.
const PREVIEW_LEN: usize = 48;

/// Pulls complete frames out of a line-oriented byte stream.
///
/// Each call to [`next_frame`](Self::next_frame) reads one line and, when
/// that line carries a binary segment header, exactly the number of raw
/// bytes the header still owes. A frame is never split across calls.
///
/// ```text
///   read_until('\n') ──▶ control header? ──yes──▶ Frame(ControlHeader)
///                              │ no
///                              ▼
///                        marker present? ──no──▶ Frame(Task)
///                              │ yes
///                              ▼
///                  parse length, compute extra
///                              │
///                              ▼
///                 read exactly `extra` bytes ──▶ Frame(Task)
/// ```
///
/// # Example
///
/// ```rust
/// use hpt_reader::FrameReader;
///
/// let input: &[u8] = b"hp93000,config,0.1\nFTST?\n";
/// let mut reader = FrameReader::new(input);
/// let header = reader.next_frame().unwrap().unwrap();
/// assert!(!header.is_task());
/// let task = reader.next_frame().unwrap().unwrap();
/// assert_eq!(task.bytes, b"FTST?\n");
/// assert!(reader.next_frame().unwrap().is_none());
/// ```
pub struct FrameReader<R> {
    reader: R,
    state: ReaderState,
    /// Physical lines consumed so far, newlines inside binary tails included.
    line_number: u64,
}

/// `Reading` until the stream ends or a frame fails, then `Done` for good.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReaderState {
    Reading,
    Done,
}

impl<R: BufRead> FrameReader<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            state: ReaderState::Reading,
            line_number: 0,
        }
    }

    /// Read the next frame.
    ///
    /// Returns `Ok(None)` at end of stream. After an error or end of stream
    /// every further call returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - [`FramerError::Malformed`] if the segment header is bad or the
    ///   computed extra byte count is negative.
    /// - [`FramerError::Truncated`] if the stream ends inside the segment.
    /// - [`FramerError::Oversized`] if the buffer cannot grow.
    /// - [`FramerError::Io`] on read failure.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, FramerError> {
        if self.state == ReaderState::Done {
            return Ok(None);
        }

        let result = self.read_frame();
        if !matches!(result, Ok(Some(_))) {
            self.state = ReaderState::Done;
        }
        result
    }

    /// Number of lines read so far.
    #[must_use]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    #[must_use]
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Give back the underlying stream, e.g. to close it.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, FramerError> {
        let line = self.line_number + 1;
        let mut bytes = Vec::new();

        let line_len = self
            .reader
            .read_until(b'\n', &mut bytes)
            .map_err(|source| FramerError::Io { line, source })?;
        if line_len == 0 {
            return Ok(None);
        }
        self.line_number = line;

        if is_control_header(&bytes) {
            return Ok(Some(Frame {
                bytes,
                line_len,
                segment: None,
                kind: FrameKind::ControlHeader,
                line_number: line,
            }));
        }

        let segment = BinarySegment::locate(&bytes).map_err(|source| FramerError::Malformed {
            line,
            preview: preview(&bytes),
            source,
        })?;

        if let Some(seg) = segment {
            debug!(
                line,
                declared_len = seg.declared_len,
                extra = seg.extra,
                "binary segment"
            );
            self.read_tail(&mut bytes, seg.extra, line)?;
            let tail_lines = bytes[line_len..].iter().filter(|&&b| b == b'\n').count();
            self.line_number += tail_lines as u64;
        }

        Ok(Some(Frame {
            bytes,
            line_len,
            segment,
            kind: FrameKind::Task,
            line_number: line,
        }))
    }

    /// Append exactly `extra` raw bytes to `bytes`.
    fn read_tail(
        &mut self,
        bytes: &mut Vec<u8>,
        extra: usize,
        line: u64,
    ) -> Result<(), FramerError> {
        if extra == 0 {
            return Ok(());
        }

        let requested = extra.saturating_add(1);
        bytes
            .try_reserve_exact(requested)
            .map_err(|_| FramerError::Oversized { line, requested })?;

        let actual = (&mut self.reader)
            .take(extra as u64)
            .read_to_end(bytes)
            .map_err(|source| FramerError::Io { line, source })?;

        if actual == extra {
            Ok(())
        } else {
            Err(FramerError::Truncated {
                line,
                expected: extra,
                actual,
            })
        }
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<Frame, FramerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}

/// Start of a line for diagnostics, lossy and without the terminator.
fn preview(line: &[u8]) -> String {
    let end = line.len().min(PREVIEW_LEN);
    let text = String::from_utf8_lossy(&line[..end]);
    let text = text.trim_end_matches(['\r', '\n']);
    if line.len() > PREVIEW_LEN {
        format!("{text:?}...")
    } else {
        format!("{text:?}")
    }
}
