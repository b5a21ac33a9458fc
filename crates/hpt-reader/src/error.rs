use std::path::PathBuf;
use std::process::ExitStatus;

use hpt_wire::WireError;

/// Errors that stop the framer.
///
/// Each variant names the 1-based line where the frame started, so a
/// diagnostic can point at the offending record in a multi-megabyte
/// configuration file.
///
/// ```text
///   FramerError
///   ├── Malformed(WireError)   ← bad segment header / negative extra
///   ├── Truncated              ← stream ended inside a binary segment
///   ├── Oversized              ← buffer could not grow to the declared size
///   └── Io                     ← underlying read failed
/// ```
#[derive(Debug, thiserror::Error)]
pub enum FramerError {
    /// The line carries a marker but its segment header is unusable.
    #[error("malformed frame at line {line} ({preview}): {source}")]
    Malformed {
        line: u64,
        preview: String,
        #[source]
        source: WireError,
    },

    /// The stream closed before the declared binary segment was complete.
    #[error("truncated binary segment at line {line}: expected {expected} more byte(s), got {actual}")]
    Truncated {
        line: u64,
        expected: usize,
        actual: usize,
    },

    /// The frame buffer could not be grown to hold the binary segment.
    #[error("binary segment at line {line} too large: cannot allocate {requested} byte(s)")]
    Oversized { line: u64, requested: usize },

    #[error("read error at line {line}: {source}")]
    Io {
        line: u64,
        #[source]
        source: std::io::Error,
    },
}

impl FramerError {
    /// Line number of the frame that failed.
    #[must_use]
    pub fn line(&self) -> u64 {
        match self {
            Self::Malformed { line, .. }
            | Self::Truncated { line, .. }
            | Self::Oversized { line, .. }
            | Self::Io { line, .. } => *line,
        }
    }
}

/// Errors from opening an input source or shutting it down.
///
/// Kept distinct from [`FramerError`] so the caller can tell "could not
/// read the file at all" apart from "the file is not valid".
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file itself could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external decompression command could not be started.
    #[error("failed to start `{program}` for {}: {source}", path.display())]
    Spawn {
        program: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The decompression command exited unsuccessfully.
    #[error("`{program}` failed on {} ({status})", path.display())]
    DecompressorFailed {
        program: &'static str,
        path: PathBuf,
        status: ExitStatus,
    },

    /// Waiting for the decompression command failed.
    #[error("failed to reap `{program}`: {source}")]
    Reap {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
}
