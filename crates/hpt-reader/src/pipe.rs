use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::{debug, warn};

use crate::error::SourceError;

/// A running `<tool> -dc` process whose stdout is the decompressed stream.
///
/// The compressed file is opened by the caller and becomes the child's
/// stdin. The child is always reaped: by [`finish`](Self::finish) after a
/// clean read, or by `Drop` (kill, then wait) on every other path.
pub(crate) struct DecompressPipe {
    child: Child,
    stdout: BufReader<ChildStdout>,
    program: &'static str,
    path: PathBuf,
    reaped: bool,
}

impl DecompressPipe {
    pub(crate) fn spawn(
        program: &'static str,
        path: &Path,
        input: File,
    ) -> Result<Self, SourceError> {
        let spawn_error = |source| SourceError::Spawn {
            program,
            path: path.to_path_buf(),
            source,
        };

        let mut child = Command::new(program)
            .arg("-dc")
            .stdin(Stdio::from(input))
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error)?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_error(io::Error::other("child stdout was not captured")));
        };

        debug!(program, pid = child.id(), "decompressor started");
        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            program,
            path: path.to_path_buf(),
            reaped: false,
        })
    }

    /// Wait for the child after its output has been read to the end.
    pub(crate) fn finish(mut self) -> Result<(), SourceError> {
        let status = self.child.wait().map_err(|source| SourceError::Reap {
            program: self.program,
            source,
        })?;
        self.reaped = true;

        if status.success() {
            Ok(())
        } else {
            Err(SourceError::DecompressorFailed {
                program: self.program,
                path: self.path.clone(),
                status,
            })
        }
    }
}

impl Read for DecompressPipe {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdout.read(buf)
    }
}

impl BufRead for DecompressPipe {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.stdout.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.stdout.consume(amt);
    }
}

impl Drop for DecompressPipe {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        // Output was not drained; the child may be blocked on a full pipe.
        let _ = self.child.kill();
        match self.child.wait() {
            Ok(status) => debug!(program = self.program, %status, "decompressor stopped"),
            Err(e) => warn!(program = self.program, error = %e, "failed to reap decompressor"),
        }
    }
}
