use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, StdinLock};
use std::path::Path;

use tracing::info;

use crate::error::SourceError;
use crate::pipe::DecompressPipe;

/// Compression formats recognised by file suffix.
///
/// ```text
/// ┌────────┬────────────┬──────────────────────────────────┐
/// │ Suffix │ Variant    │ Decompressed by                  │
/// ├────────┼────────────┼──────────────────────────────────┤
/// │ .gz    │ Gzip       │ `gzip -dc`  (child process)      │
/// │ .bz2   │ Bzip2      │ `bzip2 -dc` (child process)      │
/// │ .xz    │ Xz         │ `xz -dc`    (child process)      │
/// │ .zst   │ Zstd       │ zstd crate  (in-process)         │
/// └────────┴────────────┴──────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decompressor {
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Decompressor {
    pub const ALL: [Self; 4] = [Self::Gzip, Self::Bzip2, Self::Xz, Self::Zstd];

    /// The file suffix, leading dot included.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Gzip => ".gz",
            Self::Bzip2 => ".bz2",
            Self::Xz => ".xz",
            Self::Zstd => ".zst",
        }
    }

    /// External command that decompresses this format, or `None` when the
    /// format is handled in-process.
    #[must_use]
    pub fn program(self) -> Option<&'static str> {
        match self {
            Self::Gzip => Some("gzip"),
            Self::Bzip2 => Some("bzip2"),
            Self::Xz => Some("xz"),
            Self::Zstd => None,
        }
    }

    /// Select a format by comparing the full suffix against the end of the
    /// path. Each comparison uses that suffix's own length.
    #[must_use]
    pub fn for_path(path: &Path) -> Option<Self> {
        let name = path.as_os_str().as_encoded_bytes();
        Self::ALL
            .into_iter()
            .find(|d| name.ends_with(d.suffix().as_bytes()))
    }
}

/// Where an [`InputStream`] gets its bytes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Stdin,
    /// A file read as-is.
    Plain,
    /// A file read through a decompressor.
    Compressed(Decompressor),
}

impl SourceKind {
    /// The source [`resolve`] would pick for `path`.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        Decompressor::for_path(path).map_or(Self::Plain, Self::Compressed)
    }
}

/// A readable byte stream for the framer.
///
/// Close it with [`close`](Self::close) after reading to the end so a
/// failing decompressor is noticed. Dropping it instead stops and reaps any
/// decompression process without checking its exit status.
pub struct InputStream {
    inner: Inner,
    kind: SourceKind,
}

enum Inner {
    Stdin(StdinLock<'static>),
    Plain(BufReader<File>),
    Pipe(DecompressPipe),
    Zstd(BufReader<zstd::stream::read::Decoder<'static, BufReader<File>>>),
}

/// Open `path` for framing, decompressing by suffix.
///
/// # Errors
///
/// - [`SourceError::Open`] if the file cannot be opened (for every suffix).
/// - [`SourceError::Spawn`] if the decompression command cannot start.
pub fn resolve(path: &Path) -> Result<InputStream, SourceError> {
    let kind = SourceKind::for_path(path);
    let open_error = |source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_error)?;

    let inner = match kind {
        SourceKind::Compressed(tool) => match tool.program() {
            Some(program) => Inner::Pipe(DecompressPipe::spawn(program, path, file)?),
            None => {
                let decoder = zstd::stream::read::Decoder::new(file).map_err(open_error)?;
                Inner::Zstd(BufReader::new(decoder))
            }
        },
        SourceKind::Plain | SourceKind::Stdin => Inner::Plain(BufReader::new(file)),
    };

    info!(path = %path.display(), ?kind, "input opened");
    Ok(InputStream { inner, kind })
}

/// The process's standard input as a stream.
#[must_use]
pub fn resolve_stdin() -> InputStream {
    InputStream {
        inner: Inner::Stdin(io::stdin().lock()),
        kind: SourceKind::Stdin,
    }
}

impl InputStream {
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Release the stream after a clean end of input.
    ///
    /// # Errors
    ///
    /// [`SourceError::DecompressorFailed`] if the decompression command
    /// exited unsuccessfully, [`SourceError::Reap`] if waiting for it failed.
    pub fn close(self) -> Result<(), SourceError> {
        match self.inner {
            Inner::Pipe(pipe) => pipe.finish(),
            Inner::Stdin(_) | Inner::Plain(_) | Inner::Zstd(_) => Ok(()),
        }
    }
}

impl Read for InputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Stdin(r) => r.read(buf),
            Inner::Plain(r) => r.read(buf),
            Inner::Pipe(r) => r.read(buf),
            Inner::Zstd(r) => r.read(buf),
        }
    }
}

impl BufRead for InputStream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match &mut self.inner {
            Inner::Stdin(r) => r.fill_buf(),
            Inner::Plain(r) => r.fill_buf(),
            Inner::Pipe(r) => r.fill_buf(),
            Inner::Zstd(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match &mut self.inner {
            Inner::Stdin(r) => r.consume(amt),
            Inner::Plain(r) => r.consume(amt),
            Inner::Pipe(r) => r.consume(amt),
            Inner::Zstd(r) => r.consume(amt),
        }
    }
}
