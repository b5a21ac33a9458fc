#![warn(clippy::pedantic)]

pub mod error;
pub mod framer;
pub mod source;

mod pipe;

pub use error::{FramerError, SourceError};
pub use framer::FrameReader;
pub use source::{Decompressor, InputStream, SourceKind, resolve, resolve_stdin};
