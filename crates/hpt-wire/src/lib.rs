#![warn(clippy::pedantic)]

pub mod error;
pub mod frame;
pub mod record;
pub mod segment;

pub use error::WireError;
pub use frame::{Frame, FrameKind};
pub use record::ControlHeader;
pub use segment::BinarySegment;
