#![warn(clippy::pedantic)]

pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod offline;
pub mod report;
pub mod session;

pub use classifier::should_dispatch;
pub use config::{DispatchConfig, ReportFormat};
pub use dispatch::{DispatchStats, Dispatcher, EndReason, RunSummary};
pub use engine::{Engine, EngineResponse, Severity, Status};
pub use error::{DriverError, EngineError};
pub use offline::OfflineEngine;
pub use report::Reporter;
pub use session::EngineSession;
