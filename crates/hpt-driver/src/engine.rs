use std::fmt;

use serde::Serialize;

use crate::error::EngineError;

/// Return state of a firmware task, as reported by the engine.
///
/// ```text
/// ┌───────────────┬───────────┬──────────────────────────────────┐
/// │ Value         │ Severity  │ Dispatcher reaction              │
/// ├───────────────┼───────────┼──────────────────────────────────┤
/// │ 0             │ Ok        │ continue                         │
/// │ -1            │ Warning   │ report, count, continue          │
/// │ -2 ..= -999   │ Error     │ report, count, continue          │
/// │ -1000         │ Halt      │ report, stop gracefully          │
/// │ anything else │ Unknown   │ report, count as error, continue │
/// └───────────────┴───────────┴──────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Status(pub i32);

impl Status {
    pub const OK: Self = Self(0);
    pub const WARNING: Self = Self(-1);
    /// The engine asks the caller to stop sending tasks.
    pub const HALT: Self = Self(-1000);

    #[must_use]
    pub fn severity(self) -> Severity {
        match self.0 {
            0 => Severity::Ok,
            -1 => Severity::Warning,
            -999..=-2 => Severity::Error,
            -1000 => Severity::Halt,
            _ => Severity::Unknown,
        }
    }

    #[must_use]
    pub fn is_halt(self) -> bool {
        self == Self::HALT
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warning,
    Error,
    Halt,
    Unknown,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Halt => "halt",
            Self::Unknown => "unknown",
        }
    }
}

/// Answer to one submitted task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineResponse {
    /// Answer bytes; may be empty. Sized by the engine, never truncated.
    pub answer: Vec<u8>,
    pub status: Status,
}

impl EngineResponse {
    #[must_use]
    pub fn ok(answer: impl Into<Vec<u8>>) -> Self {
        Self {
            answer: answer.into(),
            status: Status::OK,
        }
    }
}

/// The processing engine a dispatcher feeds.
///
/// Implementations wrap the tester firmware binding (or a stand-in). The
/// lifecycle is strict and enforced by [`EngineSession`](crate::EngineSession):
///
/// ```text
///   initialize ──▶ submit* ──▶ terminate
/// ```
///
/// Calls are blocking and never overlap.
pub trait Engine {
    /// Connect to the engine. Called once, before any task.
    ///
    /// # Errors
    ///
    /// [`EngineError::Unavailable`] when the engine cannot be reached.
    fn initialize(&mut self) -> Result<(), EngineError>;

    /// Run one task and return its answer.
    ///
    /// # Errors
    ///
    /// [`EngineError::Submit`] when the task could not be delivered or the
    /// answer could not be received. A task that ran and failed returns
    /// `Ok` with a negative [`Status`].
    fn submit(&mut self, task: &[u8]) -> Result<EngineResponse, EngineError>;

    /// Release the engine. Called once, after the last task.
    ///
    /// # Errors
    ///
    /// [`EngineError::Terminate`] when the engine could not be released.
    fn terminate(&mut self) -> Result<(), EngineError>;

    /// Process exit code for a run the engine halted with [`Status::HALT`].
    fn pass_exit_code(&self) -> u8 {
        0
    }
}
