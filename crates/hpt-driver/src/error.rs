use hpt_reader::FramerError;

/// Failures reported by an [`Engine`](crate::Engine) implementation.
///
/// These are transport-level failures: the engine could not be reached
/// or did not answer. A task the engine answered with a negative
/// [`Status`](crate::Status) is *not* an `EngineError`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// `initialize` failed; nothing can be dispatched.
    #[error("engine unavailable: {reason}")]
    Unavailable { reason: String },

    /// `submit` failed to deliver a task or receive its answer.
    #[error("task submission failed: {reason}")]
    Submit { reason: String },

    /// `terminate` failed to release the engine.
    #[error("engine shutdown failed: {reason}")]
    Terminate { reason: String },
}

/// Errors that end a dispatch run as fatal.
///
/// ```text
/// ┌─────────┬─────────────────────────────────────────────┐
/// │ Variant │ Cause                                       │
/// ├─────────┼─────────────────────────────────────────────┤
/// │ Framing │ malformed or truncated frame in the input   │
/// │ Submit  │ engine failed on a task                     │
/// │ Engine  │ engine could not be shut down               │
/// │ Report  │ report output could not be written          │
/// └─────────┴─────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Framing(#[from] FramerError),

    #[error("engine failed on task at line {line}: {source}")]
    Submit {
        line: u64,
        #[source]
        source: EngineError,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}
