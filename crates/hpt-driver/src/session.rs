use tracing::{debug, warn};

use crate::engine::{Engine, EngineResponse};
use crate::error::EngineError;

/// An initialized engine, terminated exactly once.
///
/// `open` runs `initialize`; `close` runs `terminate` and reports its
/// result. A session dropped without `close` (an early return, a panic
/// unwinding through the dispatcher) still terminates the engine and
/// logs any failure.
pub struct EngineSession<E: Engine> {
    engine: E,
    live: bool,
}

impl<E: Engine> EngineSession<E> {
    /// Initialize `engine` and wrap it.
    ///
    /// # Errors
    ///
    /// Whatever `initialize` returns. The engine is not terminated in that
    /// case since it never came up.
    pub fn open(mut engine: E) -> Result<Self, EngineError> {
        engine.initialize()?;
        debug!("engine session opened");
        Ok(Self { engine, live: true })
    }

    /// Submit one task.
    ///
    /// # Errors
    ///
    /// Whatever the engine's `submit` returns.
    pub fn submit(&mut self, task: &[u8]) -> Result<EngineResponse, EngineError> {
        self.engine.submit(task)
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Terminate the engine.
    ///
    /// # Errors
    ///
    /// Whatever the engine's `terminate` returns.
    pub fn close(mut self) -> Result<(), EngineError> {
        self.live = false;
        let result = self.engine.terminate();
        debug!(ok = result.is_ok(), "engine session closed");
        result
    }
}

impl<E: Engine> Drop for EngineSession<E> {
    fn drop(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        if let Err(e) = self.engine.terminate() {
            warn!(error = %e, "engine shutdown failed");
        }
    }
}
