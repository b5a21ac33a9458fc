use tracing::{debug, info};

use crate::engine::{Engine, EngineResponse};
use crate::error::EngineError;

/// Stand-in engine for hosts without the tester firmware binding.
///
/// Every task is acknowledged with an empty answer and status 0, which
/// makes the binary usable for checking how a file frames before it is
/// sent to a live tester.
#[derive(Debug, Default)]
pub struct OfflineEngine {
    submitted: u64,
}

impl OfflineEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}

impl Engine for OfflineEngine {
    fn initialize(&mut self) -> Result<(), EngineError> {
        info!("no firmware binding linked; tasks are acknowledged without execution");
        Ok(())
    }

    fn submit(&mut self, task: &[u8]) -> Result<EngineResponse, EngineError> {
        self.submitted += 1;
        debug!(len = task.len(), "offline submit");
        Ok(EngineResponse::ok(Vec::new()))
    }

    fn terminate(&mut self) -> Result<(), EngineError> {
        info!(submitted = self.submitted, "offline engine terminated");
        Ok(())
    }
}
