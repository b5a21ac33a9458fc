//! Shared fixtures for the integration tests and benches.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use hpt_driver::{Engine, EngineError, EngineResponse, Status};

/// Build a well-formed binary-segment frame: `prefix`, the `#9` header with
/// the payload length in nine digits, the payload, and a closing newline.
///
/// The payload may contain newlines. `prefix` must not contain `#90`.
#[must_use]
pub fn binary_task(prefix: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut frame = prefix.to_vec();
    frame.extend_from_slice(format!("#9{:09}", payload.len()).as_bytes());
    frame.extend_from_slice(payload);
    frame.push(b'\n');
    frame
}

/// A configuration file of `tasks` frames: one control header, then
/// alternating plain tasks and binary tasks carrying `payload_len` bytes.
#[must_use]
pub fn config_file(tasks: usize, payload_len: usize) -> Vec<u8> {
    let payload: Vec<u8> = (0..payload_len)
        .map(|i| if i % 64 == 63 { b'\n' } else { b'a' + (i % 26) as u8 })
        .collect();
    let mut out = b"hp93000,config,0.1\n".to_vec();
    for i in 0..tasks {
        if i % 2 == 0 {
            out.extend_from_slice(format!("DFPN {i},\"pin{i}\",(p{i})\n").as_bytes());
        } else {
            out.extend_from_slice(&binary_task(format!("VECD PARA,{i},").as_bytes(), &payload));
        }
    }
    out
}

/// Everything a [`RecordingEngine`] saw, shared with the test after the
/// engine has been moved into a session.
#[derive(Clone, Debug, Default)]
pub struct Recording {
    pub tasks: Rc<RefCell<Vec<Vec<u8>>>>,
    pub lifecycle: Rc<RefCell<Vec<&'static str>>>,
}

/// Engine that records tasks and answers from a status script.
///
/// The answer to each task is `ACK <task length>`. Once the script runs
/// out every task is answered with status 0.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    statuses: VecDeque<i32>,
    pass_code: u8,
    recording: Recording,
}

impl RecordingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = i32>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_pass_code(mut self, code: u8) -> Self {
        self.pass_code = code;
        self
    }

    #[must_use]
    pub fn recording(&self) -> Recording {
        self.recording.clone()
    }
}

impl Engine for RecordingEngine {
    fn initialize(&mut self) -> Result<(), EngineError> {
        self.recording.lifecycle.borrow_mut().push("initialize");
        Ok(())
    }

    fn submit(&mut self, task: &[u8]) -> Result<EngineResponse, EngineError> {
        self.recording.tasks.borrow_mut().push(task.to_vec());
        Ok(EngineResponse {
            answer: format!("ACK {}", task.len()).into_bytes(),
            status: Status(self.statuses.pop_front().unwrap_or(0)),
        })
    }

    fn terminate(&mut self) -> Result<(), EngineError> {
        self.recording.lifecycle.borrow_mut().push("terminate");
        Ok(())
    }

    fn pass_exit_code(&self) -> u8 {
        self.pass_code
    }
}
