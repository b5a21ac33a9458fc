use std::io::{BufRead, Write};

use hpt_reader::FrameReader;
use hpt_wire::record::SUPPORTED_VERSION;
use hpt_wire::{ControlHeader, Frame};
use tracing::{debug, info, warn};

use crate::classifier::should_dispatch;
use crate::engine::{Engine, Severity, Status};
use crate::error::DriverError;
use crate::report::Reporter;
use crate::session::EngineSession;

/// How a run that did not fail came to an end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// The input was exhausted.
    EndOfStream,

    /// The engine answered a task with [`Status::HALT`]. `exit_code` is the
    /// engine's pass code.
    Halted { status: Status, exit_code: u8 },
}

/// Counters for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Frames produced by the reader, discarded ones included.
    pub frames: u64,
    pub dispatched: u64,
    pub discarded: u64,
    /// Tasks answered with a warning status.
    pub warnings: u64,
    /// Tasks answered with an error or unrecognized status.
    pub errors: u64,
    /// Raw bytes read after segment lines.
    pub binary_bytes: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub end: EndReason,
    pub stats: DispatchStats,
}

impl RunSummary {
    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self.end {
            EndReason::EndOfStream => 0,
            EndReason::Halted { exit_code, .. } => exit_code,
        }
    }
}

/// Loop state after one step.
///
/// ```text
///   Running ──(frame handled)──▶ Running
///   Running ──(reader: end)────▶ Eof      success
///   Running ──(status HALT)────▶ Halted   success, engine pass code
///   Running ──(any Err)────────▶ Fatal    returned as DriverError
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopState {
    Running,
    Eof,
    Halted(Status),
}

/// Feeds frames to an engine session and reports every answer.
///
/// The dispatcher owns the session for the whole run. [`run`](Self::run)
/// consumes it and terminates the engine on every exit path, including
/// framing and engine failures.
///
/// ```text
///   FrameReader ──▶ should_dispatch ──no──▶ Reporter::discarded
///                        │ yes
///                        ▼
///               EngineSession::submit ──▶ Reporter::dispatched
/// ```
pub struct Dispatcher<E: Engine, W: Write> {
    session: EngineSession<E>,
    reporter: Reporter<W>,
    stats: DispatchStats,
}

impl<E: Engine, W: Write> Dispatcher<E, W> {
    pub fn new(session: EngineSession<E>, reporter: Reporter<W>) -> Self {
        Self {
            session,
            reporter,
            stats: DispatchStats::default(),
        }
    }

    /// Dispatch frames until end of stream, a halt status, or a failure.
    ///
    /// # Errors
    ///
    /// - [`DriverError::Framing`] for a malformed or truncated frame.
    /// - [`DriverError::Submit`] if the engine fails on a task.
    /// - [`DriverError::Engine`] if terminating the engine fails after an
    ///   otherwise clean run.
    /// - [`DriverError::Report`] if the report cannot be written.
    pub fn run<R: BufRead>(mut self, frames: &mut FrameReader<R>) -> Result<RunSummary, DriverError> {
        let outcome = self.drive(frames).and_then(|end| {
            self.reporter.flush()?;
            Ok(end)
        });

        let Self { session, stats, .. } = self;
        let closed = session.close();

        match (outcome, closed) {
            (Ok(end), Ok(())) => {
                info!(
                    ?end,
                    frames = stats.frames,
                    dispatched = stats.dispatched,
                    discarded = stats.discarded,
                    warnings = stats.warnings,
                    errors = stats.errors,
                    "dispatch finished"
                );
                Ok(RunSummary { end, stats })
            }
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "engine shutdown failed after fatal error");
                }
                Err(e)
            }
        }
    }

    fn drive<R: BufRead>(&mut self, frames: &mut FrameReader<R>) -> Result<EndReason, DriverError> {
        loop {
            match self.step(frames)? {
                LoopState::Running => {}
                LoopState::Eof => return Ok(EndReason::EndOfStream),
                LoopState::Halted(status) => {
                    return Ok(EndReason::Halted {
                        status,
                        exit_code: self.session.engine().pass_exit_code(),
                    });
                }
            }
        }
    }

    /// Handle one frame. The frame is dropped when this returns.
    fn step<R: BufRead>(&mut self, frames: &mut FrameReader<R>) -> Result<LoopState, DriverError> {
        let Some(frame) = frames.next_frame()? else {
            return Ok(LoopState::Eof);
        };
        self.stats.frames += 1;

        if !should_dispatch(&frame) {
            check_header(&frame);
            self.stats.discarded += 1;
            self.reporter.discarded(&frame)?;
            return Ok(LoopState::Running);
        }

        let response = self
            .session
            .submit(&frame.bytes)
            .map_err(|source| DriverError::Submit {
                line: frame.line_number,
                source,
            })?;
        self.stats.dispatched += 1;
        self.stats.binary_bytes += frame.extra() as u64;
        self.reporter.dispatched(&frame, &response)?;

        let status = response.status;
        let line = frame.line_number;
        match status.severity() {
            Severity::Ok => {}
            Severity::Warning => {
                self.stats.warnings += 1;
                warn!(line, %status, "task returned a warning");
            }
            Severity::Error | Severity::Unknown => {
                self.stats.errors += 1;
                warn!(line, %status, "task failed");
            }
            Severity::Halt => {
                info!(line, "engine requested halt");
                return Ok(LoopState::Halted(status));
            }
        }
        Ok(LoopState::Running)
    }
}

/// Warn about a header whose file type version this loader does not know.
fn check_header(frame: &Frame) {
    match ControlHeader::parse(frame.line()) {
        Some(h) if !h.is_supported_version() => warn!(
            line = frame.line_number,
            file_type = h.file_type,
            version = h.version,
            expected = SUPPORTED_VERSION,
            "unexpected file type version"
        ),
        Some(_) => {}
        None => debug!(line = frame.line_number, "header without file type fields"),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::config::DispatchConfig;
    use crate::engine::EngineResponse;
    use crate::error::EngineError;
    use hpt_reader::FramerError;

    /// Engine that answers from a queue of statuses and records tasks.
    #[derive(Default)]
    struct Scripted {
        statuses: VecDeque<i32>,
        tasks: Rc<RefCell<Vec<Vec<u8>>>>,
        terminated: Rc<RefCell<u32>>,
        fail_on_submit: bool,
    }

    impl Engine for Scripted {
        fn initialize(&mut self) -> Result<(), EngineError> {
            Ok(())
        }

        fn submit(&mut self, task: &[u8]) -> Result<EngineResponse, EngineError> {
            if self.fail_on_submit {
                return Err(EngineError::Submit {
                    reason: "link down".into(),
                });
            }
            self.tasks.borrow_mut().push(task.to_vec());
            Ok(EngineResponse {
                answer: b"ok".to_vec(),
                status: Status(self.statuses.pop_front().unwrap_or(0)),
            })
        }

        fn terminate(&mut self) -> Result<(), EngineError> {
            *self.terminated.borrow_mut() += 1;
            Ok(())
        }

        fn pass_exit_code(&self) -> u8 {
            7
        }
    }

    struct Harness {
        tasks: Rc<RefCell<Vec<Vec<u8>>>>,
        terminated: Rc<RefCell<u32>>,
    }

    fn run(engine: Scripted, input: &[u8]) -> (Result<RunSummary, DriverError>, Harness) {
        let harness = Harness {
            tasks: Rc::clone(&engine.tasks),
            terminated: Rc::clone(&engine.terminated),
        };
        let session = EngineSession::open(engine).unwrap();
        let reporter = Reporter::new(Vec::new(), &DispatchConfig::default());
        let mut frames = FrameReader::new(input);
        (Dispatcher::new(session, reporter).run(&mut frames), harness)
    }

    #[test]
    fn empty_input_submits_nothing() {
        let (result, h) = run(Scripted::default(), b"");
        let summary = result.unwrap();
        assert_eq!(summary.end, EndReason::EndOfStream);
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.stats, DispatchStats::default());
        assert!(h.tasks.borrow().is_empty());
        assert_eq!(*h.terminated.borrow(), 1);
    }

    #[test]
    fn headers_never_reach_the_engine() {
        let (result, h) = run(
            Scripted::default(),
            b"hp93000,config,0.1\nFTST?\nhp93000,levels,0.1\n",
        );
        let stats = result.unwrap().stats;
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.discarded, 2);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(*h.tasks.borrow(), [b"FTST?\n".to_vec()]);
    }

    #[test]
    fn unknown_header_version_is_still_discarded() {
        let (result, h) = run(Scripted::default(), b"hp93000,timing,0.2\nFTST?\n");
        let stats = result.unwrap().stats;
        assert_eq!(stats.discarded, 1);
        assert_eq!(*h.tasks.borrow(), [b"FTST?\n".to_vec()]);
    }

    #[test]
    fn binary_frames_are_submitted_whole() {
        let (result, h) = run(Scripted::default(), b"PUT #9000000005ab\ncd\nFTST?\n");
        let stats = result.unwrap().stats;
        assert_eq!(stats.binary_bytes, 3);
        assert_eq!(
            *h.tasks.borrow(),
            [b"PUT #9000000005ab\ncd\n".to_vec(), b"FTST?\n".to_vec()]
        );
    }

    #[test]
    fn negative_statuses_are_counted_and_continue() {
        let engine = Scripted {
            statuses: VecDeque::from([-1, -42, 3, 0]),
            ..Scripted::default()
        };
        let (result, h) = run(engine, b"A\nB\nC\nD\n");
        let summary = result.unwrap();
        assert_eq!(summary.end, EndReason::EndOfStream);
        assert_eq!(summary.stats.warnings, 1);
        assert_eq!(summary.stats.errors, 2);
        assert_eq!(h.tasks.borrow().len(), 4);
    }

    #[test]
    fn halt_status_stops_gracefully() {
        let engine = Scripted {
            statuses: VecDeque::from([0, -1000]),
            ..Scripted::default()
        };
        let (result, h) = run(engine, b"A\nB\nC\n");
        let summary = result.unwrap();
        assert_eq!(
            summary.end,
            EndReason::Halted {
                status: Status::HALT,
                exit_code: 7
            }
        );
        assert_eq!(summary.exit_code(), 7);
        assert_eq!(h.tasks.borrow().len(), 2);
        assert_eq!(*h.terminated.borrow(), 1);
    }

    #[test]
    fn malformed_frame_is_fatal_and_still_terminates() {
        let (result, h) = run(Scripted::default(), b"A\nPUT #9000000001abcd\nB\n");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            DriverError::Framing(FramerError::Malformed { line: 2, .. })
        ));
        assert_eq!(h.tasks.borrow().len(), 1);
        assert_eq!(*h.terminated.borrow(), 1);
    }

    #[test]
    fn submit_failure_is_fatal_and_still_terminates() {
        let engine = Scripted {
            fail_on_submit: true,
            ..Scripted::default()
        };
        let (result, h) = run(engine, b"A\n");
        assert!(matches!(
            result,
            Err(DriverError::Submit {
                line: 1,
                source: EngineError::Submit { .. }
            })
        ));
        assert_eq!(*h.terminated.borrow(), 1);
    }
}
