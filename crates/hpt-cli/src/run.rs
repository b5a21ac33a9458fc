use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use hpt_driver::{DispatchConfig, Dispatcher, EndReason, EngineSession, OfflineEngine, Reporter};
use hpt_reader::{FrameReader, resolve, resolve_stdin};
use tracing::debug;

/// Open the input, run the dispatcher over it and return the exit code.
///
/// The input is opened before the engine is started, so a bad path never
/// touches the engine. After a clean end of stream the input is closed
/// explicitly to surface decompressor failures; on every other path it is
/// dropped, which stops any decompression process.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or closed, the engine
/// cannot be started, or the dispatcher fails.
pub fn run(file: Option<&Path>, config: &DispatchConfig) -> Result<u8> {
    let stream = match file {
        Some(path) => resolve(path)?,
        None => resolve_stdin(),
    };
    debug!(kind = ?stream.kind(), "input resolved");

    let session = EngineSession::open(OfflineEngine::new()).context("cannot start engine")?;
    let reporter = Reporter::new(BufWriter::new(io::stdout().lock()), config);
    let mut frames = FrameReader::new(stream);

    let summary = Dispatcher::new(session, reporter).run(&mut frames)?;

    if summary.end == EndReason::EndOfStream {
        frames.into_inner().close()?;
    }
    let code = summary.exit_code();
    debug!(end = ?summary.end, code, "run finished");
    Ok(code)
}
