//! `hpt`: send a 93000 configuration file to the tester firmware, one
//! task at a time, and print each answer.
//!
//! ```text
//! hpt [file]
//! hpt < file
//! ```
//!
//! # Exit codes
//!
//! | Code      | Meaning                                              |
//! |-----------|------------------------------------------------------|
//! | 0         | Input read to the end                                |
//! | 1         | Usage error, input could not be opened, bad frame,   |
//! |           | engine failure                                       |
//! | pass code | Engine asked to halt (engine-defined, 0 by default)  |
//!
//! The report goes to stdout; usage, errors and logs go to stderr.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hpt_reader::SourceError;

mod config;
mod logging;
mod run;

const USAGE: &str = "\
Usage:

    hpt [file]
    hpt < file

Sends an HP/Agilent/Verigy/Advantest 93000 configuration file to the tester
firmware, one task per record, and prints each task with its answer. Give the
file on the command line or pipe it through stdin.

Files ending in .gz, .bz2 or .xz are decompressed with gzip, bzip2 or xz
(which must be on PATH); files ending in .zst are decompressed in-process.

Environment:

    HPT_LOG          log filter, e.g. debug or hpt_reader=debug (default: warn)
    HPT_LOG_FORMAT   text | json
    HPT_REPORT       text | json (default: text)
    HPT_ECHO_TASK    1 | 0, include task bytes in the report (default: 1)
";

#[derive(Parser)]
#[command(
    name = "hpt",
    version,
    about = "Send a 93000 configuration file to the tester firmware",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Configuration file to send. Reads stdin when omitted.
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args: Vec<OsString> = env::args_os().collect();
    if !is_valid_invocation(&args) {
        return usage_error();
    }
    let Ok(cli) = Cli::try_parse_from(args) else {
        return usage_error();
    };

    let settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return usage_error();
        }
    };
    logging::init(&settings);

    match run::run(cli.file.as_deref(), &settings.dispatch) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            if e.downcast_ref::<SourceError>().is_some_and(is_open_failure) {
                eprint!("{USAGE}");
            }
            ExitCode::from(1)
        }
    }
}

/// At most one argument, and it must not look like an option. Checked on
/// the raw argv so a literal `--` is rejected instead of ending options.
fn is_valid_invocation(args: &[OsString]) -> bool {
    match args {
        [] | [_] => true,
        [_, file] => !file.as_encoded_bytes().starts_with(b"-"),
        _ => false,
    }
}

fn usage_error() -> ExitCode {
    eprint!("{USAGE}");
    ExitCode::from(1)
}

fn is_open_failure(e: &SourceError) -> bool {
    matches!(e, SourceError::Open { .. } | SourceError::Spawn { .. })
}
