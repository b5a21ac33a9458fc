//! Settings read from the environment.
//!
//! The command line takes nothing but a file name, so everything tunable
//! comes from `HPT_*` variables.
//!
//! ```text
//! ┌────────────────┬──────────────────┬─────────────────────────────────┐
//! │ Variable       │ Values           │ Effect                          │
//! ├────────────────┼──────────────────┼─────────────────────────────────┤
//! │ HPT_LOG        │ EnvFilter syntax │ log filter (read by logging.rs) │
//! │ HPT_LOG_FORMAT │ text | json      │ log line format on stderr       │
//! │ HPT_REPORT     │ text | json      │ report format on stdout         │
//! │ HPT_ECHO_TASK  │ 1 | 0            │ copy task bytes into the report │
//! └────────────────┴──────────────────┴─────────────────────────────────┘
//! ```

use anyhow::{Result, anyhow};
use hpt_driver::{DispatchConfig, ReportFormat};

pub const LOG_ENV: &str = "HPT_LOG";
pub const LOG_FORMAT_ENV: &str = "HPT_LOG_FORMAT";
pub const REPORT_ENV: &str = "HPT_REPORT";
pub const ECHO_TASK_ENV: &str = "HPT_ECHO_TASK";

pub struct Settings {
    pub dispatch: DispatchConfig,
    pub json_logs: bool,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable when a value is not recognised.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut dispatch = DispatchConfig::default();

        if let Some(value) = get(REPORT_ENV) {
            dispatch.report_format = value
                .parse::<ReportFormat>()
                .map_err(|e| anyhow!("{REPORT_ENV}: {e}"))?;
        }
        if let Some(value) = get(ECHO_TASK_ENV) {
            dispatch.echo_task = parse_flag(ECHO_TASK_ENV, &value)?;
        }

        let json_logs = match get(LOG_FORMAT_ENV).as_deref().map(str::to_lowercase) {
            None => false,
            Some(v) if v == "text" => false,
            Some(v) if v == "json" => true,
            Some(v) => {
                return Err(anyhow!(
                    "{LOG_FORMAT_ENV}: unknown log format {v:?}, expected text|json"
                ));
            }
        };

        Ok(Self {
            dispatch,
            json_logs,
        })
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("{name}: expected 1 or 0, got {value:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.dispatch, DispatchConfig::default());
        assert!(!s.json_logs);
    }

    #[test]
    fn variables_override_defaults() {
        let s = settings(&[
            (REPORT_ENV, "json"),
            (ECHO_TASK_ENV, "off"),
            (LOG_FORMAT_ENV, "JSON"),
        ])
        .unwrap();
        assert_eq!(s.dispatch.report_format, ReportFormat::Json);
        assert!(!s.dispatch.echo_task);
        assert!(s.json_logs);
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = settings(&[(ECHO_TASK_ENV, "maybe")]).err().unwrap();
        assert!(err.to_string().contains(ECHO_TASK_ENV));
        let err = settings(&[(REPORT_ENV, "xml")]).err().unwrap();
        assert!(err.to_string().contains(REPORT_ENV));
        assert!(settings(&[(LOG_FORMAT_ENV, "pretty")]).is_err());
    }
}
