use std::str::FromStr;

/// Configuration for a dispatch run.
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────────┐
/// │ Field         │ Purpose                                          │
/// ├───────────────┼──────────────────────────────────────────────────┤
/// │ report_format │ Human-readable text or one JSON object per line  │
/// │ echo_task     │ Copy each task's bytes into its report entry     │
/// └───────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    pub report_format: ReportFormat,

    /// When `false`, reports carry only the task length. Useful for
    /// pattern files whose binary segments run to megabytes.
    pub echo_task: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            report_format: ReportFormat::Text,
            echo_task: true,
        }
    }
}

/// Report output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown report format {s:?}, expected text|json")),
        }
    }
}
