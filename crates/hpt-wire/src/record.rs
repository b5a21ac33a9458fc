/// Literal prefix of the file-type header record, e.g. `hp93000,config,0.1`.
///
/// The header identifies the configuration file type for the loader; the
/// firmware itself does not accept it as a task.
pub const CONTROL_HEADER: &[u8] = b"hp93000";

/// File type version this loader was written against.
pub const SUPPORTED_VERSION: &str = "0.1";

/// `true` when `line` is a control/header record rather than a task.
#[must_use]
pub fn is_control_header(line: &[u8]) -> bool {
    line.starts_with(CONTROL_HEADER)
}

/// Fields of a `hp93000,<file type>,<version>` header record.
///
/// ```text
///   hp93000,config,0.1
///           ──┬─── ─┬─
///   file_type ┘     └ version
/// ```
///
/// `file_type` is a run of ASCII letters, digits and `_`; `version` is a
/// run of digits and dots. Anything after the version is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlHeader<'a> {
    pub file_type: &'a str,
    pub version: &'a str,
}

impl<'a> ControlHeader<'a> {
    /// Parse a header line. Returns `None` for anything that is not a
    /// control header or whose fields are missing.
    #[must_use]
    pub fn parse(line: &'a [u8]) -> Option<Self> {
        let rest = line.strip_prefix(CONTROL_HEADER)?.strip_prefix(b",")?;
        let type_len = rest
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count();
        let (file_type, rest) = rest.split_at(type_len);
        let rest = rest.strip_prefix(b",")?;
        let version_len = rest
            .iter()
            .take_while(|b| b.is_ascii_digit() || **b == b'.')
            .count();
        if file_type.is_empty() || version_len == 0 {
            return None;
        }

        // Both runs are ASCII, so neither conversion can fail.
        Some(Self {
            file_type: std::str::from_utf8(file_type).ok()?,
            version: std::str::from_utf8(&rest[..version_len]).ok()?,
        })
    }

    #[must_use]
    pub fn is_supported_version(&self) -> bool {
        self.version == SUPPORTED_VERSION
    }
}
