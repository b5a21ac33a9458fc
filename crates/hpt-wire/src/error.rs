/// Errors raised while interpreting a single record line.
///
/// Every variant describes a line that *claims* to carry a binary segment
/// (the `#90` marker is present) but whose segment header cannot be trusted.
/// The reader wraps these with the line number and a preview of the line.
///
/// ```text
/// ┌──────────────────────┬──────────────────────────────────────────────┐
/// │ Variant              │ Cause                                        │
/// ├──────────────────────┼──────────────────────────────────────────────┤
/// │ TruncatedLengthField │ line ends before the 9 length digits         │
/// │ InvalidLengthField   │ length field contains a non-digit byte       │
/// │ NegativeExtra        │ declared length too small for the line       │
/// └──────────────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The line ended before all 9 declared-length digits were present.
    #[error("length field at offset {offset} truncated: {available} of 9 digits present")]
    TruncatedLengthField { offset: usize, available: usize },

    /// The 9-byte declared-length field was not all ASCII digits.
    #[error("length field at offset {offset} is not 9 decimal digits: {field:?}")]
    InvalidLengthField { offset: usize, field: String },

    /// The declared length is smaller than the segment bytes already read
    /// as part of the line, so the number of bytes still owed is negative.
    #[error(
        "declared length {declared_len} with marker at offset {marker_offset} \
         is {deficit} byte(s) short of the {line_len}-byte line"
    )]
    NegativeExtra {
        declared_len: u64,
        line_len: usize,
        marker_offset: usize,
        deficit: u64,
    },
}
