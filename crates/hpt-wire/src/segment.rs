use crate::error::WireError;

/// Marker flagging an embedded binary segment: the first three bytes of an
/// IEEE-488.2 definite-length block header (`#9` followed by 9 digits).
///
/// The trailing `0` is already the first of the nine length digits, which
/// is why the length field starts inside the marker.
pub const MARKER: &[u8; 3] = b"#90";

/// Offset of the declared-length field relative to the marker start.
pub const LENGTH_FIELD_OFFSET: usize = 2;

/// Width of the declared-length field in ASCII digits.
pub const LENGTH_FIELD_LEN: usize = 9;

/// Protocol constant in the extra-bytes formula.
///
/// 11 header bytes (`#9` + 9 digits) plus the one-byte record terminator
/// that follows the binary payload.
// TODO: confirm against the firmware block-transfer documentation once we
// have a copy; the value is empirical but matches every captured file.
pub const SEGMENT_OVERHEAD: usize = 12;

/// A binary segment found in a record line.
///
/// Derived from the line alone; nothing here is stored on the wire.
///
/// ```text
///   ... #9 000001234 <binary payload ...> \n
///       ^  ^                               ^
///       |  length field (M + 2, 9 digits)  terminator
///       marker offset M
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinarySegment {
    /// Byte offset of the marker within the line.
    pub marker_offset: usize,

    /// Value of the 9-digit length field.
    pub declared_len: u64,

    /// Raw bytes still to be read from the stream after the line.
    pub extra: usize,
}

impl BinarySegment {
    /// Inspect a full line (terminator included) for a binary segment.
    ///
    /// Returns `Ok(None)` when the marker is absent: the line is the whole
    /// frame and no extra bytes are owed.
    ///
    /// # Errors
    ///
    /// Any [`WireError`] when the marker is present but the header that
    /// follows it is unusable.
    pub fn locate(line: &[u8]) -> Result<Option<Self>, WireError> {
        match find_marker(line) {
            Some(offset) => Self::at(line, offset).map(Some),
            None => Ok(None),
        }
    }

    /// Build the descriptor for a marker already known to sit at
    /// `marker_offset`.
    ///
    /// # Errors
    ///
    /// - [`WireError::TruncatedLengthField`] if the line is too short.
    /// - [`WireError::InvalidLengthField`] if a digit is missing.
    /// - [`WireError::NegativeExtra`] if the declared length cannot cover
    ///   the payload bytes already present in the line.
    pub fn at(line: &[u8], marker_offset: usize) -> Result<Self, WireError> {
        let field_start = marker_offset + LENGTH_FIELD_OFFSET;
        let field = line
            .get(field_start..field_start + LENGTH_FIELD_LEN)
            .ok_or(WireError::TruncatedLengthField {
                offset: field_start,
                available: line.len().saturating_sub(field_start),
            })?;

        let declared_len = parse_declared_len(field, field_start)?;
        let extra = extra_bytes(declared_len, line.len(), marker_offset)?;

        Ok(Self {
            marker_offset,
            declared_len,
            extra,
        })
    }
}

/// Offset of the first marker in `line`, if any.
#[must_use]
pub fn find_marker(line: &[u8]) -> Option<usize> {
    line.windows(MARKER.len()).position(|w| w == MARKER)
}

/// Parse the fixed-width declared-length field.
///
/// `offset` is only used for diagnostics.
///
/// # Errors
///
/// [`WireError::InvalidLengthField`] unless `field` is exactly nine ASCII
/// digits.
pub fn parse_declared_len(field: &[u8], offset: usize) -> Result<u64, WireError> {
    if field.len() != LENGTH_FIELD_LEN || !field.iter().all(u8::is_ascii_digit) {
        return Err(WireError::InvalidLengthField {
            offset,
            field: String::from_utf8_lossy(field).into_owned(),
        });
    }

    Ok(field
        .iter()
        .fold(0u64, |acc, d| acc * 10 + u64::from(d - b'0')))
}

/// `extra = declared_len - line_len + (marker_offset + SEGMENT_OVERHEAD)`.
///
/// Computed in `i128` so neither operand can overflow.
///
/// # Errors
///
/// [`WireError::NegativeExtra`] when the result is below zero.
pub fn extra_bytes(
    declared_len: u64,
    line_len: usize,
    marker_offset: usize,
) -> Result<usize, WireError> {
    let extra = i128::from(declared_len) - line_len as i128
        + (marker_offset as i128 + SEGMENT_OVERHEAD as i128);

    if extra < 0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let deficit = (-extra) as u64;
        return Err(WireError::NegativeExtra {
            declared_len,
            line_len,
            marker_offset,
            deficit,
        });
    }

    // Only reachable on 16-bit targets; the buffer reservation will fail
    // and report it as an oversized segment.
    Ok(usize::try_from(extra).unwrap_or(usize::MAX))
}
