#![no_main]

use libfuzzer_sys::fuzz_target;
use hpt_wire::BinarySegment;

// Fuzz target: BinarySegment::locate on a single line.
//
// Catches bugs in:
// - Length field slicing near the end of the line
// - Overflow in the extra byte computation
// - A located segment whose extra count disagrees with the formula
fuzz_target!(|data: &[u8]| {
    if let Ok(Some(seg)) = BinarySegment::locate(data) {
        let total = seg.declared_len as u128 + seg.marker_offset as u128 + 12;
        assert_eq!(data.len() as u128 + seg.extra as u128, total);
    }
});
