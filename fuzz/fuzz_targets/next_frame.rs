#![no_main]

use libfuzzer_sys::fuzz_target;
use hpt_reader::FrameReader;

// Fuzz target: FrameReader over an arbitrary stream.
//
// Frames that come out must reassemble a prefix of the input, and each
// frame must be its line plus exactly the extra bytes it declared.
fuzz_target!(|data: &[u8]| {
    let mut consumed = 0usize;
    for frame in FrameReader::new(data) {
        let Ok(frame) = frame else { break };
        assert_eq!(frame.len(), frame.line_len + frame.extra());
        assert_eq!(&data[consumed..consumed + frame.len()], &frame.bytes[..]);
        consumed += frame.len();
    }
    assert!(consumed <= data.len());
});
