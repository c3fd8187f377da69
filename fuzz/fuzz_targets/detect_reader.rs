#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let detector = binlang::Detector::default();
    if let Ok(result) = detector.detect_reader(&mut Cursor::new(data)) {
        assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
    }
});
