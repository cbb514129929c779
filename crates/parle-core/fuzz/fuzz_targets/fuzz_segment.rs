#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        for segment in parle_core::text::segment(s) {
            assert!(!segment.is_empty());
        }
    }
});
