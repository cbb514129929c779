#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a grammar document.
    // This should never panic - only return Ok or Err
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parle_core::grammar::parse(s);
    }
});
