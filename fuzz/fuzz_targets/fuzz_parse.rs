#![no_main]
use libfuzzer_sys::fuzz_target;
use quasixml::parser::{parse_bytes, parse_str_with_options, ParseOptions};

fuzz_target!(|data: &[u8]| {
    // Byte input goes through encoding detection first
    let _ = parse_bytes(data);
    if let Ok(s) = std::str::from_utf8(data) {
        // Recovery mode must always produce a document
        let lenient = ParseOptions::new().auto_close_open_tags(true);
        assert!(parse_str_with_options(s, &lenient).is_ok());
        let _ = parse_str_with_options(s, &ParseOptions::new().abort_on_error(true));
    }
});
