#![no_main]
use libfuzzer_sys::fuzz_target;
use quasixml::parser::{parse_str_with_options, ParseOptions};
use quasixml::serial::{render, RenderOptions};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let opts = ParseOptions::new();
        // Parse -> render -> parse should never panic
        if let Ok(doc) = parse_str_with_options(s, &opts) {
            if let Some(root) = doc.root_element() {
                let indented = RenderOptions::new().auto_indent(true);
                let _ = render(&doc, root, &indented);
                let output = render(&doc, root, &RenderOptions::default());
                let _ = parse_str_with_options(&output, &opts);
            }
        }
    }
});
