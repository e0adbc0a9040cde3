#![no_main]

use libfuzzer_sys::fuzz_target;
use refscope::conflicts::{parse_build_output, ConflictParseOptions};

fuzz_target!(|data: &[u8]| {
    if let Ok(log) = std::str::from_utf8(data) {
        let _ = parse_build_output(log, &ConflictParseOptions::default());
    }
});
