#![no_main]

use libfuzzer_sys::fuzz_target;
use refscope::{dependencies::AssemblyTable, ildasm::extract_module, redirect::parse_binding_redirects};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let mut table = AssemblyTable::new();
        table.merge(&extract_module(text));
        let _ = parse_binding_redirects(text);
    }
});
