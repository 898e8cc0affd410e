#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate rawbson;
use rawbson::extjson::{from_json, to_json};

fuzz_target!(|buf: &[u8]| {
    if let Ok(text) = std::str::from_utf8(buf) {
        if let Ok(doc) = from_json(text) {
            let _ = to_json(&doc);
        }
    }
});
