#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate rawbson;
use rawbson::raw::{validate, RawBson};

fuzz_target!(|buf: &[u8]| {
    if let Ok(doc) = validate(buf) {
        for element in doc {
            let key = element.key().expect("validated key");
            let value: RawBson = element.to_owned_value().expect("validated value");
            let _ = (key, value);
        }
    }
});
