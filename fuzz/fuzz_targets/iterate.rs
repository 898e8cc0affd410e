#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate rawbson;
use rawbson::raw::RawDocument;

fuzz_target!(|buf: &[u8]| {
    // unchecked views degrade to the end iterator instead of reading out of bounds
    let doc = RawDocument::new_unchecked(buf);
    for element in doc {
        let _ = element.key();
        let _ = element.value();
    }
});
