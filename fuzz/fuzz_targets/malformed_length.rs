#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate rawbson;
use rawbson::raw::RawDocumentBuf;

fuzz_target!(|buf: &[u8]| {
    if buf.len() >= 4 {
        // Focus on document length field manipulation
        let _ = RawDocumentBuf::decode_from_bytes(buf.to_vec());
    }
});
