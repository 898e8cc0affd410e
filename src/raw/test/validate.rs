use pretty_assertions::assert_eq;

use super::*;
use crate::{builder::RawBuilder, error::ErrorKind};

fn offset_of(result: crate::error::Result<&RawDocument>) -> Option<usize> {
    result.expect_err("should be rejected").offset
}

#[test]
fn well_formed_documents() {
    let doc = validate(SMALL).expect("valid");
    assert_eq!(doc.get_str("b").unwrap(), "hi");
    assert_eq!(doc.as_bytes().as_ptr(), SMALL.as_ptr());

    validate(&EMPTY_DOCUMENT).expect("empty");
    validate(every_type().as_bytes()).expect("every type");

    let nested = rawdoc! {
        "a" => { "b" => { "c" => [1, { "d" => [[]] }] } },
    }
    .unwrap();
    validate(nested.as_bytes()).expect("nested");
}

#[test]
fn framing_errors() {
    assert_eq!(offset_of(validate(&[5u8, 0, 0][..])), Some(0));

    let mut bytes = SMALL.to_vec();
    bytes[0] = 0x17;
    assert_eq!(offset_of(validate(&bytes)), Some(0));

    let mut bytes = SMALL.to_vec();
    bytes[21] = 1;
    let err = validate(&bytes).unwrap_err();
    assert!(err.is_malformed_bytes());
    assert_eq!(err.offset, Some(21));
}

#[test]
fn element_errors_point_at_the_tag() {
    let mut bytes = SMALL.to_vec();
    bytes[11] = 0x42;
    assert_eq!(offset_of(validate(&bytes)), Some(11));

    // string terminator overwritten
    let mut bytes = SMALL.to_vec();
    bytes[20] = b'x';
    assert_eq!(offset_of(validate(&bytes)), Some(11));

    // string length running past the document
    let mut bytes = SMALL.to_vec();
    bytes[14] = 9;
    assert_eq!(offset_of(validate(&bytes)), Some(11));

    let mut bytes = SMALL.to_vec();
    bytes[14..18].copy_from_slice(&(-1i32).to_le_bytes());
    assert_eq!(offset_of(validate(&bytes)), Some(11));
}

#[test]
fn nested_errors_use_absolute_offsets() {
    let doc = rawdoc! { "a" => 1, "sub" => { "x" => true } }.unwrap();
    let mut bytes = doc.into_bytes();
    // outer "a" at 4, "sub" at 11, embedded document at 16, "x" at 20
    assert_eq!(bytes[20], ElementType::Boolean as u8);
    bytes[23] = 2;
    assert_eq!(offset_of(validate(&bytes)), Some(20));

    // the embedded document claims more bytes than its container holds
    let doc = rawdoc! { "a" => 1, "sub" => { "x" => true } }.unwrap();
    let mut bytes = doc.into_bytes();
    bytes[16] = 0x40;
    assert_eq!(offset_of(validate(&bytes)), Some(11));
}

#[test]
fn utf8_checks() {
    let mut bytes = SMALL.to_vec();
    bytes[18] = 0xFF;
    let err = validate(&bytes).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Utf8Encoding));
    assert_eq!(err.offset, Some(11));
    Validator::new()
        .check_utf8(false)
        .validate(&bytes)
        .expect("utf8 unchecked");

    // invalid UTF-8 in a key
    let mut bytes = SMALL.to_vec();
    bytes[5] = 0xC3;
    assert_eq!(offset_of(validate(&bytes)), Some(4));
}

#[test]
fn nul_inside_strings() {
    let mut bytes = SMALL.to_vec();
    bytes[18] = 0;
    validate(&bytes).expect("nul allowed by default");

    let strict = Validator::new().check_utf8_allow_null(false);
    assert_eq!(offset_of(strict.validate(&bytes)), Some(11));
    Validator::new()
        .check_utf8_allow_null(false)
        .check_utf8(false)
        .validate(&bytes)
        .expect("utf8 unchecked");
}

#[test]
fn builder_strings_with_nul_validate() {
    let mut builder = RawBuilder::new_document();
    builder.key("s").unwrap().append("a\0b").unwrap();
    let doc = builder.extract_document().unwrap();
    validate(doc.as_bytes()).expect("nul inside a string");
    assert_eq!(doc.get_str("s").unwrap(), "a\0b");

    let mut builder = RawBuilder::new_document();
    builder.concatenate(&doc).unwrap();
    assert_eq!(builder.extract_document().unwrap(), doc);
}

#[test]
fn key_checks() {
    let dotted = rawdoc! { "a.b" => 1 }.unwrap();
    let dollar = rawdoc! { "ok" => 1, "$x" => 1 }.unwrap();
    let empty = rawdoc! { "" => 1 }.unwrap();

    for doc in [&dotted, &dollar, &empty] {
        validate(doc.as_bytes()).expect("keys unchecked by default");
    }

    let dots = Validator::new().check_dot_keys(true);
    assert_eq!(offset_of(dots.validate(dotted.as_bytes())), Some(4));
    dots.validate(dollar.as_bytes()).expect("no dots");

    let dollars = Validator::new().check_dollar_keys(true);
    assert_eq!(offset_of(dollars.validate(dollar.as_bytes())), Some(12));
    dollars.validate(dotted.as_bytes()).expect("dot is not leading");

    let empties = Validator::new().check_empty_keys(true);
    assert_eq!(offset_of(empties.validate(empty.as_bytes())), Some(4));
}

#[test]
fn key_checks_skip_arrays_and_scopes() {
    let mut builder = RawBuilder::new_document();
    builder.key("$0").unwrap().append(1).unwrap();
    let bytes = builder.extract_document().unwrap().into_bytes();

    let strict = Validator::new().check_dollar_keys(true);
    assert!(strict.validate(&bytes).is_err());
    strict.validate_array(&bytes).expect("array keys are not checked");

    let scope = rawdoc! { "$x" => 1 }.unwrap();
    let doc = rawdoc! {
        "code" => RawJavaScriptCodeWithScopeRef { code: "f()", scope: &scope },
    }
    .unwrap();
    strict.validate(doc.as_bytes()).expect("scope keys are not checked");
}

#[test]
fn corrupt_boolean() {
    let doc = rawdoc! { "flag" => true }.unwrap();
    let mut bytes = doc.into_bytes();
    let at = bytes.len() - 2;
    bytes[at] = 7;
    let err = validate(&bytes).unwrap_err();
    assert!(err.is_malformed_bytes());
    assert_eq!(err.offset, Some(4));
}

#[test]
fn corrupt_code_with_scope() {
    let scope = RawDocumentBuf::empty();
    let doc = rawdoc! {
        "c" => RawJavaScriptCodeWithScopeRef { code: "x", scope: &scope },
    }
    .unwrap();
    validate(doc.as_bytes()).expect("valid");

    // total length at 7, code length at 11
    let mut bytes = doc.clone().into_bytes();
    bytes[11] = 3;
    assert_eq!(offset_of(validate(&bytes)), Some(4));

    let mut bytes = doc.into_bytes();
    bytes[11] = 0;
    assert_eq!(offset_of(validate(&bytes)), Some(4));
}

#[test]
fn arrays() {
    let array = crate::rawarr![1, "two", [3]].unwrap();
    let view = validate_array(array.as_bytes()).expect("valid");
    assert_eq!(view.get_str(1).unwrap(), "two");

    let mut bytes = array.into_bytes();
    let last = bytes.len() - 1;
    bytes[last] = 9;
    assert_eq!(validate_array(&bytes).unwrap_err().offset, Some(last));
}

#[test]
fn invalid_buffers_never_panic() {
    let bytes = every_type().into_bytes();
    for cut in 0..bytes.len() {
        let mut truncated = bytes[..cut].to_vec();
        if truncated.len() >= 4 {
            truncated[..4].copy_from_slice(&(cut as i32).to_le_bytes());
        }
        assert!(validate(&truncated).is_err(), "cut at {}", cut);
    }
    for at in 4..bytes.len() {
        let mut flipped = bytes.clone();
        flipped[at] ^= 0xFF;
        let _ = validate(&flipped);
    }
}
