use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rawbson::{
    error::{ErrorKind, JsonErrorKind},
    extjson::{self, ExtendedJsonMode},
    oid::ObjectId,
    raw::{DbPointer, RawBson, RawBsonRef, RawDocument, RawJavaScriptCodeWithScope, Regex},
    rawdoc,
    spec::BinarySubtype,
    Binary,
    DateTime,
    Decimal128,
    Timestamp,
};

fn all_representable_types() -> rawbson::raw::RawDocumentBuf {
    rawdoc! {
        "double" => 1.25,
        "whole_double" => 3.0,
        "string" => "text",
        "doc" => { "nested" => [1, 2i64, { "deep" => RawBsonRef::Null }] },
        "binary" => &Binary { subtype: BinarySubtype::Uuid, bytes: vec![0xAB; 16] },
        "old_binary" => &Binary { subtype: BinarySubtype::BinaryOld, bytes: vec![1, 2, 3] },
        "undefined" => &RawBson::Undefined,
        "oid" => ObjectId::from_bytes([0x11; 12]),
        "bool" => false,
        "date" => DateTime::from_millis(1_356_351_330_501),
        "old_date" => DateTime::from_millis(-1),
        "regex" => &RawBson::RegularExpression(Regex::new("^a", "im")),
        "pointer" => &RawBson::DbPointer(DbPointer {
            namespace: String::from("db.c"),
            id: ObjectId::from_bytes([0x22; 12]),
        }),
        "code" => RawBsonRef::JavaScriptCode("f()"),
        "symbol" => RawBsonRef::Symbol("sym"),
        "scoped" => &RawBson::JavaScriptCodeWithScope(RawJavaScriptCodeWithScope {
            code: String::from("g(x)"),
            scope: rawdoc! { "x" => 1 }.unwrap(),
        }),
        "int32" => -7,
        "timestamp" => Timestamp { time: 100, increment: 3 },
        "int64" => 1i64 << 40,
        "decimal" => "1.5E+10".parse::<Decimal128>().unwrap(),
        "max" => RawBsonRef::MaxKey,
        "min" => RawBsonRef::MinKey,
    }
    .unwrap()
}

#[test]
fn canonical_json_round_trips_exactly() {
    let doc = all_representable_types();
    let json = extjson::to_json_with_mode(&doc, ExtendedJsonMode::Canonical).unwrap();
    let parsed = extjson::from_json(&json).unwrap();
    assert_eq!(parsed.as_bytes(), doc.as_bytes());
}

#[test]
fn relaxed_json_round_trips_what_json_can_express() {
    let doc = rawdoc! {
        "i" => 5,
        "big" => 1i64 << 40,
        "f" => 0.5,
        "s" => "x",
        "list" => [true, RawBsonRef::Null],
        "when" => DateTime::from_millis(1_000),
    }
    .unwrap();
    let json = extjson::to_json(&doc).unwrap();
    assert_eq!(
        json,
        r#"{"i":5,"big":1099511627776,"f":0.5,"s":"x","list":[true,null],"when":{"$date":"1970-01-01T00:00:01Z"}}"#
    );
    assert_eq!(extjson::from_json(&json).unwrap(), doc);

    // small int64 values come back as int32 in relaxed mode
    let lossy = rawdoc! { "n" => 5i64 }.unwrap();
    let back = extjson::from_json(&extjson::to_json(&lossy).unwrap()).unwrap();
    assert_ne!(back, lossy);
    assert_eq!(back.get_i32("n").unwrap(), 5);
}

#[test]
fn json_value_access() {
    let doc = rawdoc! { "a" => { "b" => [1, 2] } }.unwrap();
    let value = extjson::to_json_value(&doc, ExtendedJsonMode::Canonical).unwrap();
    assert_eq!(value["a"]["b"][1]["$numberInt"], "2");

    let rebuilt = extjson::from_json_value(value).unwrap();
    assert_eq!(rebuilt, doc);
}

#[test]
fn malformed_json_is_a_parse_failure() {
    for input in [
        "{",
        "[1, 2]",
        "42",
        r#"{"a": {"$numberInt": "nope"}}"#,
        r#"{"a": {"$oid": "123"}}"#,
        r#"{"a": {"$binary": {"base64": "!!", "subType": "00"}}}"#,
        r#"{"a": {"$date": {"$numberLong": "1", "extra": 1}}}"#,
        r#"{"a": {"$numberLong": "1", "$numberInt": "1"}}"#,
    ] {
        let err = extjson::from_json(input).unwrap_err();
        assert_matches!(
            err.kind,
            ErrorKind::Json {
                kind: JsonErrorKind::Parse { .. },
                ..
            },
            "{}",
            input
        );
        assert!(err.to_string().contains("JSON parse failure"), "{}", input);
    }
}

#[test]
fn corrupt_bson_fails_conversion() {
    let mut bytes = rawdoc! { "s" => "abc" }.unwrap().into_bytes();
    let at = bytes.len() - 3;
    bytes[at] = 0xFF;

    let err = extjson::to_json(RawDocument::new_unchecked(&bytes)).unwrap_err();
    assert_matches!(
        err.kind,
        ErrorKind::Json {
            kind: JsonErrorKind::FromBson { .. },
            ..
        }
    );
    assert!(err.to_string().contains("failed converting BSON to JSON"));
}
