mod iteration;
mod validate;

use pretty_assertions::assert_eq;

use super::*;
use crate::{
    oid::ObjectId,
    rawdoc,
    spec::{BinarySubtype, ElementType},
    Binary,
    DateTime,
    Decimal128,
    Timestamp,
};

/// `{ "a": 1i32, "b": "hi" }`, encoded by hand.
const SMALL: &[u8] = b"\x16\x00\x00\x00\x10a\x00\x01\x00\x00\x00\x02b\x00\x03\x00\x00\x00hi\x00\x00";

/// A document holding one value of every element type, in tag order.
fn every_type() -> RawDocumentBuf {
    let scope = rawdoc! { "ok" => true }.expect("scope");
    rawdoc! {
        "double" => 2.5,
        "string" => "hello",
        "document" => { "inner" => "surprise" },
        "array" => ["binary", "serialized", "object", "notation"],
        "binary" => &Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] },
        "undefined" => &RawBson::Undefined,
        "object_id" => ObjectId::from_bytes([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]),
        "boolean" => true,
        "datetime" => DateTime::from_millis(1_600_000_000_000),
        "null" => RawBsonRef::Null,
        "regex" => &RawBson::RegularExpression(Regex::new(r"end\s*$", "i")),
        "db_pointer" => &RawBson::DbPointer(DbPointer {
            namespace: String::from("db.coll"),
            id: ObjectId::from_bytes([12; 12]),
        }),
        "javascript" => RawBsonRef::JavaScriptCode("console.log(console);"),
        "symbol" => RawBsonRef::Symbol("artist-formerly-known-as"),
        "javascript_with_scope" => RawJavaScriptCodeWithScopeRef {
            code: "console.log(msg);",
            scope: &scope,
        },
        "int32" => 23i32,
        "timestamp" => Timestamp { time: 3542578, increment: 7 },
        "int64" => 46i64,
        "decimal128" => Decimal128::from_parts(0x3040_0000_0000_0000, 15),
        "max_key" => RawBsonRef::MaxKey,
        "min_key" => RawBsonRef::MinKey,
    }
    .expect("every type")
}

#[test]
fn hand_encoded_matches_builder() {
    let built = rawdoc! { "a" => 1, "b" => "hi" }.expect("build");
    assert_eq!(built.as_bytes(), SMALL);
    assert_eq!(&*built, RawDocument::decode_from_bytes(SMALL).expect("decode"));
}

#[test]
fn every_type_is_well_formed() {
    let doc = every_type();
    validate(doc.as_bytes()).expect("valid");

    let types = doc
        .iter()
        .map(|element| element.element_type().expect("type"))
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        [
            ElementType::Double,
            ElementType::String,
            ElementType::EmbeddedDocument,
            ElementType::Array,
            ElementType::Binary,
            ElementType::Undefined,
            ElementType::ObjectId,
            ElementType::Boolean,
            ElementType::DateTime,
            ElementType::Null,
            ElementType::RegularExpression,
            ElementType::DbPointer,
            ElementType::JavaScriptCode,
            ElementType::Symbol,
            ElementType::JavaScriptCodeWithScope,
            ElementType::Int32,
            ElementType::Timestamp,
            ElementType::Int64,
            ElementType::Decimal128,
            ElementType::MaxKey,
            ElementType::MinKey,
        ]
    );
}

#[test]
fn reencoding_is_byte_exact() {
    let doc = every_type();
    let mut builder = crate::builder::RawBuilder::new_document();
    for element in &doc {
        builder
            .key(element.key().expect("key"))
            .expect("key")
            .append(element.value().expect("value"))
            .expect("append");
    }
    let rebuilt = builder.extract_document().expect("extract");
    assert_eq!(rebuilt.as_bytes(), doc.as_bytes());
}

#[test]
fn owned_values_reencode_identically() {
    let doc = every_type();
    let mut builder = crate::builder::RawBuilder::new_document();
    for element in &doc {
        let owned = element.to_owned_value().expect("owned");
        builder
            .key(element.key().expect("key"))
            .expect("key")
            .append(&owned)
            .expect("append");
    }
    assert_eq!(builder.view_document().expect("view"), &*doc);
}

/// Decodes every value reachable from `doc`, returning the first failure.
fn decode_all(doc: &RawDocument) -> crate::error::Result<usize> {
    let mut count = 0;
    for element in doc {
        count += 1;
        match element.value()? {
            RawBsonRef::Document(d) => count += decode_all(d)?,
            RawBsonRef::Array(a) => count += decode_all(a.as_doc())?,
            RawBsonRef::JavaScriptCodeWithScope(c) => count += decode_all(c.scope)?,
            _ => {}
        }
    }
    Ok(count)
}

use proptest::prelude::*;

use super::props::arbitrary_raw_bson;

proptest! {
    #[test]
    fn no_crashes(s: Vec<u8>) {
        let validated = validate(&s);
        let decoded = decode_all(RawDocument::new_unchecked(&s));
        if validated.is_ok() {
            prop_assert!(decoded.is_ok());
        }
    }

    #[test]
    fn roundtrip_raw_bson(value in arbitrary_raw_bson()) {
        let doc = rawdoc! { "bson" => &value };
        prop_assert!(doc.is_ok());
        let doc = doc.unwrap();

        prop_assert!(validate(doc.as_bytes()).is_ok());
        prop_assert!(decode_all(&doc).is_ok());

        let owned = doc.get("bson").to_owned_value();
        prop_assert!(owned.is_ok());
        let owned = owned.unwrap();
        prop_assert_eq!(owned.element_type(), value.element_type());

        let rebuilt = rawdoc! { "bson" => &owned }.unwrap();
        prop_assert_eq!(rebuilt.as_bytes(), doc.as_bytes());
    }
}
