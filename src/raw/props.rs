use crate::{
    builder::RawBuilder,
    oid::ObjectId,
    raw::{DbPointer, RawBson, RawJavaScriptCodeWithScope, Regex},
    spec::BinarySubtype,
    Binary,
    DateTime,
    Decimal128,
    Timestamp,
};

use proptest::prelude::*;

fn arbitrary_binary_subtype() -> impl Strategy<Value = BinarySubtype> {
    prop_oneof![
        Just(BinarySubtype::Generic),
        Just(BinarySubtype::Function),
        Just(BinarySubtype::BinaryOld),
        Just(BinarySubtype::UuidOld),
        Just(BinarySubtype::Uuid),
        Just(BinarySubtype::Md5),
        (0x80u8..=0xFF).prop_map(BinarySubtype::UserDefined),
    ]
}

fn arbitrary_cstring() -> impl Strategy<Value = String> {
    "[^\0]*"
}

/// Encodes `entries` as a document, in order.
fn document_of(entries: Vec<(String, RawBson)>) -> crate::raw::RawDocumentBuf {
    let mut builder = RawBuilder::new_document();
    for (key, value) in &entries {
        builder
            .key(key)
            .and_then(|b| b.append(value))
            .expect("generated entries are encodable");
    }
    builder.extract_document().expect("complete document")
}

pub(crate) fn arbitrary_raw_bson() -> impl Strategy<Value = RawBson> {
    let leaf = prop_oneof![
        Just(RawBson::Null),
        Just(RawBson::Undefined),
        Just(RawBson::MinKey),
        Just(RawBson::MaxKey),
        any::<String>().prop_map(RawBson::String),
        any::<bool>().prop_map(RawBson::Boolean),
        any::<f64>().prop_map(RawBson::Double),
        any::<i32>().prop_map(RawBson::Int32),
        any::<i64>().prop_map(RawBson::Int64),
        any::<i64>().prop_map(|millis| RawBson::DateTime(DateTime::from_millis(millis))),
        any::<(u32, u32)>()
            .prop_map(|(time, increment)| RawBson::Timestamp(Timestamp { time, increment })),
        any::<[u8; 16]>().prop_map(|bytes| RawBson::Decimal128(Decimal128::from_bytes(bytes))),
        (arbitrary_cstring(), arbitrary_cstring())
            .prop_map(|(pattern, options)| RawBson::RegularExpression(Regex::new(pattern, options))),
        any::<[u8; 12]>().prop_map(|bytes| RawBson::ObjectId(ObjectId::from_bytes(bytes))),
        (arbitrary_binary_subtype(), any::<Vec<u8>>())
            .prop_map(|(subtype, bytes)| RawBson::Binary(Binary { subtype, bytes })),
        any::<String>().prop_map(RawBson::JavaScriptCode),
        any::<String>().prop_map(RawBson::Symbol),
        (any::<String>(), any::<[u8; 12]>()).prop_map(|(namespace, id)| {
            RawBson::DbPointer(DbPointer {
                namespace,
                id: ObjectId::from_bytes(id),
            })
        }),
    ];

    leaf.prop_recursive(4, 256, 10, |inner| {
        prop_oneof![
            prop::collection::vec((arbitrary_cstring(), inner.clone()), 0..12)
                .prop_map(|entries| RawBson::Document(document_of(entries))),
            prop::collection::vec(inner.clone(), 0..12).prop_map(|values| {
                let mut builder = RawBuilder::new_array();
                for value in &values {
                    builder.append(value).expect("generated values are encodable");
                }
                RawBson::Array(builder.extract_array().expect("complete array"))
            }),
            (
                prop::collection::vec((arbitrary_cstring(), inner), 0..12),
                any::<String>()
            )
                .prop_map(|(scope, code)| RawBson::JavaScriptCodeWithScope(
                    RawJavaScriptCodeWithScope {
                        code,
                        scope: document_of(scope),
                    }
                )),
        ]
    })
}
