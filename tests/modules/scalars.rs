use std::str::FromStr;

use pretty_assertions::assert_eq;
use rawbson::{oid::ObjectId, rawdoc, Decimal128, Timestamp};

#[test]
fn object_id_text_forms() {
    let id = ObjectId::parse_str("53e37d08776f724e42000000").unwrap();
    assert_eq!(id.to_hex(), "53e37d08776f724e42000000");
    assert_eq!(id.to_string(), id.to_hex());
    assert_eq!(ObjectId::from_str(&id.to_hex()).unwrap(), id);

    assert!(ObjectId::parse_str("").is_err());
    assert!(ObjectId::parse_str("53e37d08776f724e4200000").is_err());
    assert!(ObjectId::parse_str("zze37d08776f724e42000000").is_err());
    let err = ObjectId::parse_str("zz").unwrap_err();
    assert!(err.to_string().contains("invalid oid"));
}

#[test]
fn generated_object_ids_differ() {
    let a = ObjectId::new();
    let b = ObjectId::new();
    assert_ne!(a, b);

    let doc = rawdoc! { "_id" => a }.unwrap();
    assert_eq!(doc.get_object_id("_id").unwrap(), a);
}

#[test]
fn decimal128_text_forms() {
    for text in ["0", "-1.5", "1.23E+40", "NaN", "Infinity", "-Infinity"] {
        let value = Decimal128::from_str(text).unwrap();
        assert_eq!(value.to_string(), text);

        let doc = rawdoc! { "d" => value }.unwrap();
        assert_eq!(doc.get_decimal128("d").unwrap().to_string(), text);
    }
    assert!(Decimal128::from_str("1.2.3").is_err());
    assert!(Decimal128::from_str("").is_err());
}

#[test]
fn timestamps_survive_a_round_trip() {
    let ts = Timestamp {
        time: u32::MAX,
        increment: 1,
    };
    let doc = rawdoc! { "ts" => ts }.unwrap();
    assert_eq!(doc.get_timestamp("ts").unwrap(), ts);
}
