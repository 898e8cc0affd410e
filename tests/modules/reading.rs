use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rawbson::{
    error::{ErrorKind, ValueAccessErrorKind},
    raw::{validate, RawArray, RawBsonRef, RawDocument, RawDocumentBuf, RawIter},
    rawarr,
    rawdoc,
    spec::ElementType,
};

#[test]
fn three_fields_in_order() {
    let doc = rawdoc! { "a" => 1, "b" => 2.0, "c" => "three" }.unwrap();

    let elements = doc.iter().collect::<Vec<_>>();
    assert_eq!(elements.len(), 3);

    let summary = elements
        .iter()
        .map(|e| (e.key().unwrap(), e.element_type().unwrap()))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        [
            ("a", ElementType::Int32),
            ("b", ElementType::Double),
            ("c", ElementType::String),
        ]
    );
    assert_eq!(elements[0].get_i32().unwrap(), 1);
    assert_eq!(elements[1].get_f64().unwrap(), 2.0);
    assert_eq!(elements[2].get_str().unwrap(), "three");

    assert_eq!(doc.get("b").get_f64().unwrap(), 2.0);
    assert!(!doc.get("z").is_valid());
}

#[test]
fn array_positions() {
    let array = rawarr![1, 2, 3].unwrap();
    let keys = array.iter().map(|e| e.key().unwrap()).collect::<Vec<_>>();
    assert_eq!(keys, ["0", "1", "2"]);
    assert_eq!(array.get(1).get_i32().unwrap(), 2);
}

#[test]
fn one_byte_buffer_is_rejected_at_offset_zero() {
    let err = validate(&[0u8][..]).unwrap_err();
    assert_eq!(err.offset, Some(0));
    assert!(err.is_malformed_bytes());
}

#[test]
fn iteration_is_restartable() {
    let doc = rawdoc! { "x" => [1, 2], "y" => { "z" => true }, "w" => "v" }.unwrap();
    let first = doc.iter().map(|e| e.offset()).collect::<Vec<_>>();
    let second = doc.iter().map(|e| e.offset()).collect::<Vec<_>>();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn end_iterator_is_idempotent() {
    let doc = rawdoc! { "only" => 1 }.unwrap();
    let mut iter = doc.iter();
    iter.advance();
    assert_eq!(iter, RawIter::end());
    iter.advance();
    assert_eq!(iter, RawIter::end());

    let current = iter.current();
    assert!(!current.is_valid());
    assert!(current.key().unwrap_err().is_unset_element());
    assert!(current.element_type().unwrap_err().is_unset_element());
}

#[test]
fn every_wrong_getter_names_the_needed_type() {
    let doc = rawdoc! { "s" => "text" }.unwrap();
    let element = doc.get("s");

    let attempts = [
        (element.get_f64().err(), ElementType::Double),
        (element.get_document().err(), ElementType::EmbeddedDocument),
        (element.get_array().err(), ElementType::Array),
        (element.get_binary().err(), ElementType::Binary),
        (element.get_undefined().err(), ElementType::Undefined),
        (element.get_object_id().err(), ElementType::ObjectId),
        (element.get_bool().err(), ElementType::Boolean),
        (element.get_datetime().err(), ElementType::DateTime),
        (element.get_null().err(), ElementType::Null),
        (element.get_regex().err(), ElementType::RegularExpression),
        (element.get_db_pointer().err(), ElementType::DbPointer),
        (element.get_javascript_code().err(), ElementType::JavaScriptCode),
        (element.get_symbol().err(), ElementType::Symbol),
        (
            element.get_javascript_code_with_scope().err(),
            ElementType::JavaScriptCodeWithScope,
        ),
        (element.get_i32().err(), ElementType::Int32),
        (element.get_timestamp().err(), ElementType::Timestamp),
        (element.get_i64().err(), ElementType::Int64),
        (element.get_decimal128().err(), ElementType::Decimal128),
        (element.get_max_key().err(), ElementType::MaxKey),
        (element.get_min_key().err(), ElementType::MinKey),
    ];

    for (err, expected) in attempts {
        let err = err.expect("wrong getter must fail");
        assert_eq!(err.expected_type(), Some(expected));
        assert_matches!(
            err.kind,
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::UnexpectedType {
                    actual: ElementType::String,
                    ..
                },
                ..
            }
        );
        assert!(err
            .to_string()
            .contains(&format!("need element type {}", expected)));
    }
    assert_eq!(element.get_str().unwrap(), "text");
}

#[test]
fn moved_from_value_is_falsy() {
    let mut original = rawdoc! { "k" => "v" }.unwrap();
    let snapshot = original.clone();

    let moved = std::mem::take(&mut original);
    assert!(!original.is_valid());
    assert_eq!(original.as_bytes().len(), 0);
    assert_eq!(moved, snapshot);
}

#[test]
fn corrupt_length_prefix_is_rejected() {
    let doc = rawdoc! { "a" => 1, "b" => [true, false] }.unwrap();
    validate(doc.as_bytes()).unwrap();

    let clean = doc.into_bytes();
    for byte in 0..4 {
        let mut bytes = clean.clone();
        bytes[byte] ^= 0x01;
        assert_eq!(validate(&bytes).unwrap_err().offset, Some(0), "byte {}", byte);
    }
}

#[test]
fn validated_views_borrow_untrusted_input() {
    let untrusted: Vec<u8> = rawdoc! { "user" => { "name" => "ada", "roles" => ["admin"] } }
        .unwrap()
        .into_bytes();

    let doc: &RawDocument = validate(&untrusted).unwrap();
    let roles: &RawArray = doc.get_document("user").unwrap().get_array("roles").unwrap();
    assert_eq!(roles.get_str(0).unwrap(), "admin");
    assert_eq!(doc.as_bytes().as_ptr(), untrusted.as_ptr());
}

#[test]
fn owned_values_are_independent_copies() {
    let value = {
        let doc = rawdoc! { "list" => [1, "two"] }.unwrap();
        doc.get_value("list").unwrap().to_raw_bson()
    };
    let array = value.as_array().unwrap();
    assert_eq!(array.get_str(1).unwrap(), "two");
    assert_eq!(value.as_raw_bson_ref().element_type(), ElementType::Array);

    let borrowed = RawBsonRef::from(&value);
    assert_eq!(borrowed.to_raw_bson().element_type(), ElementType::Array);
}

#[test]
fn documents_read_from_a_stream() {
    let mut stream = Vec::new();
    for i in 0..3 {
        stream.extend(rawdoc! { "i" => i }.unwrap().into_bytes());
    }

    let mut reader = std::io::Cursor::new(stream);
    let values = (0..3)
        .map(|_| RawDocumentBuf::from_reader(&mut reader).unwrap().get_i32("i").unwrap())
        .collect::<Vec<_>>();
    assert_eq!(values, [0, 1, 2]);

    let err = RawDocumentBuf::from_reader(&mut reader).unwrap_err();
    assert_matches!(err.kind, ErrorKind::Io(_));
}
