use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rawbson::{
    builder::{
        basic::{ArrayBuilder, DocumentBuilder},
        stream::StreamDocument,
        RawBuilder,
    },
    error::BuilderErrorKind,
    oid::ObjectId,
    raw::{validate, RawBson, RawDocumentBuf},
    rawdoc,
    spec::BinarySubtype,
    Binary,
    DateTime,
};

fn sample_with_raw_builder() -> RawDocumentBuf {
    let mut builder = RawBuilder::new_document();
    builder.key("_id").unwrap().append(ObjectId::from_bytes([7; 12])).unwrap();
    builder.key("created").unwrap().append(DateTime::from_millis(1_000)).unwrap();
    builder.key("tags").unwrap().open_array().unwrap();
    builder.append("red").unwrap().append("blue").unwrap();
    builder.close_array().unwrap();
    builder.key("meta").unwrap().open_document().unwrap();
    builder.key("version").unwrap().append(2i64).unwrap();
    builder.close_document().unwrap();
    builder.extract_document().unwrap()
}

#[test]
fn facades_produce_identical_bytes() {
    let expected = sample_with_raw_builder();

    let mut basic = DocumentBuilder::new();
    basic
        .append("_id", ObjectId::from_bytes([7; 12]))
        .unwrap()
        .append("created", DateTime::from_millis(1_000))
        .unwrap()
        .append_array("tags", |tags| {
            tags.append("red")?.append("blue")?;
            Ok(())
        })
        .unwrap()
        .append_document("meta", |meta| {
            meta.append("version", 2i64)?;
            Ok(())
        })
        .unwrap();
    assert_eq!(basic.extract().unwrap(), expected);

    let streamed = StreamDocument::new()
        .key("_id")
        .value(ObjectId::from_bytes([7; 12]))
        .key("created")
        .value(DateTime::from_millis(1_000))
        .key("tags")
        .open_array()
        .value("red")
        .value("blue")
        .close_array()
        .key("meta")
        .open_document()
        .key("version")
        .value(2i64)
        .close_document()
        .finish()
        .unwrap();
    assert_eq!(streamed, expected);

    let macro_built = rawdoc! {
        "_id" => ObjectId::from_bytes([7; 12]),
        "created" => DateTime::from_millis(1_000),
        "tags" => ["red", "blue"],
        "meta" => { "version" => 2i64 },
    }
    .unwrap();
    assert_eq!(macro_built, expected);
}

fn apply(builder: &mut RawBuilder, op: usize) -> rawbson::error::Result<()> {
    match op {
        0 => builder.append(1).map(drop),
        1 => builder.key("k").map(drop),
        2 => builder.append("v").map(drop),
        3 => builder.open_document().map(drop),
        4 => builder.open_array().map(drop),
        5 => builder.close_document().map(drop),
        6 => builder.close_array().map(drop),
        7 => builder.append(2.5).map(drop),
        _ => builder.append("nul\0inside").map(drop),
    }
}

proptest! {
    #[test]
    fn accepted_operations_always_validate(ops in prop::collection::vec(0..9usize, 0..500)) {
        let mut builder = RawBuilder::new_document();
        for op in ops {
            let _ = apply(&mut builder, op);
            if builder.depth() == 0 && !builder.has_pending_key() {
                let view = builder.view_document().unwrap();
                prop_assert!(validate(view.as_bytes()).is_ok());
            }
        }

        while builder.depth() > 0 {
            if builder.has_pending_key() {
                builder.append(0).unwrap();
            }
            if builder.close_document().is_err() {
                builder.close_array().unwrap();
            }
        }
        if builder.has_pending_key() {
            builder.append(0).unwrap();
        }
        let doc = builder.extract_document().unwrap();
        prop_assert!(validate(doc.as_bytes()).is_ok());

        let mut copy = RawBuilder::new_document();
        copy.concatenate(&doc).unwrap();
        prop_assert_eq!(copy.extract_document().unwrap(), doc);
    }
}

#[test]
fn protocol_errors_are_typed() {
    let mut builder = RawBuilder::new_document();
    let err = builder.close_document().unwrap_err();
    assert_eq!(err.builder_kind(), Some(&BuilderErrorKind::NoDocumentToClose));

    builder.key("open").unwrap().open_array().unwrap();
    let err = builder.extract_document().unwrap_err();
    assert_matches!(
        err.builder_kind(),
        Some(BuilderErrorKind::OpenContainers { depth: 1, .. })
    );
    assert!(err.to_string().contains("still open"));
}

#[test]
fn owned_values_append_like_borrowed_ones() {
    let values = vec![
        RawBson::Int32(1),
        RawBson::String(String::from("s")),
        RawBson::Binary(Binary {
            subtype: BinarySubtype::Md5,
            bytes: vec![0; 16],
        }),
        RawBson::Document(rawdoc! { "x" => 1 }.unwrap()),
    ];

    let mut array = ArrayBuilder::new();
    for value in &values {
        array.append(value).unwrap();
    }
    let array = array.extract().unwrap();

    let read_back = array
        .iter()
        .map(|e| e.value().unwrap().to_raw_bson())
        .collect::<Vec<_>>();
    assert_eq!(read_back.len(), values.len());
    for (read, written) in read_back.iter().zip(&values) {
        assert_eq!(read.as_raw_bson_ref(), written.as_raw_bson_ref());
    }
}

#[test]
fn extraction_hands_over_the_buffer() {
    let mut builder = DocumentBuilder::new();
    builder.append("a", 1).unwrap();
    let first = builder.extract().unwrap();
    builder.append("b", 2).unwrap();
    let second = builder.extract().unwrap();

    assert_eq!(first, rawdoc! { "a" => 1 }.unwrap());
    assert_eq!(second, rawdoc! { "b" => 2 }.unwrap());
    assert_eq!(first.into_bytes().len(), 12);
}
