use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use super::{
    basic::{ArrayBuilder, DocumentBuilder},
    stream::{StreamDocument, StreamRootArray},
    RawBuilder,
};
use crate::{
    error::{BuilderErrorKind, Error},
    raw::{validate, RawBsonRef, RawDocument, RawRegexRef},
    rawarr,
    rawdoc,
    spec::{BinarySubtype, ElementType},
};

/// Runs `op` on `builder`, expecting it to fail with `kind` without touching the buffer.
fn assert_rejected(
    builder: &mut RawBuilder,
    kind: BuilderErrorKind,
    op: impl FnOnce(&mut RawBuilder) -> crate::error::Result<()>,
) {
    let before = builder.data.clone();
    let depth = builder.depth();
    let err = op(builder).expect_err("operation should be rejected");
    assert_eq!(err.builder_kind(), Some(&kind));
    assert_eq!(builder.data, before);
    assert_eq!(builder.depth(), depth);
}

#[test]
fn key_protocol() {
    let mut builder = RawBuilder::new_document();
    assert_rejected(&mut builder, BuilderErrorKind::NeedKey, |b| {
        b.append(1).map(|_| ())
    });

    builder.key("a").unwrap();
    assert!(builder.has_pending_key());
    assert_rejected(&mut builder, BuilderErrorKind::UnmatchedKey, |b| {
        b.key("b").map(|_| ())
    });
    assert_rejected(&mut builder, BuilderErrorKind::UnmatchedKey, |b| {
        b.view_document().map(|_| ())
    });
    builder.append(1).unwrap();
    assert!(!builder.has_pending_key());

    assert_rejected(
        &mut builder,
        BuilderErrorKind::InteriorNul {
            value: String::from("a\0b"),
        },
        |b| b.key("a\0b").map(|_| ()),
    );

    let mut array = RawBuilder::new_array();
    assert!(array.is_array());
    assert_rejected(&mut array, BuilderErrorKind::KeyInArray, |b| {
        b.key("a").map(|_| ())
    });
}

#[test]
fn container_protocol() {
    let mut builder = RawBuilder::new_document();
    assert_rejected(&mut builder, BuilderErrorKind::NoDocumentToClose, |b| {
        b.close_document().map(|_| ())
    });
    assert_rejected(&mut builder, BuilderErrorKind::NoArrayToClose, |b| {
        b.close_array().map(|_| ())
    });

    builder.key("list").unwrap().open_array().unwrap();
    assert_eq!(builder.depth(), 1);
    assert_rejected(&mut builder, BuilderErrorKind::CloseDocumentInArray, |b| {
        b.close_document().map(|_| ())
    });
    assert_rejected(
        &mut builder,
        BuilderErrorKind::OpenContainers { depth: 1 },
        |b| b.view_document().map(|_| ()),
    );

    builder.open_document().unwrap();
    assert_rejected(&mut builder, BuilderErrorKind::CloseArrayInDocument, |b| {
        b.close_array().map(|_| ())
    });
    builder.key("k").unwrap();
    assert_rejected(&mut builder, BuilderErrorKind::UnmatchedKey, |b| {
        b.close_document().map(|_| ())
    });
    builder.append("v").unwrap().close_document().unwrap();
    builder.close_array().unwrap();

    assert_eq!(
        builder.extract_document().unwrap(),
        rawdoc! { "list" => [{ "k" => "v" }] }.unwrap()
    );
}

#[test]
fn root_kind_is_checked() {
    let mut builder = RawBuilder::new_document();
    assert_rejected(
        &mut builder,
        BuilderErrorKind::ArrayOperationOnDocument,
        |b| b.view_array().map(|_| ()),
    );
    assert_rejected(
        &mut builder,
        BuilderErrorKind::ArrayOperationOnDocument,
        |b| b.extract_array().map(|_| ()),
    );

    let mut array = RawBuilder::new_array();
    assert_rejected(
        &mut array,
        BuilderErrorKind::DocumentOperationOnArray,
        |b| b.extract_document().map(|_| ()),
    );
}

#[test]
fn invalid_values_are_rejected() {
    let mut builder = RawBuilder::new_document();
    builder.key("re").unwrap();
    assert_rejected(
        &mut builder,
        BuilderErrorKind::InteriorNul {
            value: String::from("a\0"),
        },
        |b| {
            b.append(RawRegexRef {
                pattern: "a\0",
                options: "i",
            })
            .map(|_| ())
        },
    );
    // the key survives a rejected value
    assert!(builder.has_pending_key());

    let corrupt = [7u8, 0, 0, 0, 0, 0];
    let err = builder
        .append(RawDocument::new_unchecked(&corrupt[..]))
        .unwrap_err();
    assert!(err.is_malformed_bytes());
    assert!(builder.has_pending_key());
}

#[test]
fn root_stays_terminated() {
    let mut builder = RawBuilder::new_document();
    validate(builder.view_document().unwrap().as_bytes()).unwrap();

    for i in 0..10 {
        builder.key(format!("k{}", i)).unwrap().append(i).unwrap();
        let view = builder.view_document().unwrap();
        validate(view.as_bytes()).unwrap();
        assert_eq!(view.iter().count(), i as usize + 1);
    }
}

#[test]
fn array_keys_are_generated() {
    let mut builder = RawBuilder::new_array();
    builder.append("a").unwrap().append("b").unwrap();
    builder.open_array().unwrap().append(1).unwrap().close_array().unwrap();
    builder.append("d").unwrap();

    let array = builder.extract_array().unwrap();
    let keys = array
        .iter()
        .map(|e| e.key().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(keys, ["0", "1", "2", "3"]);
    assert_eq!(array.get_array(2).unwrap().get_i32(0).unwrap(), 1);
}

#[test]
fn concatenate_keeps_keys_in_documents() {
    let extra = rawdoc! { "x" => 1, "y" => "two" }.unwrap();

    let mut builder = RawBuilder::new_document();
    builder.key("a").unwrap().append(0).unwrap();
    builder.concatenate(&extra).unwrap();
    builder.key("z").unwrap().open_document().unwrap();
    builder.concatenate(&extra).unwrap().close_document().unwrap();

    assert_eq!(
        builder.extract_document().unwrap(),
        rawdoc! {
            "a" => 0,
            "x" => 1,
            "y" => "two",
            "z" => { "x" => 1, "y" => "two" },
        }
        .unwrap()
    );
}

#[test]
fn concatenate_rekeys_in_arrays() {
    let extra = rawdoc! { "x" => 1, "y" => { "deep" => true } }.unwrap();

    let mut builder = RawBuilder::new_array();
    builder.append("first").unwrap();
    builder.concatenate(&extra).unwrap();
    builder.append("last").unwrap();

    let array = builder.extract_array().unwrap();
    assert_eq!(
        array,
        rawarr!["first", 1, { "deep" => true }, "last"].unwrap()
    );
}

#[test]
fn concatenate_rejections() {
    let extra = rawdoc! { "x" => 1 }.unwrap();

    let mut builder = RawBuilder::new_document();
    builder.key("pending").unwrap();
    assert_rejected(&mut builder, BuilderErrorKind::UnmatchedKey, |b| {
        b.concatenate(&extra).map(|_| ())
    });

    let mut builder = RawBuilder::new_document();
    builder.key("a").unwrap().append(1).unwrap();
    let before = builder.data.clone();
    let mut bytes = extra.into_bytes();
    bytes[4] = 0x42;
    let err = builder
        .concatenate(RawDocument::new_unchecked(&bytes))
        .unwrap_err();
    assert!(err.is_malformed_bytes());
    assert_eq!(builder.data, before);
}

#[test]
fn binary_filled_in_place() {
    let mut builder = RawBuilder::new_document();
    assert_rejected(&mut builder, BuilderErrorKind::NeedKey, |b| {
        b.append_binary_uninit(BinarySubtype::Generic, 4).map(|_| ())
    });

    builder
        .key("new")
        .unwrap()
        .append_binary_uninit(BinarySubtype::Generic, 3)
        .unwrap()
        .copy_from_slice(b"abc");
    builder
        .key("old")
        .unwrap()
        .append_binary_uninit(BinarySubtype::BinaryOld, 2)
        .unwrap()
        .copy_from_slice(&[9, 8]);
    builder
        .key("none")
        .unwrap()
        .append_binary_uninit(BinarySubtype::Generic, 0)
        .unwrap();

    let doc = builder.extract_document().unwrap();
    validate(doc.as_bytes()).unwrap();
    assert_eq!(doc.get_binary("new").unwrap().bytes, b"abc");
    let old = doc.get_binary("old").unwrap();
    assert_eq!(old.subtype, BinarySubtype::BinaryOld);
    assert_eq!(old.bytes, &[9, 8]);
    assert!(doc.get_binary("none").unwrap().bytes.is_empty());
}

#[test]
fn extract_and_clear_reset() {
    let mut builder = RawBuilder::new_document();
    builder.key("a").unwrap().append(1).unwrap();
    let first = builder.extract_document().unwrap();
    assert_eq!(first, rawdoc! { "a" => 1 }.unwrap());

    assert!(builder.view_document().unwrap().is_empty());
    builder.key("b").unwrap().open_document().unwrap();
    builder.clear();
    assert_eq!(builder.depth(), 0);
    assert!(!builder.has_pending_key());
    assert!(builder.extract_document().unwrap().is_empty());

    let mut array = RawBuilder::new_array();
    array.append(1).unwrap();
    array.extract_array().unwrap();
    assert!(array.is_array());
    array.append(2).unwrap();
    assert_eq!(array.view_array().unwrap().get_i32(0).unwrap(), 2);
}

#[test]
fn appends_every_value_type() {
    let source = rawdoc! {
        "d" => 1.5,
        "s" => "str",
        "n" => RawBsonRef::Null,
        "b" => false,
        "l" => 7i64,
        "o" => None::<i32>,
    }
    .unwrap();

    let mut builder = RawBuilder::new_document();
    for element in &source {
        builder
            .key(element.key().unwrap())
            .unwrap()
            .append(element.value().unwrap())
            .unwrap();
    }
    let doc = builder.extract_document().unwrap();
    assert_eq!(doc, source);
    assert_eq!(
        doc.get("o").element_type().unwrap(),
        ElementType::Null
    );
}

#[test]
fn basic_rolls_back_failed_sub_documents() {
    let mut builder = DocumentBuilder::new();
    builder.append("a", 1).unwrap();

    let err = builder
        .append_document("sub", |sub| {
            sub.append("x", 1)?;
            sub.append("bad\0", 2)?;
            Ok(())
        })
        .unwrap_err();
    assert_matches!(
        err.builder_kind(),
        Some(BuilderErrorKind::InteriorNul { .. })
    );
    assert_eq!(builder.view().unwrap(), &*rawdoc! { "a" => 1 }.unwrap());

    let err = builder
        .append_array("list", |list| {
            list.append(1)?.append_document(|d| {
                d.append("deep", true)?;
                Err(Error::malformed_bytes("stop"))
            })?;
            Ok(())
        })
        .unwrap_err();
    assert!(err.is_malformed_bytes());
    assert_eq!(builder.view().unwrap(), &*rawdoc! { "a" => 1 }.unwrap());

    builder.append("b", 2).unwrap();
    assert_eq!(
        builder.extract().unwrap(),
        rawdoc! { "a" => 1, "b" => 2 }.unwrap()
    );
}

#[test]
fn basic_array_indexes_survive_rollback() {
    let mut builder = ArrayBuilder::new();
    builder.append("zero").unwrap();
    builder
        .append_array(|_| Err(Error::malformed_bytes("stop")))
        .unwrap_err();
    builder
        .append_document(|d| {
            d.append("k", "v")?;
            Ok(())
        })
        .unwrap();

    let array = builder.extract().unwrap();
    assert_eq!(array.iter().count(), 2);
    assert_eq!(array.get_document(1).unwrap().get_str("k").unwrap(), "v");
}

#[test]
fn basic_nested_containers_and_concatenation() {
    let extra = rawdoc! { "x" => 1 }.unwrap();

    let mut builder = DocumentBuilder::new();
    builder
        .append_document("outer", |outer| {
            outer.append_array("list", |list| {
                list.append(1)?.append_array(|inner| {
                    inner.append(2)?;
                    Ok(())
                })?;
                list.concatenate(&extra)?;
                Ok(())
            })?;
            outer.concatenate(&extra)?;
            Ok(())
        })
        .unwrap();

    assert_eq!(
        builder.extract().unwrap(),
        rawdoc! { "outer" => { "list" => [1, [2], 1], "x" => 1 } }.unwrap()
    );
}

#[test]
fn stream_chains_nested_containers() {
    let doc = StreamDocument::new()
        .key("a")
        .value(1)
        .key("list")
        .open_array()
        .value("x")
        .open_document()
        .key("k")
        .value(true)
        .close_document()
        .open_array()
        .close_array()
        .close_array()
        .finish()
        .unwrap();

    assert_eq!(
        doc,
        rawdoc! { "a" => 1, "list" => ["x", { "k" => true }, []] }.unwrap()
    );

    let array = StreamRootArray::new()
        .value(1)
        .open_document()
        .key("b")
        .open_document()
        .close_document()
        .close_document()
        .finish()
        .unwrap();
    assert_eq!(array, rawarr![1, { "b" => {} }].unwrap());
}

#[test]
fn stream_keeps_the_first_error() {
    let err = StreamDocument::new()
        .key("ok")
        .value(1)
        .key("bad\0")
        .value(2)
        .key("fine")
        .value(RawRegexRef {
            pattern: "\0",
            options: "",
        })
        .finish()
        .unwrap_err();
    assert_eq!(
        err.builder_kind(),
        Some(&BuilderErrorKind::InteriorNul {
            value: String::from("bad\0"),
        })
    );

    let corrupt = [9u8, 0, 0, 0, 0];
    let err = StreamRootArray::new()
        .concat(RawDocument::new_unchecked(&corrupt[..]))
        .value(1)
        .finish()
        .unwrap_err();
    assert!(err.is_malformed_bytes());
}

#[test]
fn stream_concat() {
    let extra = rawdoc! { "x" => 1 }.unwrap();
    let doc = StreamDocument::new()
        .concat(&extra)
        .key("sub")
        .open_document()
        .concat(&extra)
        .close_document()
        .finish()
        .unwrap();
    assert_eq!(doc, rawdoc! { "x" => 1, "sub" => { "x" => 1 } }.unwrap());
}

#[test]
fn macros_match_the_builder() {
    let mut builder = RawBuilder::new_document();
    builder.key("a").unwrap().append(1).unwrap();
    builder.key("b").unwrap().open_array().unwrap();
    builder.append("x").unwrap().open_document().unwrap();
    builder.close_document().unwrap().close_array().unwrap();
    let expected = builder.extract_document().unwrap();

    assert_eq!(rawdoc! { "a" => 1, "b" => ["x", {}] }.unwrap(), expected);
    assert_eq!(
        rawdoc! { "a" => 1, "b" => ["x", {},], }.unwrap(),
        expected
    );
    assert!(rawdoc! {}.unwrap().is_empty());
    assert!(rawarr![].unwrap().is_empty());

    let key = String::from("dynamic");
    let doc = rawdoc! { key.as_str() => 1 + 1 }.unwrap();
    assert_eq!(doc.get_i32("dynamic").unwrap(), 2);
}

#[test]
fn macros_report_errors() {
    let err = rawdoc! { "ok" => 1, "nested" => { "bad\0" => 1 } }.unwrap_err();
    assert_matches!(
        err.builder_kind(),
        Some(BuilderErrorKind::InteriorNul { .. })
    );

    let err = rawarr![1, { "\0" => 2 }].unwrap_err();
    assert!(err.builder_kind().is_some());
}
