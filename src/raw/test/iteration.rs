use pretty_assertions::assert_eq;

use super::*;

#[test]
fn iterate() {
    let rawdoc = rawdoc! {
        "apples" => "oranges",
        "peanut butter" => "chocolate",
        "easy as" => { "do" => 1, "re" => 2, "mi" => 3 },
    }
    .expect("build");

    let mut dociter = rawdoc.iter();
    let next = dociter.next().expect("no result");
    assert_eq!(next.key().expect("key"), "apples");
    assert_eq!(next.get_str().expect("result was not a str"), "oranges");
    let next = dociter.next().expect("no result");
    assert_eq!(next.key().expect("key"), "peanut butter");
    assert_eq!(next.get_str().expect("result was not a str"), "chocolate");
    let next = dociter.next().expect("no result");
    assert_eq!(next.key().expect("key"), "easy as");
    let inner = next.get_document().expect("result was not a document");
    let keys = inner
        .iter()
        .map(|element| element.key().expect("key"))
        .collect::<Vec<_>>();
    assert_eq!(keys, ["do", "re", "mi"]);
    assert!(dociter.next().is_none());
    assert!(dociter.is_end());
}

#[test]
fn offsets_follow_the_encoding() {
    let doc = RawDocument::decode_from_bytes(SMALL).expect("decode");
    let offsets = doc.iter().map(|element| element.offset()).collect::<Vec<_>>();
    assert_eq!(offsets, [4, 11]);

    let b = doc.get("b");
    assert_eq!(b.as_bytes(), &SMALL[11..21]);
}

#[test]
fn empty_document() {
    let doc = RawDocument::decode_from_bytes(&EMPTY_DOCUMENT).expect("decode");
    assert!(doc.is_valid());
    assert!(doc.is_empty());
    assert!(doc.iter().is_end());
    assert_eq!(doc.iter().next().map(|e| e.offset()), None);
}

#[test]
fn invalid_view_behaves_as_empty() {
    let doc = <&RawDocument>::default();
    assert!(!doc.is_valid());
    assert!(doc.is_empty());
    assert_eq!(doc.iter(), RawIter::end());
    assert!(!doc.get("a").is_valid());

    let array = <&RawArray>::default();
    assert!(!array.is_valid());
    assert_eq!(array.iter().count(), 0);
}

#[test]
fn end_iterators_are_equal() {
    let doc = RawDocument::decode_from_bytes(SMALL).expect("decode");
    let mut iter = doc.iter();
    assert_ne!(iter, RawIter::end());
    assert_eq!(iter, doc.iter());

    iter.advance();
    assert_ne!(iter, doc.iter());
    iter.advance();
    assert_eq!(iter, RawIter::end());

    // advancing past the end stays at the end
    iter.advance();
    assert!(iter.is_end());
    assert!(!iter.current().is_valid());
}

#[test]
fn find_positions_the_iterator() {
    let doc = RawDocument::decode_from_bytes(SMALL).expect("decode");

    let mut found = doc.find("b");
    assert_eq!(found.current().key().expect("key"), "b");
    assert_eq!(found.current().offset(), 11);
    found.advance();
    assert!(found.is_end());

    assert!(doc.find("missing").is_end());
    assert!(doc.has_key("a"));
    assert!(!doc.has_key("missing"));
}

#[test]
fn duplicate_keys_resolve_to_the_first() {
    let mut builder = crate::builder::RawBuilder::new_document();
    builder.key("k").unwrap().append(1).unwrap();
    builder.key("k").unwrap().append(2).unwrap();
    let doc = builder.extract_document().unwrap();

    assert_eq!(doc.iter().count(), 2);
    assert_eq!(doc.get_i32("k").unwrap(), 1);
}

#[test]
fn truncated_string_stops_iteration() {
    // "b" declares a 255 byte string inside a 21 byte document
    let bytes = b"\x15\x00\x00\x00\x10a\x00\x01\x00\x00\x00\x02b\x00\xff\x00\x00\x00x\x00\x00";
    let doc = RawDocument::new_unchecked(bytes);

    let keys = doc
        .iter()
        .map(|element| element.key().expect("key"))
        .collect::<Vec<_>>();
    assert_eq!(keys, ["a"]);
    assert!(!doc.get("b").is_valid());
    assert!(doc.get_str("b").unwrap_err().is_not_present());
}

#[test]
fn unknown_type_stops_iteration() {
    let mut bytes = SMALL.to_vec();
    bytes[11] = 0x42;
    let doc = RawDocument::new_unchecked(&bytes);
    assert_eq!(doc.iter().count(), 1);
}

#[test]
fn negative_length_stops_iteration() {
    let mut bytes = SMALL.to_vec();
    bytes[14..18].copy_from_slice(&(-1i32).to_le_bytes());
    let doc = RawDocument::new_unchecked(&bytes);
    assert_eq!(doc.iter().count(), 1);
}

#[test]
fn missing_key_terminator_stops_iteration() {
    // a type tag followed by key bytes running into the document terminator
    let bytes = b"\x08\x00\x00\x00\x10abc";
    let doc = RawDocument::new_unchecked(bytes);
    assert!(doc.iter().next().is_none());
}

#[test]
fn array_keys_are_indexes() {
    let array = crate::rawarr![1, "two", 3.0].expect("build");
    let keys = array
        .iter()
        .map(|element| element.key().expect("key"))
        .collect::<Vec<_>>();
    assert_eq!(keys, ["0", "1", "2"]);
    assert_eq!(array.get(1).get_str().expect("str"), "two");
    assert!(!array.get(3).is_valid());
}

#[test]
fn nested_iteration() {
    let doc = rawdoc! {
        "outer" => { "middle" => { "inner" => [[1], [2, 3]] } },
    }
    .expect("build");

    let inner = doc
        .get_document("outer")
        .and_then(|d| d.get_document("middle"))
        .and_then(|d| d.get_array("inner"))
        .expect("path");
    let sums = inner
        .iter()
        .map(|element| {
            element
                .get_array()
                .expect("array")
                .iter()
                .map(|v| v.get_i32().expect("i32"))
                .sum::<i32>()
        })
        .collect::<Vec<_>>();
    assert_eq!(sums, [1, 5]);
}
