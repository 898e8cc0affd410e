//! An API for interacting with raw BSON bytes.
//!
//! This module provides two document types, [`RawDocumentBuf`] and [`&RawDocument`](RawDocument)
//! (an owned buffer and a reference respectively, akin to [`String`] and [`&str`](str)), and the
//! matching array pair [`RawArrayBuf`] and [`&RawArray`](RawArray). The contents are never parsed
//! up front: elements are located lazily by [`RawIter`] as the buffer is walked.
//!
//! A view over bytes from an untrusted source should be obtained with [`validate`] (or a
//! configured [`Validator`]), which proves the whole buffer well formed. Views created with
//! [`RawDocument::new_unchecked`] skip that work; reading a corrupt buffer through such a view is
//! still memory safe, but iteration simply stops at the first element it cannot decode.
//!
//! ```rust
//! use rawbson::raw::RawDocument;
//!
//! // See http://bsonspec.org/spec.html for details on the binary encoding of BSON.
//! let bytes = b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00";
//! let doc = RawDocument::decode_from_bytes(bytes)?;
//!
//! let elem = doc.get("hi");
//! assert!(elem.is_valid());
//! assert_eq!(elem.get_str()?, "y'all");
//!
//! // missing keys produce an invalid element rather than an error
//! assert!(!doc.get("bye").is_valid());
//! # Ok::<(), rawbson::error::Error>(())
//! ```
//!
//! ### Iteration
//!
//! [`RawDocument`] implements [`IntoIterator`], yielding [`RawElement`]s in the order they are
//! stored in the buffer.
//!
//! ```rust
//! use rawbson::{raw::RawDocument, spec::ElementType};
//!
//! let bytes = b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00";
//! let doc = RawDocument::decode_from_bytes(bytes)?;
//!
//! for element in doc {
//!     assert_eq!(element.key()?, "hi");
//!     assert_eq!(element.element_type()?, ElementType::String);
//! }
//! # Ok::<(), rawbson::error::Error>(())
//! ```

mod array;
mod array_buf;
mod bson;
mod bson_ref;
mod document;
mod document_buf;
mod iter;
mod owned;
#[cfg(test)]
mod props;
#[cfg(test)]
mod test;
mod validate;

use std::io::Read;

use crate::error::{Error, Result};

pub use self::{
    array::RawArray,
    array_buf::RawArrayBuf,
    bson::{DbPointer, RawBson, RawJavaScriptCodeWithScope, Regex},
    bson_ref::{
        RawBinaryRef,
        RawBsonRef,
        RawDbPointerRef,
        RawJavaScriptCodeWithScopeRef,
        RawRegexRef,
    },
    document::RawDocument,
    document_buf::RawDocumentBuf,
    iter::{RawElement, RawIter},
    owned::OwnedBuffer,
    validate::{validate, validate_array, Validator},
};

pub(crate) use self::bson_ref::check_cstring;

pub(crate) const MIN_BSON_STRING_SIZE: usize = 4 + 1; // 4 bytes for length, one byte for null terminator
pub(crate) const MIN_BSON_DOCUMENT_SIZE: usize = 4 + 1; // 4 bytes for length, one byte for null terminator
pub(crate) const MIN_CODE_WITH_SCOPE_SIZE: usize = 4 + MIN_BSON_STRING_SIZE + MIN_BSON_DOCUMENT_SIZE;

/// The bytes of an empty document: a length prefix of 5 followed by the terminator.
pub(crate) const EMPTY_DOCUMENT: [u8; 5] = [5, 0, 0, 0, 0];

fn array_from_slice<const N: usize>(val: &[u8], what: &str) -> Result<[u8; N]> {
    val.get(0..N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            Error::malformed_bytes(format!(
                "expected {} bytes to read {}, instead got {}",
                N,
                what,
                val.len()
            ))
        })
}

/// Given a u8 slice, return an f64 calculated from the first eight bytes in
/// little endian order.
pub(crate) fn f64_from_slice(val: &[u8]) -> Result<f64> {
    array_from_slice(val, "double").map(f64::from_le_bytes)
}

/// Given a u8 slice, return an i32 calculated from the first four bytes in
/// little endian order.
pub(crate) fn i32_from_slice(val: &[u8]) -> Result<i32> {
    array_from_slice(val, "i32").map(i32::from_le_bytes)
}

/// Given an u8 slice, return an i64 calculated from the first 8 bytes in
/// little endian order.
pub(crate) fn i64_from_slice(val: &[u8]) -> Result<i64> {
    array_from_slice(val, "i64").map(i64::from_le_bytes)
}

pub(crate) fn bool_from_slice(val: &[u8]) -> Result<bool> {
    let [val] = array_from_slice::<1>(val, "bool")?;
    if val > 1 {
        return Err(Error::malformed_bytes(format!(
            "boolean must be stored as 0 or 1, got {}",
            val
        )));
    }

    Ok(val != 0)
}

/// Reads an int32 length prefix and returns it as a `usize`, rejecting negative values.
pub(crate) fn read_len_prefix(buf: &[u8]) -> Option<usize> {
    let bytes: [u8; 4] = buf.get(0..4)?.try_into().ok()?;
    usize::try_from(i32::from_le_bytes(bytes)).ok()
}

/// Returns the full size (prefix included) of the length-prefixed, NUL-terminated string at the
/// start of `buf`, checking that it fits and is terminated.
fn read_len(buf: &[u8]) -> Result<usize> {
    if buf.len() < 4 {
        return Err(Error::malformed_bytes(format!(
            "expected buffer with string to contain at least 4 bytes, but it only has {}",
            buf.len()
        )));
    }

    let length = read_len_prefix(buf)
        .ok_or_else(|| Error::malformed_bytes("string length prefix is negative"))?;
    let end = checked_add(length, 4)?;

    if end < MIN_BSON_STRING_SIZE {
        return Err(Error::malformed_bytes(format!(
            "BSON length encoded string needs to be at least {} bytes, instead got {}",
            MIN_BSON_STRING_SIZE, end
        )));
    }

    if buf.len() < end {
        return Err(Error::malformed_bytes(format!(
            "expected buffer to contain at least {} bytes, but it only has {}",
            end,
            buf.len()
        )));
    }

    if buf[end - 1] != 0 {
        return Err(Error::malformed_bytes(
            "expected string to be null-terminated",
        ));
    }

    Ok(end)
}

/// Reads a length-prefixed string, returning the text and the number of bytes consumed.
pub(crate) fn read_lenencode(buf: &[u8]) -> Result<(&str, usize)> {
    let end = read_len(buf)?;
    // exclude length-prefix and null byte suffix
    let s = try_to_str(&buf[4..(end - 1)])?;
    Ok((s, end))
}

/// Reads a NUL-terminated string from the start of `buf`.
pub(crate) fn read_nullterminated(buf: &[u8]) -> Result<&str> {
    let len = buf
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| Error::malformed_bytes("expected null terminator"))?;
    try_to_str(&buf[..len])
}

pub(crate) fn try_to_str(data: &[u8]) -> Result<&str> {
    simdutf8::basic::from_utf8(data).map_err(|_| Error::utf8_encoding())
}

pub(crate) fn checked_add(lhs: usize, rhs: usize) -> Result<usize> {
    lhs.checked_add(rhs)
        .ok_or_else(|| Error::malformed_bytes("attempted to add with overflow"))
}

/// Checks the framing every document and array must have: at least five bytes, a length prefix
/// equal to the slice length, and a trailing NUL.
pub(crate) fn check_header(data: &[u8]) -> Result<()> {
    if data.len() < MIN_BSON_DOCUMENT_SIZE {
        return Err(Error::malformed_bytes(format!(
            "document too short: {} bytes",
            data.len()
        )));
    }

    let length = i32_from_slice(data)?;

    if usize::try_from(length).ok() != Some(data.len()) {
        return Err(Error::malformed_bytes(format!(
            "document length incorrect: declared {}, actual {}",
            length,
            data.len()
        )));
    }

    if data[data.len() - 1] != 0 {
        return Err(Error::malformed_bytes("document not null-terminated"));
    }

    Ok(())
}

pub(crate) fn reader_to_vec<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut buf = [0; 4];
    reader.read_exact(&mut buf)?;
    let length = i32::from_le_bytes(buf);

    if length < MIN_BSON_DOCUMENT_SIZE as i32 {
        return Err(Error::malformed_bytes("document size too small"));
    }

    let mut bytes = Vec::with_capacity(length as usize);
    bytes.extend(buf);

    reader.take(length as u64 - 4).read_to_end(&mut bytes)?;
    if bytes.len() != length as usize {
        return Err(Error::malformed_bytes(format!(
            "expected {} bytes from reader, got {}",
            length,
            bytes.len()
        )));
    }
    Ok(bytes)
}

pub(crate) fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend(&(s.len() as i32 + 1).to_le_bytes());
    buf.extend(s.as_bytes());
    buf.push(0);
}

pub(crate) fn write_cstring(buf: &mut Vec<u8>, s: &str) {
    buf.extend(s.as_bytes());
    buf.push(0);
}
