use crate::{
    error::{Error, Result},
    spec::ElementType,
};

use super::{
    check_header,
    checked_add,
    i32_from_slice,
    iter::{decode_binary, value_len},
    read_len_prefix,
    try_to_str,
    RawArray,
    RawDocument,
    MIN_BSON_DOCUMENT_SIZE,
};

/// Proves that untrusted bytes are a well-formed BSON document, with the default [`Validator`]
/// options. On success the returned view borrows `data` without copying it.
///
/// ```
/// use rawbson::raw::validate;
///
/// let doc = validate(b"\x0c\x00\x00\x00\x10a\x00\x01\x00\x00\x00\x00")?;
/// assert_eq!(doc.get_i32("a")?, 1);
///
/// let err = validate(&[0u8]).unwrap_err();
/// assert_eq!(err.offset, Some(0));
/// # Ok::<(), rawbson::error::Error>(())
/// ```
pub fn validate<D: AsRef<[u8]> + ?Sized>(data: &D) -> Result<&RawDocument> {
    Validator::new().validate(data)
}

/// Proves that untrusted bytes are a well-formed BSON array, with the default [`Validator`]
/// options.
pub fn validate_array<D: AsRef<[u8]> + ?Sized>(data: &D) -> Result<&RawArray> {
    Validator::new().validate_array(data)
}

/// Walks an entire buffer applying the same length rules the element iterator uses, and never
/// reads past the end of the buffer whatever its length fields claim.
///
/// Every embedded document, array and code-with-scope scope is checked as well. Failures are
/// [`ErrorKind::MalformedBytes`](crate::error::ErrorKind::MalformedBytes) or
/// [`ErrorKind::Utf8Encoding`](crate::error::ErrorKind::Utf8Encoding) errors whose
/// [`offset`](Error::offset) is the byte offset of the first corruption: `0` when the top-level
/// length prefix is wrong, the index of the last byte when the terminator is missing, and
/// otherwise the offset of the type tag of the offending element.
///
/// ```
/// use rawbson::{raw::Validator, rawdoc};
///
/// let doc = rawdoc! { "$set" => { "a.b" => 1 } }?;
/// assert!(Validator::new().validate(doc.as_bytes()).is_ok());
///
/// let strict = Validator::new().check_dollar_keys(true);
/// assert_eq!(strict.validate(doc.as_bytes()).unwrap_err().offset, Some(4));
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validator {
    check_utf8: bool,
    check_utf8_allow_null: bool,
    check_dot_keys: bool,
    check_dollar_keys: bool,
    check_empty_keys: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            check_utf8: true,
            check_utf8_allow_null: true,
            check_dot_keys: false,
            check_dollar_keys: false,
            check_empty_keys: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameKind {
    Document,
    Array,
    Scope,
}

#[derive(Debug)]
struct Frame {
    /// Offset of the next element's type tag.
    pos: usize,
    /// Offset of the frame's terminator.
    end: usize,
    kind: FrameKind,
}

struct Checked {
    end: usize,
    child: Option<Frame>,
}

impl Validator {
    /// A validator with the default options: UTF-8 is checked, NUL bytes inside length-prefixed
    /// strings are allowed, and keys are not restricted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether keys, strings and cstrings must be valid UTF-8.
    pub fn check_utf8(mut self, check: bool) -> Self {
        self.check_utf8 = check;
        self
    }

    /// Whether NUL bytes are allowed inside length-prefixed strings when UTF-8 is checked. On by
    /// default, since BSON permits them; pass `false` to reject them.
    pub fn check_utf8_allow_null(mut self, allow: bool) -> Self {
        self.check_utf8_allow_null = allow;
        self
    }

    /// Whether document keys containing `.` are rejected.
    pub fn check_dot_keys(mut self, check: bool) -> Self {
        self.check_dot_keys = check;
        self
    }

    /// Whether document keys starting with `$` are rejected.
    pub fn check_dollar_keys(mut self, check: bool) -> Self {
        self.check_dollar_keys = check;
        self
    }

    /// Whether empty document keys are rejected.
    pub fn check_empty_keys(mut self, check: bool) -> Self {
        self.check_empty_keys = check;
        self
    }

    /// Validates `data` as a document.
    pub fn validate<'a, D: AsRef<[u8]> + ?Sized>(&self, data: &'a D) -> Result<&'a RawDocument> {
        let data = data.as_ref();
        self.walk(data, FrameKind::Document)?;
        Ok(RawDocument::new_unchecked(data))
    }

    /// Validates `data` as an array. Array keys are never subject to the key checks.
    pub fn validate_array<'a, D: AsRef<[u8]> + ?Sized>(&self, data: &'a D) -> Result<&'a RawArray> {
        let data = data.as_ref();
        self.walk(data, FrameKind::Array)?;
        Ok(RawArray::new_unchecked(data))
    }

    fn walk(&self, data: &[u8], root: FrameKind) -> Result<()> {
        check_root(data)?;

        let mut stack = vec![Frame {
            pos: 4,
            end: data.len() - 1,
            kind: root,
        }];
        while let Some(frame) = stack.last_mut() {
            if frame.pos == frame.end {
                stack.pop();
                continue;
            }
            let offset = frame.pos;
            let checked = self
                .check_element(data, offset, frame.end, frame.kind)
                .map_err(|e| reject(e, offset))?;
            frame.pos = checked.end;
            if let Some(child) = checked.child {
                stack.push(child);
            }
        }
        Ok(())
    }

    /// Checks the element whose type tag is at `offset` inside a frame whose terminator is at
    /// `limit`.
    fn check_element(
        &self,
        data: &[u8],
        offset: usize,
        limit: usize,
        kind: FrameKind,
    ) -> Result<Checked> {
        let element_type = ElementType::from(data[offset]).ok_or_else(|| {
            Error::malformed_bytes(format!("invalid element type tag 0x{:02x}", data[offset]))
        })?;

        let key_len = data[offset + 1..limit]
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| Error::malformed_bytes("key is not null-terminated"))?;
        self.check_key(&data[offset + 1..offset + 1 + key_len], kind)?;

        let value_start = offset + 1 + key_len + 1;
        let size = value_len(data, value_start, element_type).ok_or_else(|| {
            Error::malformed_bytes(format!("invalid length for {} value", element_type))
        })?;
        let end = checked_add(value_start, size)?;
        if end > limit {
            return Err(Error::malformed_bytes(format!(
                "{} value extends past the end of its container",
                element_type
            )));
        }

        let value = &data[value_start..end];
        let child = match element_type {
            ElementType::String | ElementType::JavaScriptCode | ElementType::Symbol => {
                self.check_string(value)?;
                None
            }
            ElementType::EmbeddedDocument | ElementType::Array => {
                check_header(value)?;
                Some(Frame {
                    pos: value_start + 4,
                    end: end - 1,
                    kind: if element_type == ElementType::Array {
                        FrameKind::Array
                    } else {
                        FrameKind::Document
                    },
                })
            }
            ElementType::Binary => {
                decode_binary(value)?;
                None
            }
            ElementType::RegularExpression => {
                // value_len located both terminators
                let pattern_len = value.iter().position(|b| *b == 0).unwrap_or(0);
                self.check_cstring(&value[..pattern_len])?;
                self.check_cstring(&value[pattern_len + 1..value.len() - 1])?;
                None
            }
            ElementType::DbPointer => {
                self.check_string(&value[..value.len() - 12])?;
                None
            }
            ElementType::JavaScriptCodeWithScope => {
                let code_len = read_len_prefix(&value[4..])
                    .ok_or_else(|| Error::malformed_bytes("code length prefix is negative"))?;
                let code_end = checked_add(8, code_len)?;
                if code_len == 0 || checked_add(code_end, MIN_BSON_DOCUMENT_SIZE)? > value.len() {
                    return Err(Error::malformed_bytes(
                        "code with scope length does not match its code and scope",
                    ));
                }
                self.check_string(&value[4..code_end])?;
                check_header(&value[code_end..]).map_err(|_| {
                    Error::malformed_bytes("code with scope length does not match its code and scope")
                })?;
                Some(Frame {
                    pos: value_start + code_end + 4,
                    end: end - 1,
                    kind: FrameKind::Scope,
                })
            }
            ElementType::Boolean => {
                if value[0] > 1 {
                    return Err(Error::malformed_bytes(format!(
                        "boolean must be stored as 0 or 1, got {}",
                        value[0]
                    )));
                }
                None
            }
            _ => None,
        };

        Ok(Checked { end, child })
    }

    fn check_key(&self, key: &[u8], kind: FrameKind) -> Result<()> {
        self.check_cstring(key)?;
        if kind != FrameKind::Document {
            return Ok(());
        }
        if self.check_empty_keys && key.is_empty() {
            return Err(Error::malformed_bytes("empty key"));
        }
        if self.check_dollar_keys && key.first() == Some(&b'$') {
            return Err(Error::malformed_bytes("key begins with '$'"));
        }
        if self.check_dot_keys && key.contains(&b'.') {
            return Err(Error::malformed_bytes("key contains '.'"));
        }
        Ok(())
    }

    fn check_cstring(&self, bytes: &[u8]) -> Result<()> {
        if self.check_utf8 {
            try_to_str(bytes)?;
        }
        Ok(())
    }

    /// Checks a length-prefixed string whose prefix already matches `value.len() - 4`.
    fn check_string(&self, value: &[u8]) -> Result<()> {
        if value.last() != Some(&0) {
            return Err(Error::malformed_bytes("string is not null-terminated"));
        }
        let content = &value[4..value.len() - 1];
        if self.check_utf8 {
            try_to_str(content)?;
            if !self.check_utf8_allow_null && content.contains(&0) {
                return Err(Error::malformed_bytes("string contains a null byte"));
            }
        }
        Ok(())
    }
}

fn check_root(data: &[u8]) -> Result<()> {
    if data.len() < MIN_BSON_DOCUMENT_SIZE {
        return Err(reject(
            Error::malformed_bytes(format!("document too short: {} bytes", data.len())),
            0,
        ));
    }
    let length = i32_from_slice(data).map_err(|e| reject(e, 0))?;
    if usize::try_from(length).ok() != Some(data.len()) {
        return Err(reject(
            Error::malformed_bytes(format!(
                "document length incorrect: declared {}, actual {}",
                length,
                data.len()
            )),
            0,
        ));
    }
    let last = data.len() - 1;
    if data[last] != 0 {
        return Err(reject(
            Error::malformed_bytes("document not null-terminated"),
            last,
        ));
    }
    Ok(())
}

fn reject(error: Error, offset: usize) -> Error {
    tracing::debug!("rejecting BSON buffer at offset {}: {}", offset, error);
    error.with_offset(offset)
}
