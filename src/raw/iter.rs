use std::iter::FusedIterator;

use crate::{
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
    DateTime,
    Decimal128,
    Timestamp,
};

use super::{
    bool_from_slice,
    checked_add,
    f64_from_slice,
    i32_from_slice,
    i64_from_slice,
    read_len_prefix,
    read_lenencode,
    read_nullterminated,
    try_to_str,
    RawArray,
    RawBinaryRef,
    RawBson,
    RawBsonRef,
    RawDbPointerRef,
    RawDocument,
    RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
    MIN_BSON_DOCUMENT_SIZE,
    MIN_CODE_WITH_SCOPE_SIZE,
};

/// Computes how many bytes the value of type `element_type` starting at `start` occupies,
/// reading only the length fields the type declares. Returns `None` when a length field is
/// missing, negative or smaller than its type allows. The caller is responsible for checking
/// that `start + len` fits in the containing document.
pub(crate) fn value_len(data: &[u8], start: usize, element_type: ElementType) -> Option<usize> {
    if let Some(size) = element_type.fixed_size() {
        return Some(size);
    }
    let rest = data.get(start..)?;
    match element_type {
        ElementType::String | ElementType::JavaScriptCode | ElementType::Symbol => {
            let len = read_len_prefix(rest)?;
            (len >= 1).then_some(4 + len)
        }
        ElementType::EmbeddedDocument | ElementType::Array => {
            let len = read_len_prefix(rest)?;
            (len >= MIN_BSON_DOCUMENT_SIZE).then_some(len)
        }
        ElementType::Binary => read_len_prefix(rest)?.checked_add(4 + 1),
        ElementType::RegularExpression => {
            let pattern = rest.iter().position(|b| *b == 0)?;
            let options = rest.get(pattern + 1..)?.iter().position(|b| *b == 0)?;
            Some(pattern + 1 + options + 1)
        }
        ElementType::DbPointer => {
            let len = read_len_prefix(rest)?;
            (len >= 1).then_some(4 + len + 12)
        }
        ElementType::JavaScriptCodeWithScope => {
            let len = read_len_prefix(rest)?;
            (len >= MIN_CODE_WITH_SCOPE_SIZE).then_some(len)
        }
        _ => None,
    }
}

/// A single key/type/value triple located inside a document or array buffer.
///
/// Elements do not copy anything: they record where in the containing buffer the element lives
/// and decode the value on demand. An element obtained from an exhausted iterator, a missing key
/// or a corrupt buffer is *invalid*: [`RawElement::is_valid`] reports `false` and every accessor
/// fails with an "unset element" error.
///
/// ```
/// use rawbson::{rawdoc, spec::ElementType};
///
/// let doc = rawdoc! { "a" => 1, "b" => 2.0 }?;
/// let b = doc.get("b");
/// assert_eq!(b.key()?, "b");
/// assert_eq!(b.get_f64()?, 2.0);
///
/// let err = b.get_i32().unwrap_err();
/// assert_eq!(err.expected_type(), Some(ElementType::Int32));
///
/// let missing = doc.get("z");
/// assert!(!missing.is_valid());
/// assert!(missing.key().unwrap_err().is_unset_element());
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[derive(Clone, Copy, Default)]
pub struct RawElement<'a> {
    data: &'a [u8],
    start_at: usize,
    key_len: usize,
    size: usize,
}

impl<'a> RawElement<'a> {
    /// Locates the element whose type tag is at `offset`, returning `None` at the terminator or
    /// if the element is malformed or would run past the end of `data`.
    fn parse_at(data: &'a [u8], offset: usize) -> Option<Self> {
        // the last byte of a document is its terminator, never part of an element
        let limit = data.len().checked_sub(1)?;
        if offset >= limit {
            return None;
        }
        let element_type = ElementType::from(data[offset])?;
        let key_len = data[offset + 1..limit].iter().position(|b| *b == 0)?;
        let value_start = offset + 1 + key_len + 1;
        let size = value_len(data, value_start, element_type)?;
        let end = value_start.checked_add(size)?;
        if end > limit {
            return None;
        }
        Some(Self {
            data,
            start_at: offset,
            key_len,
            size,
        })
    }

    /// Whether this element refers to a real element in a buffer.
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }

    fn check_valid(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::value_access_unset())
        }
    }

    fn value_start(&self) -> usize {
        self.start_at + 1 + self.key_len + 1
    }

    /// The offset one past the last byte of this element.
    pub(crate) fn end(&self) -> usize {
        self.value_start() + self.size
    }

    fn key_bytes(&self) -> &'a [u8] {
        &self.data[self.start_at + 1..self.start_at + 1 + self.key_len]
    }

    pub(crate) fn key_matches(&self, key: &str) -> bool {
        self.is_valid() && self.key_bytes() == key.as_bytes()
    }

    fn value_bytes(&self) -> &'a [u8] {
        &self.data[self.value_start()..self.end()]
    }

    /// The element's key.
    pub fn key(&self) -> Result<&'a str> {
        self.check_valid()?;
        try_to_str(self.key_bytes())
    }

    /// The element's type.
    pub fn element_type(&self) -> Result<ElementType> {
        self.check_valid()?;
        ElementType::from(self.data[self.start_at])
            .ok_or_else(|| Error::malformed_bytes("invalid element type tag"))
    }

    /// The complete encoded element: type tag, key and value. Empty for an invalid element.
    pub fn as_bytes(&self) -> &'a [u8] {
        if !self.is_valid() {
            return &[];
        }
        &self.data[self.start_at..self.end()]
    }

    /// The byte offset of this element's type tag within its containing buffer.
    pub fn offset(&self) -> usize {
        self.start_at
    }

    /// Decodes the element's value into a [`RawBsonRef`] that borrows from the same buffer.
    pub fn value(&self) -> Result<RawBsonRef<'a>> {
        let element_type = self.element_type()?;
        self.decode(element_type).map_err(|e| self.attach_key(e))
    }

    /// Decodes the element's value and deep-copies it into a [`RawBson`] that does not borrow
    /// from the buffer.
    pub fn to_owned_value(&self) -> Result<RawBson> {
        Ok(self.value()?.to_raw_bson())
    }

    fn attach_key(&self, error: Error) -> Error {
        match self.key() {
            Ok(key) if error.key.is_none() => error.with_key(key),
            _ => error,
        }
    }

    fn decode(&self, element_type: ElementType) -> Result<RawBsonRef<'a>> {
        let bytes = self.value_bytes();
        Ok(match element_type {
            ElementType::Double => RawBsonRef::Double(f64_from_slice(bytes)?),
            ElementType::String => RawBsonRef::String(read_lenencode(bytes)?.0),
            ElementType::EmbeddedDocument => {
                RawBsonRef::Document(RawDocument::decode_from_bytes(bytes)?)
            }
            ElementType::Array => RawBsonRef::Array(RawArray::decode_from_bytes(bytes)?),
            ElementType::Binary => RawBsonRef::Binary(decode_binary(bytes)?),
            ElementType::Undefined => RawBsonRef::Undefined,
            ElementType::ObjectId => RawBsonRef::ObjectId(ObjectId::from_slice(bytes)?),
            ElementType::Boolean => RawBsonRef::Boolean(bool_from_slice(bytes)?),
            ElementType::DateTime => {
                RawBsonRef::DateTime(DateTime::from_millis(i64_from_slice(bytes)?))
            }
            ElementType::Null => RawBsonRef::Null,
            ElementType::RegularExpression => {
                let pattern = read_nullterminated(bytes)?;
                let options = read_nullterminated(&bytes[pattern.len() + 1..])?;
                RawBsonRef::RegularExpression(RawRegexRef { pattern, options })
            }
            ElementType::DbPointer => {
                let (namespace, consumed) = read_lenencode(bytes)?;
                let id = ObjectId::from_slice(&bytes[consumed..])?;
                RawBsonRef::DbPointer(RawDbPointerRef { namespace, id })
            }
            ElementType::JavaScriptCode => RawBsonRef::JavaScriptCode(read_lenencode(bytes)?.0),
            ElementType::Symbol => RawBsonRef::Symbol(read_lenencode(bytes)?.0),
            ElementType::JavaScriptCodeWithScope => {
                RawBsonRef::JavaScriptCodeWithScope(decode_code_with_scope(bytes)?)
            }
            ElementType::Int32 => RawBsonRef::Int32(i32_from_slice(bytes)?),
            ElementType::Timestamp => {
                let mut ts = [0; 8];
                ts.copy_from_slice(bytes);
                RawBsonRef::Timestamp(Timestamp::from_le_bytes(ts))
            }
            ElementType::Int64 => RawBsonRef::Int64(i64_from_slice(bytes)?),
            ElementType::Decimal128 => {
                let mut d = [0; 16];
                d.copy_from_slice(bytes);
                RawBsonRef::Decimal128(Decimal128::from_bytes(d))
            }
            ElementType::MaxKey => RawBsonRef::MaxKey,
            ElementType::MinKey => RawBsonRef::MinKey,
        })
    }

    fn get_with<T>(
        &self,
        expected_type: ElementType,
        f: impl FnOnce(RawBsonRef<'a>) -> Option<T>,
    ) -> Result<T> {
        let actual = self.element_type()?;
        if actual != expected_type {
            return Err(self.attach_key(Error::value_access_unexpected_type(
                actual,
                expected_type,
            )));
        }
        let value = self.value()?;
        f(value).ok_or_else(|| {
            self.attach_key(Error::value_access_unexpected_type(actual, expected_type))
        })
    }

    /// Gets the double value of this element, failing with "need element type double" if the
    /// element holds something else.
    pub fn get_f64(&self) -> Result<f64> {
        self.get_with(ElementType::Double, RawBsonRef::as_f64)
    }

    /// Gets the string value of this element.
    pub fn get_str(&self) -> Result<&'a str> {
        self.get_with(ElementType::String, RawBsonRef::as_str)
    }

    /// Gets the embedded document held by this element.
    pub fn get_document(&self) -> Result<&'a RawDocument> {
        self.get_with(ElementType::EmbeddedDocument, RawBsonRef::as_document)
    }

    /// Gets the array held by this element.
    pub fn get_array(&self) -> Result<&'a RawArray> {
        self.get_with(ElementType::Array, RawBsonRef::as_array)
    }

    /// Gets the binary value of this element.
    pub fn get_binary(&self) -> Result<RawBinaryRef<'a>> {
        self.get_with(ElementType::Binary, RawBsonRef::as_binary)
    }

    /// Succeeds if this element holds the deprecated undefined value.
    pub fn get_undefined(&self) -> Result<()> {
        self.get_with(ElementType::Undefined, RawBsonRef::as_undefined)
    }

    /// Gets the ObjectId held by this element.
    pub fn get_object_id(&self) -> Result<ObjectId> {
        self.get_with(ElementType::ObjectId, RawBsonRef::as_object_id)
    }

    /// Gets the boolean value of this element.
    pub fn get_bool(&self) -> Result<bool> {
        self.get_with(ElementType::Boolean, RawBsonRef::as_bool)
    }

    /// Gets the datetime held by this element.
    pub fn get_datetime(&self) -> Result<DateTime> {
        self.get_with(ElementType::DateTime, RawBsonRef::as_datetime)
    }

    /// Succeeds if this element holds null.
    pub fn get_null(&self) -> Result<()> {
        self.get_with(ElementType::Null, RawBsonRef::as_null)
    }

    /// Gets the regular expression held by this element.
    pub fn get_regex(&self) -> Result<RawRegexRef<'a>> {
        self.get_with(ElementType::RegularExpression, RawBsonRef::as_regex)
    }

    /// Gets the DB pointer held by this element.
    pub fn get_db_pointer(&self) -> Result<RawDbPointerRef<'a>> {
        self.get_with(ElementType::DbPointer, RawBsonRef::as_db_pointer)
    }

    /// Gets the JavaScript code held by this element.
    pub fn get_javascript_code(&self) -> Result<&'a str> {
        self.get_with(ElementType::JavaScriptCode, RawBsonRef::as_javascript)
    }

    /// Gets the symbol held by this element.
    pub fn get_symbol(&self) -> Result<&'a str> {
        self.get_with(ElementType::Symbol, RawBsonRef::as_symbol)
    }

    /// Gets the JavaScript code with scope held by this element.
    pub fn get_javascript_code_with_scope(&self) -> Result<RawJavaScriptCodeWithScopeRef<'a>> {
        self.get_with(
            ElementType::JavaScriptCodeWithScope,
            RawBsonRef::as_javascript_with_scope,
        )
    }

    /// Gets the 32-bit integer value of this element.
    pub fn get_i32(&self) -> Result<i32> {
        self.get_with(ElementType::Int32, RawBsonRef::as_i32)
    }

    /// Gets the timestamp held by this element.
    pub fn get_timestamp(&self) -> Result<Timestamp> {
        self.get_with(ElementType::Timestamp, RawBsonRef::as_timestamp)
    }

    /// Gets the 64-bit integer value of this element.
    pub fn get_i64(&self) -> Result<i64> {
        self.get_with(ElementType::Int64, RawBsonRef::as_i64)
    }

    /// Gets the decimal128 value of this element.
    pub fn get_decimal128(&self) -> Result<Decimal128> {
        self.get_with(ElementType::Decimal128, RawBsonRef::as_decimal128)
    }

    /// Succeeds if this element holds max key.
    pub fn get_max_key(&self) -> Result<()> {
        self.get_with(ElementType::MaxKey, RawBsonRef::as_max_key)
    }

    /// Succeeds if this element holds min key.
    pub fn get_min_key(&self) -> Result<()> {
        self.get_with(ElementType::MinKey, RawBsonRef::as_min_key)
    }
}

pub(crate) fn decode_binary(bytes: &[u8]) -> Result<RawBinaryRef<'_>> {
    let len = read_len_prefix(bytes)
        .ok_or_else(|| Error::malformed_bytes("binary length prefix is negative"))?;
    let subtype = BinarySubtype::from(bytes[4]);
    let data = &bytes[5..];
    let data = match subtype {
        BinarySubtype::BinaryOld => {
            if len < 4 {
                return Err(Error::malformed_bytes(
                    "old binary subtype has no inner declared length",
                ));
            }
            let inner = read_len_prefix(data).ok_or_else(|| {
                Error::malformed_bytes("old binary subtype has a negative inner length")
            })?;
            if checked_add(inner, 4)? != len {
                return Err(Error::malformed_bytes(
                    "old binary subtype has wrong inner declared length",
                ));
            }
            &data[4..]
        }
        _ => data,
    };
    Ok(RawBinaryRef {
        subtype,
        bytes: data,
    })
}

fn decode_code_with_scope(bytes: &[u8]) -> Result<RawJavaScriptCodeWithScopeRef<'_>> {
    let (code, consumed) = read_lenencode(&bytes[4..])?;
    let scope_start = 4 + consumed;
    let scope = RawDocument::decode_from_bytes(&bytes[scope_start..]).map_err(|_| {
        Error::malformed_bytes("code with scope length does not match its code and scope")
    })?;
    Ok(RawJavaScriptCodeWithScopeRef { code, scope })
}

/// A forward-only cursor over the elements of a document or array.
///
/// The iterator never allocates: each step re-derives the next [`RawElement`] from the buffer. If
/// an element cannot be located (unknown type tag, missing key terminator, or a length that runs
/// past the end of the buffer) the iterator moves to its end state instead of reading out of
/// bounds. Advancing an exhausted iterator leaves it exhausted.
#[derive(Clone, Copy)]
pub struct RawIter<'a> {
    data: &'a [u8],
    current: RawElement<'a>,
}

impl<'a> RawIter<'a> {
    pub(crate) fn new(doc: &'a RawDocument) -> Self {
        let data = doc.as_bytes();
        if !doc.is_valid() {
            return Self::end();
        }
        Self {
            data,
            current: Self::locate(data, 4),
        }
    }

    /// An iterator in the end state.
    pub fn end() -> Self {
        Self {
            data: &[],
            current: RawElement::default(),
        }
    }

    fn locate(data: &'a [u8], offset: usize) -> RawElement<'a> {
        match RawElement::parse_at(data, offset) {
            Some(element) => element,
            None => {
                if offset + 1 != data.len() {
                    tracing::trace!("stopping iteration at undecodable element at offset {}", offset);
                }
                RawElement::default()
            }
        }
    }

    /// The element the iterator currently points at, which is invalid once the iterator is at its
    /// end.
    pub fn current(&self) -> RawElement<'a> {
        self.current
    }

    /// Whether the iterator is at its end.
    pub fn is_end(&self) -> bool {
        !self.current.is_valid()
    }

    /// Moves to the next element. Has no effect at the end.
    pub fn advance(&mut self) {
        if self.is_end() {
            return;
        }
        self.current = Self::locate(self.data, self.current.end());
        if self.is_end() {
            self.data = &[];
        }
    }

    /// Advances until the current element has the given key, or the end is reached.
    pub(crate) fn seek(mut self, key: &str) -> Self {
        while !self.is_end() && !self.current.key_matches(key) {
            self.advance();
        }
        self
    }
}

impl<'a> Iterator for RawIter<'a> {
    type Item = RawElement<'a>;

    fn next(&mut self) -> Option<RawElement<'a>> {
        let current = self.current;
        if !current.is_valid() {
            return None;
        }
        self.advance();
        Some(current)
    }
}

impl FusedIterator for RawIter<'_> {}

/// Two iterators are equal if both are at their end, or if they point at the same offset of the
/// same buffer.
impl PartialEq for RawIter<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_end(), other.is_end()) {
            (true, true) => true,
            (false, false) => {
                std::ptr::eq(self.data, other.data)
                    && self.current.start_at == other.current.start_at
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for RawIter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_end() {
            f.write_str("RawIter(end)")
        } else {
            f.debug_tuple("RawIter").field(&self.current.start_at).finish()
        }
    }
}

impl std::fmt::Debug for RawElement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.is_valid() {
            return f.write_str("RawElement(unset)");
        }
        f.debug_struct("RawElement")
            .field("key", &String::from_utf8_lossy(self.key_bytes()))
            .field("type", &ElementType::from(self.data[self.start_at]))
            .field("offset", &self.start_at)
            .finish()
    }
}
