use crate::{
    error::{Error, Result},
    oid::ObjectId,
    DateTime,
    Decimal128,
    Timestamp,
};

use super::{
    check_header,
    iter::RawElement,
    RawArray,
    RawBinaryRef,
    RawBsonRef,
    RawDbPointerRef,
    RawDocumentBuf,
    RawIter,
    RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
};

/// A slice of a BSON document (akin to [`std::str`]). This can be created from a
/// [`RawDocumentBuf`] or any type that contains BSON bytes, including static binary literals,
/// [`Vec<u8>`](std::vec::Vec), or arrays.
///
/// This is an _unsized_ type, meaning that it must always be used behind a pointer like `&`. For an
/// owned version of this type, see [`RawDocumentBuf`].
///
/// Elements are located by walking the buffer, so [`RawDocument::get`] and the type-specific
/// getters such as [`RawDocument::get_object_id`] or [`RawDocument::get_str`] are O(N) in the
/// number of elements before the requested key.
///
/// Equality (`==`) and hashing compare the underlying bytes, so two documents holding the same
/// fields in a different order are not equal. Use [`RawDocument::equals_ignoring_order`] to
/// compare field sets.
///
/// ```
/// use rawbson::raw::RawDocument;
///
/// let doc = RawDocument::decode_from_bytes(b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00")?;
/// let mut iter = doc.iter();
/// let element = iter.next().unwrap();
/// assert_eq!(element.key()?, "hi");
/// assert_eq!(element.get_str()?, "y'all");
/// assert!(iter.next().is_none());
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawDocument {
    data: [u8],
}

impl RawDocument {
    /// Constructs a new [`RawDocument`], validating _only_ the
    /// following invariants:
    ///   * `data` is at least five bytes long (the minimum for a valid BSON document)
    ///   * the initial four bytes of `data` accurately represent the length of the bytes as
    ///     required by the BSON spec.
    ///   * the last byte of `data` is a 0
    ///
    /// The elements are _not_ validated. Use [`validate`](crate::raw::validate) for bytes from an
    /// untrusted source.
    ///
    /// ```
    /// use rawbson::raw::RawDocument;
    ///
    /// let doc = RawDocument::decode_from_bytes(b"\x05\0\0\0\0")?;
    /// assert!(doc.is_empty());
    ///
    /// assert!(RawDocument::decode_from_bytes(b"\x06\0\0\0\0").is_err());
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn decode_from_bytes<D: AsRef<[u8]> + ?Sized>(data: &D) -> Result<&RawDocument> {
        let data = data.as_ref();
        check_header(data)?;
        Ok(RawDocument::new_unchecked(data))
    }

    /// Creates a new `RawDocument` referencing the provided data slice without checking anything.
    ///
    /// Reading through the view is always memory safe: if the bytes are not a document, the view
    /// reports itself invalid or iteration stops at the first element that cannot be decoded.
    pub fn new_unchecked<D: AsRef<[u8]> + ?Sized>(data: &D) -> &RawDocument {
        // SAFETY:
        //
        // Dereferencing a raw pointer requires unsafe due to the potential that the pointer is
        // null, dangling, or misaligned. We know the pointer is not null or dangling due to the
        // fact that it's created by a safe reference. Converting &[u8] to *const [u8] will be
        // properly aligned due to them being references to the same type, and converting *const
        // [u8] to *const RawDocument is aligned due to the fact that the only field in a
        // RawDocument is a [u8] and it is #[repr(transparent), meaning the structs are represented
        // identically at the byte level.
        unsafe { &*(data.as_ref() as *const [u8] as *const RawDocument) }
    }

    /// Whether this view covers at least a minimal document. The default view is invalid and
    /// behaves as an empty document.
    pub fn is_valid(&self) -> bool {
        self.data.len() >= super::MIN_BSON_DOCUMENT_SIZE
    }

    /// Gets the raw bytes of the document.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Checks the document framing: length prefix, size and terminator.
    pub(crate) fn check_framing(&self) -> Result<()> {
        check_header(&self.data)
    }

    /// Returns an iterator over the elements of the document, in the order they are stored.
    pub fn iter(&self) -> RawIter<'_> {
        RawIter::new(self)
    }

    /// Whether the document holds no elements.
    pub fn is_empty(&self) -> bool {
        self.iter().is_end()
    }

    /// Gets the first element with the given key by iterating until the key is found. The
    /// returned element is invalid if no such key exists.
    ///
    /// ```
    /// use rawbson::rawdoc;
    ///
    /// let doc = rawdoc! { "a" => 1, "b" => 2.0, "c" => "three" }?;
    /// assert_eq!(doc.get("b").get_f64()?, 2.0);
    /// assert!(!doc.get("z").is_valid());
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn get(&self, key: impl AsRef<str>) -> RawElement<'_> {
        self.find(key).current()
    }

    /// Whether an element with the given key exists.
    pub fn has_key(&self, key: impl AsRef<str>) -> bool {
        self.get(key).is_valid()
    }

    /// Returns an iterator positioned at the first element with the given key, or at the end if
    /// there is none.
    pub fn find(&self, key: impl AsRef<str>) -> RawIter<'_> {
        self.iter().seek(key.as_ref())
    }

    fn get_with<'a, T>(
        &'a self,
        key: impl AsRef<str>,
        f: impl FnOnce(&RawElement<'a>) -> Result<T>,
    ) -> Result<T> {
        let key = key.as_ref();
        let element = self.get(key);
        if !element.is_valid() {
            return Err(Error::value_access_not_present().with_key(key));
        }
        f(&element)
    }

    /// Gets a reference to the BSON value corresponding to a given key, or an error reporting
    /// that the key is not present.
    pub fn get_value(&self, key: impl AsRef<str>) -> Result<RawBsonRef<'_>> {
        self.get_with(key, RawElement::value)
    }

    /// Gets the double value for the given key, failing if the key is missing or holds another
    /// type.
    ///
    /// ```
    /// use rawbson::{error::ValueAccessErrorKind, rawdoc, spec::ElementType};
    ///
    /// let doc = rawdoc! { "f64" => 2.5, "i32" => 1 }?;
    ///
    /// assert_eq!(doc.get_f64("f64")?, 2.5);
    /// assert_eq!(doc.get_f64("i32").unwrap_err().expected_type(), Some(ElementType::Double));
    /// assert!(doc.get_f64("unknown").unwrap_err().is_not_present());
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn get_f64(&self, key: impl AsRef<str>) -> Result<f64> {
        self.get_with(key, RawElement::get_f64)
    }

    /// Gets the string value for the given key.
    pub fn get_str(&self, key: impl AsRef<str>) -> Result<&'_ str> {
        self.get_with(key, RawElement::get_str)
    }

    /// Gets the embedded document for the given key.
    ///
    /// ```
    /// use rawbson::rawdoc;
    ///
    /// let doc = rawdoc! { "outer" => { "inner" => true } }?;
    /// assert!(doc.get_document("outer")?.get_bool("inner")?);
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn get_document(&self, key: impl AsRef<str>) -> Result<&'_ RawDocument> {
        self.get_with(key, RawElement::get_document)
    }

    /// Gets the array for the given key.
    pub fn get_array(&self, key: impl AsRef<str>) -> Result<&'_ RawArray> {
        self.get_with(key, RawElement::get_array)
    }

    /// Gets the binary value for the given key.
    pub fn get_binary(&self, key: impl AsRef<str>) -> Result<RawBinaryRef<'_>> {
        self.get_with(key, RawElement::get_binary)
    }

    /// Checks that the given key holds `undefined`.
    pub fn get_undefined(&self, key: impl AsRef<str>) -> Result<()> {
        self.get_with(key, RawElement::get_undefined)
    }

    /// Gets the ObjectId value for the given key.
    pub fn get_object_id(&self, key: impl AsRef<str>) -> Result<ObjectId> {
        self.get_with(key, RawElement::get_object_id)
    }

    /// Gets the boolean value for the given key.
    pub fn get_bool(&self, key: impl AsRef<str>) -> Result<bool> {
        self.get_with(key, RawElement::get_bool)
    }

    /// Gets the UTC datetime value for the given key.
    pub fn get_datetime(&self, key: impl AsRef<str>) -> Result<DateTime> {
        self.get_with(key, RawElement::get_datetime)
    }

    /// Checks that the given key holds `null`.
    pub fn get_null(&self, key: impl AsRef<str>) -> Result<()> {
        self.get_with(key, RawElement::get_null)
    }

    /// Gets the regular expression for the given key.
    pub fn get_regex(&self, key: impl AsRef<str>) -> Result<RawRegexRef<'_>> {
        self.get_with(key, RawElement::get_regex)
    }

    /// Gets the DBPointer for the given key.
    pub fn get_db_pointer(&self, key: impl AsRef<str>) -> Result<RawDbPointerRef<'_>> {
        self.get_with(key, RawElement::get_db_pointer)
    }

    /// Gets the JavaScript code for the given key.
    pub fn get_javascript_code(&self, key: impl AsRef<str>) -> Result<&'_ str> {
        self.get_with(key, RawElement::get_javascript_code)
    }

    /// Gets the symbol for the given key.
    pub fn get_symbol(&self, key: impl AsRef<str>) -> Result<&'_ str> {
        self.get_with(key, RawElement::get_symbol)
    }

    /// Gets the JavaScript code with scope for the given key.
    pub fn get_javascript_code_with_scope(
        &self,
        key: impl AsRef<str>,
    ) -> Result<RawJavaScriptCodeWithScopeRef<'_>> {
        self.get_with(key, RawElement::get_javascript_code_with_scope)
    }

    /// Gets the 32-bit integer for the given key.
    pub fn get_i32(&self, key: impl AsRef<str>) -> Result<i32> {
        self.get_with(key, RawElement::get_i32)
    }

    /// Gets the timestamp for the given key.
    pub fn get_timestamp(&self, key: impl AsRef<str>) -> Result<Timestamp> {
        self.get_with(key, RawElement::get_timestamp)
    }

    /// Gets the 64-bit integer for the given key.
    pub fn get_i64(&self, key: impl AsRef<str>) -> Result<i64> {
        self.get_with(key, RawElement::get_i64)
    }

    /// Gets the decimal128 value for the given key.
    pub fn get_decimal128(&self, key: impl AsRef<str>) -> Result<Decimal128> {
        self.get_with(key, RawElement::get_decimal128)
    }

    /// Checks that the given key holds max key.
    pub fn get_max_key(&self, key: impl AsRef<str>) -> Result<()> {
        self.get_with(key, RawElement::get_max_key)
    }

    /// Checks that the given key holds min key.
    pub fn get_min_key(&self, key: impl AsRef<str>) -> Result<()> {
        self.get_with(key, RawElement::get_min_key)
    }

    /// Compares two documents as sets of fields: both must hold the same keys with equal values,
    /// in any order. Embedded documents are compared the same way; arrays and every other value
    /// must match exactly.
    ///
    /// ```
    /// use rawbson::rawdoc;
    ///
    /// let a = rawdoc! { "x" => 1, "y" => { "p" => true, "q" => false } }?;
    /// let b = rawdoc! { "y" => { "q" => false, "p" => true }, "x" => 1 }?;
    /// assert_ne!(a, b);
    /// assert!(a.equals_ignoring_order(&b));
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn equals_ignoring_order(&self, other: &RawDocument) -> bool {
        let Ok(mut theirs) = other
            .iter()
            .map(|element| -> Result<_> { Ok((element.key()?, element.value()?)) })
            .collect::<Result<Vec<_>>>()
        else {
            return false;
        };
        for element in self.iter() {
            let (Ok(key), Ok(ours)) = (element.key(), element.value()) else {
                return false;
            };
            // repeated keys must be repeated in `other` too
            let Some(at) = theirs.iter().position(|(their_key, their_value)| {
                *their_key == key && values_match(ours, *their_value)
            }) else {
                return false;
            };
            theirs.swap_remove(at);
        }
        theirs.is_empty()
    }

    /// Creates a new [`RawDocumentBuf`] with an owned copy of the BSON bytes.
    pub fn to_raw_document_buf(&self) -> RawDocumentBuf {
        RawDocumentBuf::from_vec_unchecked(self.data.to_vec())
    }
}

fn values_match(ours: RawBsonRef<'_>, theirs: RawBsonRef<'_>) -> bool {
    match (ours, theirs) {
        (RawBsonRef::Document(ours), RawBsonRef::Document(theirs)) => {
            ours.equals_ignoring_order(theirs)
        }
        (ours, theirs) => ours == theirs,
    }
}

impl Default for &RawDocument {
    fn default() -> Self {
        RawDocument::new_unchecked(b"")
    }
}

impl std::fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDocument")
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}

impl AsRef<RawDocument> for RawDocument {
    fn as_ref(&self) -> &RawDocument {
        self
    }
}

impl ToOwned for RawDocument {
    type Owned = RawDocumentBuf;

    fn to_owned(&self) -> Self::Owned {
        self.to_raw_document_buf()
    }
}

impl<'a> IntoIterator for &'a RawDocument {
    type IntoIter = RawIter<'a>;
    type Item = RawElement<'a>;

    fn into_iter(self) -> RawIter<'a> {
        self.iter()
    }
}
