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
    RawArrayBuf,
    RawBinaryRef,
    RawBsonRef,
    RawDbPointerRef,
    RawDocument,
    RawIter,
    RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
};

/// A slice of a BSON document containing a BSON array value (akin to [`std::str`]). This can be
/// retrieved from a [`RawDocument`] via [`RawDocument::get_array`].
///
/// This is an _unsized_ type, meaning that it must always be used behind a pointer like `&`.
///
/// An array is encoded as a document whose keys are the positional indexes `"0"`, `"1"`, ...
/// Iterating yields the same [`RawElement`]s a document does, in stored order.
///
/// ```
/// use rawbson::rawdoc;
///
/// let doc = rawdoc! { "x" => [1, true, "two", 5.5] }?;
/// let array = doc.get_array("x")?;
///
/// let keys = array
///     .into_iter()
///     .map(|element| element.key())
///     .collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(keys, ["0", "1", "2", "3"]);
/// # Ok::<(), rawbson::error::Error>(())
/// ```
///
/// Individual elements can be accessed using [`RawArray::get`] or any of
/// the type-specific getters, such as [`RawArray::get_object_id`] or
/// [`RawArray::get_str`]. Note that accessing elements is an O(N) operation, as it
/// requires iterating through the array from the beginning to find the requested index.
///
/// ```
/// use rawbson::rawdoc;
///
/// let doc = rawdoc! { "x" => [1, true, "two", 5.5] }?;
/// let array = doc.get_array("x")?;
///
/// assert_eq!(array.get_bool(1)?, true);
/// assert_eq!(array.get_i32(4).unwrap_err().index, Some(4));
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawArray {
    pub(crate) doc: RawDocument,
}

impl RawArray {
    pub(crate) fn from_doc(doc: &RawDocument) -> &RawArray {
        // SAFETY:
        //
        // Dereferencing a raw pointer requires unsafe due to the potential that the pointer is
        // null, dangling, or misaligned. We know the pointer is not null or dangling due to the
        // fact that it's created by a safe reference. Converting &RawDocument to *const
        // RawDocument will be properly aligned due to them being references to the same type,
        // and converting *const RawDocument to *const RawArray is aligned due to the fact that
        // the only field in a RawArray is a RawDocument, meaning the structs are represented
        // identically at the byte level.
        unsafe { &*(doc as *const RawDocument as *const RawArray) }
    }

    /// Constructs a new [`RawArray`] after checking the framing of `data` the same way
    /// [`RawDocument::decode_from_bytes`] does.
    pub fn decode_from_bytes<D: AsRef<[u8]> + ?Sized>(data: &D) -> Result<&RawArray> {
        let data = data.as_ref();
        check_header(data)?;
        Ok(RawArray::new_unchecked(data))
    }

    /// Creates a new `RawArray` referencing the provided data slice without checking anything.
    pub fn new_unchecked<D: AsRef<[u8]> + ?Sized>(data: &D) -> &RawArray {
        RawArray::from_doc(RawDocument::new_unchecked(data))
    }

    /// Views this array as the document it is encoded as.
    pub fn as_doc(&self) -> &RawDocument {
        &self.doc
    }

    /// Gets the raw bytes of the array.
    pub fn as_bytes(&self) -> &[u8] {
        self.doc.as_bytes()
    }

    /// Whether this view covers at least a minimal array.
    pub fn is_valid(&self) -> bool {
        self.doc.is_valid()
    }

    /// Returns an iterator over the elements of the array.
    pub fn iter(&self) -> RawIter<'_> {
        self.doc.iter()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    /// Gets the element at the given index, scanning for the key spelling that index. The returned
    /// element is invalid if the index is out of range.
    pub fn get(&self, index: usize) -> RawElement<'_> {
        self.doc.get(index.to_string())
    }

    fn get_with<'a, T>(
        &'a self,
        index: usize,
        f: impl FnOnce(&RawElement<'a>) -> Result<T>,
    ) -> Result<T> {
        let element = self.get(index);
        if !element.is_valid() {
            return Err(Error::value_access_not_present().with_index(index));
        }
        f(&element).map_err(|mut e| {
            e.key = None;
            e.with_index(index)
        })
    }

    /// Gets the value at the given index, or an error reporting that it is not present.
    pub fn get_value(&self, index: usize) -> Result<RawBsonRef<'_>> {
        self.get_with(index, RawElement::value)
    }

    /// Gets the BSON double at the given index or returns an error if the value at that index isn't
    /// a double.
    pub fn get_f64(&self, index: usize) -> Result<f64> {
        self.get_with(index, RawElement::get_f64)
    }

    /// Gets a reference to the string at the given index or returns an error if the
    /// value at that index isn't a string.
    pub fn get_str(&self, index: usize) -> Result<&str> {
        self.get_with(index, RawElement::get_str)
    }

    /// Gets a reference to the document at the given index or returns an error if the
    /// value at that index isn't a document.
    pub fn get_document(&self, index: usize) -> Result<&RawDocument> {
        self.get_with(index, RawElement::get_document)
    }

    /// Gets a reference to the array at the given index or returns an error if the
    /// value at that index isn't an array.
    pub fn get_array(&self, index: usize) -> Result<&RawArray> {
        self.get_with(index, RawElement::get_array)
    }

    /// Gets a reference to the BSON binary value at the given index or returns an error if the
    /// value at that index isn't a binary.
    pub fn get_binary(&self, index: usize) -> Result<RawBinaryRef<'_>> {
        self.get_with(index, RawElement::get_binary)
    }

    /// Checks that the value at the given index is undefined.
    pub fn get_undefined(&self, index: usize) -> Result<()> {
        self.get_with(index, RawElement::get_undefined)
    }

    /// Gets the ObjectId at the given index or returns an error if the value at that index isn't an
    /// ObjectId.
    pub fn get_object_id(&self, index: usize) -> Result<ObjectId> {
        self.get_with(index, RawElement::get_object_id)
    }

    /// Gets the boolean at the given index or returns an error if the value at that index isn't a
    /// boolean.
    pub fn get_bool(&self, index: usize) -> Result<bool> {
        self.get_with(index, RawElement::get_bool)
    }

    /// Gets the DateTime at the given index or returns an error if the value at that index isn't a
    /// DateTime.
    pub fn get_datetime(&self, index: usize) -> Result<DateTime> {
        self.get_with(index, RawElement::get_datetime)
    }

    /// Checks that the value at the given index is null.
    pub fn get_null(&self, index: usize) -> Result<()> {
        self.get_with(index, RawElement::get_null)
    }

    /// Gets a reference to the BSON regex at the given index or returns an error if the
    /// value at that index isn't a regex.
    pub fn get_regex(&self, index: usize) -> Result<RawRegexRef<'_>> {
        self.get_with(index, RawElement::get_regex)
    }

    /// Gets the DBPointer at the given index.
    pub fn get_db_pointer(&self, index: usize) -> Result<RawDbPointerRef<'_>> {
        self.get_with(index, RawElement::get_db_pointer)
    }

    /// Gets the JavaScript code at the given index.
    pub fn get_javascript_code(&self, index: usize) -> Result<&str> {
        self.get_with(index, RawElement::get_javascript_code)
    }

    /// Gets the symbol at the given index.
    pub fn get_symbol(&self, index: usize) -> Result<&str> {
        self.get_with(index, RawElement::get_symbol)
    }

    /// Gets the JavaScript code with scope at the given index.
    pub fn get_javascript_code_with_scope(
        &self,
        index: usize,
    ) -> Result<RawJavaScriptCodeWithScopeRef<'_>> {
        self.get_with(index, RawElement::get_javascript_code_with_scope)
    }

    /// Gets the BSON int32 at the given index or returns an error if the value at that index isn't
    /// a 32-bit integer.
    pub fn get_i32(&self, index: usize) -> Result<i32> {
        self.get_with(index, RawElement::get_i32)
    }

    /// Gets a copy of the BSON timestamp at the given index or returns an error if the value at
    /// that index isn't a timestamp.
    pub fn get_timestamp(&self, index: usize) -> Result<Timestamp> {
        self.get_with(index, RawElement::get_timestamp)
    }

    /// Gets the BSON int64 at the given index or returns an error if the value at that index isn't
    /// a 64-bit integer.
    pub fn get_i64(&self, index: usize) -> Result<i64> {
        self.get_with(index, RawElement::get_i64)
    }

    /// Gets the decimal128 at the given index.
    pub fn get_decimal128(&self, index: usize) -> Result<Decimal128> {
        self.get_with(index, RawElement::get_decimal128)
    }

    /// Checks that the value at the given index is max key.
    pub fn get_max_key(&self, index: usize) -> Result<()> {
        self.get_with(index, RawElement::get_max_key)
    }

    /// Checks that the value at the given index is min key.
    pub fn get_min_key(&self, index: usize) -> Result<()> {
        self.get_with(index, RawElement::get_min_key)
    }

    /// Creates a new [`RawArrayBuf`] with an owned copy of the BSON bytes.
    pub fn to_raw_array_buf(&self) -> RawArrayBuf {
        RawArrayBuf::from_vec_unchecked(self.as_bytes().to_vec())
    }
}

impl Default for &RawArray {
    fn default() -> Self {
        RawArray::new_unchecked(b"")
    }
}

impl std::fmt::Debug for RawArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawArray")
            .field("data", &hex::encode(self.doc.as_bytes()))
            .finish()
    }
}

impl AsRef<RawArray> for RawArray {
    fn as_ref(&self) -> &RawArray {
        self
    }
}

impl ToOwned for RawArray {
    type Owned = RawArrayBuf;

    fn to_owned(&self) -> Self::Owned {
        self.to_raw_array_buf()
    }
}

impl<'a> IntoIterator for &'a RawArray {
    type IntoIter = RawIter<'a>;
    type Item = RawElement<'a>;

    fn into_iter(self) -> RawIter<'a> {
        self.iter()
    }
}
