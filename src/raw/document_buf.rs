use std::{
    borrow::Borrow,
    io::Read,
    ops::Deref,
    ptr::NonNull,
};

use crate::error::{Error, Result};

use super::{
    check_header,
    iter::RawElement,
    reader_to_vec,
    OwnedBuffer,
    RawDocument,
    RawIter,
    EMPTY_DOCUMENT,
};

/// An owned BSON document (akin to [`std::path::PathBuf`]), backed by an exclusively owned buffer
/// of raw BSON bytes. This can be created from a `Vec<u8>`, from memory handed over together with
/// a deleter, or by a [`RawBuilder`](crate::builder::RawBuilder).
///
/// This type implements `Deref` to [`RawDocument`], meaning that all methods on [`RawDocument`] are
/// available on [`RawDocumentBuf`] values as well. This includes [`RawDocument::get`] or any of the
/// type-specific getters, such as [`RawDocument::get_object_id`] or [`RawDocument::get_str`]. Note
/// that accessing elements is an O(N) operation, as it requires iterating through the document from
/// the beginning to find the requested key.
///
/// ```
/// use rawbson::raw::RawDocumentBuf;
///
/// let doc = RawDocumentBuf::decode_from_bytes(b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00".to_vec())?;
/// assert_eq!(doc.get_str("hi")?, "y'all");
/// # Ok::<(), rawbson::error::Error>(())
/// ```
///
/// The default value owns nothing: it derefs to a zero-length, invalid view. `std::mem::take`
/// leaves that default behind.
///
/// ```
/// use rawbson::raw::RawDocumentBuf;
///
/// let mut doc = RawDocumentBuf::empty();
/// let moved = std::mem::take(&mut doc);
/// assert!(moved.is_valid());
/// assert!(!doc.is_valid());
/// assert!(doc.as_bytes().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct RawDocumentBuf {
    data: OwnedBuffer,
}

impl RawDocumentBuf {
    /// Creates a new, empty [`RawDocumentBuf`].
    pub fn empty() -> RawDocumentBuf {
        Self::from_vec_unchecked(EMPTY_DOCUMENT.to_vec())
    }

    /// Constructs a new [`RawDocumentBuf`], validating _only_ the
    /// following invariants:
    ///   * `data` is at least five bytes long (the minimum for a valid BSON document)
    ///   * the initial four bytes of `data` accurately represent the length of the bytes as
    ///     required by the BSON spec.
    ///   * the last byte of `data` is a 0
    ///
    /// Note that the internal structure of the bytes representing the
    /// BSON elements is _not_ validated at all by this method.
    ///
    /// ```
    /// use rawbson::raw::RawDocumentBuf;
    ///
    /// let doc = RawDocumentBuf::decode_from_bytes(b"\x05\0\0\0\0".to_vec())?;
    /// assert!(doc.is_empty());
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn decode_from_bytes(data: Vec<u8>) -> Result<RawDocumentBuf> {
        check_header(&data)?;
        Ok(Self::from_vec_unchecked(data))
    }

    /// Like [`RawDocumentBuf::decode_from_bytes`], but hands the bytes to `release` when the
    /// document is dropped instead of freeing them. `release` also runs if the framing check fails.
    pub fn from_bytes_with_release(
        data: Vec<u8>,
        release: impl FnOnce(Vec<u8>) + Send + 'static,
    ) -> Result<RawDocumentBuf> {
        Self::from_owned_buffer(OwnedBuffer::with_release(data, release))
    }

    /// Takes ownership of `len` bytes at `ptr` without copying them, checking the document framing.
    /// `deleter` runs exactly once, when the document is dropped, or before returning if the
    /// framing check fails.
    ///
    /// # Safety
    ///
    /// The same contract as [`OwnedBuffer::from_raw_parts`].
    pub unsafe fn from_raw_parts(
        ptr: *mut u8,
        len: usize,
        deleter: impl FnOnce(NonNull<u8>, usize) + Send + 'static,
    ) -> Result<RawDocumentBuf> {
        Self::from_owned_buffer(OwnedBuffer::from_raw_parts(ptr, len, deleter))
    }

    /// Wraps an [`OwnedBuffer`], checking the document framing.
    pub fn from_owned_buffer(data: OwnedBuffer) -> Result<RawDocumentBuf> {
        check_header(data.as_slice())?;
        Ok(Self { data })
    }

    /// Reads exactly one document from `reader`, using its length prefix to know how many bytes to
    /// consume.
    pub fn from_reader<R: Read>(reader: R) -> Result<RawDocumentBuf> {
        Self::decode_from_bytes(reader_to_vec(reader)?)
    }

    pub(crate) fn from_vec_unchecked(data: Vec<u8>) -> RawDocumentBuf {
        Self {
            data: OwnedBuffer::from_vec(data),
        }
    }

    /// Gets an iterator over the elements in the [`RawDocumentBuf`].
    ///
    /// # Note:
    ///
    /// There is no owning iterator for [`RawDocumentBuf`]. If you need ownership over
    /// elements that might need to allocate, you must explicitly convert
    /// them to owned types yourself.
    pub fn iter(&self) -> RawIter<'_> {
        self.as_ref().iter()
    }

    /// Returns the contained data as a `Vec<u8>`, running the release strategy of a buffer that
    /// was not allocated as a `Vec<u8>` after copying its bytes out.
    ///
    /// ```
    /// use rawbson::raw::RawDocumentBuf;
    ///
    /// let doc = RawDocumentBuf::empty();
    /// assert_eq!(doc.into_bytes(), b"\x05\x00\x00\x00\x00".to_vec());
    /// ```
    pub fn into_bytes(self) -> Vec<u8> {
        self.data.into_vec()
    }

    /// Gives up the underlying buffer, keeping its release strategy.
    pub fn into_owned_buffer(self) -> OwnedBuffer {
        self.data
    }
}

impl Deref for RawDocumentBuf {
    type Target = RawDocument;

    fn deref(&self) -> &Self::Target {
        RawDocument::new_unchecked(self.data.as_slice())
    }
}

impl AsRef<RawDocument> for RawDocumentBuf {
    fn as_ref(&self) -> &RawDocument {
        self
    }
}

impl Borrow<RawDocument> for RawDocumentBuf {
    fn borrow(&self) -> &RawDocument {
        self
    }
}

impl PartialEq for RawDocumentBuf {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for RawDocumentBuf {}

impl std::hash::Hash for RawDocumentBuf {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_ref().hash(state)
    }
}

impl PartialEq<RawDocument> for RawDocumentBuf {
    fn eq(&self, other: &RawDocument) -> bool {
        self.as_ref() == other
    }
}

impl PartialEq<RawDocumentBuf> for RawDocument {
    fn eq(&self, other: &RawDocumentBuf) -> bool {
        self == other.as_ref()
    }
}

impl std::fmt::Debug for RawDocumentBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDocumentBuf")
            .field("data", &hex::encode(self.as_bytes()))
            .finish()
    }
}

impl TryFrom<Vec<u8>> for RawDocumentBuf {
    type Error = Error;

    fn try_from(data: Vec<u8>) -> Result<Self> {
        Self::decode_from_bytes(data)
    }
}

impl From<&RawDocument> for RawDocumentBuf {
    fn from(doc: &RawDocument) -> Self {
        doc.to_raw_document_buf()
    }
}

impl<'a> IntoIterator for &'a RawDocumentBuf {
    type IntoIter = RawIter<'a>;
    type Item = RawElement<'a>;

    fn into_iter(self) -> RawIter<'a> {
        self.iter()
    }
}
