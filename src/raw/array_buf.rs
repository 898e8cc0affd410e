use std::{borrow::Borrow, fmt::Debug, io::Read, ops::Deref, ptr::NonNull};

use crate::error::{Error, Result};

use super::{iter::RawElement, OwnedBuffer, RawArray, RawDocumentBuf, RawIter};

/// An owned BSON array (akin to [`std::path::PathBuf`]), backed by an exclusively owned buffer of
/// raw BSON bytes.
///
/// This type implements `Deref` to [`RawArray`], so every getter available on a borrowed array is
/// available here too. The default value owns nothing and derefs to an invalid, zero-length view.
///
/// ```
/// use rawbson::rawarr;
///
/// let array = rawarr![1, 2, 3]?;
/// assert_eq!(array.get_i32(1)?, 2);
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RawArrayBuf {
    inner: RawDocumentBuf,
}

impl RawArrayBuf {
    /// Construct a new, empty `RawArrayBuf`.
    pub fn empty() -> RawArrayBuf {
        Self {
            inner: RawDocumentBuf::empty(),
        }
    }

    /// Constructs a new [`RawArrayBuf`], checking only the framing of `data`, the same way
    /// [`RawDocumentBuf::decode_from_bytes`] does.
    pub fn decode_from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(Self {
            inner: RawDocumentBuf::decode_from_bytes(data)?,
        })
    }

    /// Like [`RawArrayBuf::decode_from_bytes`], but hands the bytes to `release` when the array is
    /// dropped.
    pub fn from_bytes_with_release(
        data: Vec<u8>,
        release: impl FnOnce(Vec<u8>) + Send + 'static,
    ) -> Result<Self> {
        Ok(Self {
            inner: RawDocumentBuf::from_bytes_with_release(data, release)?,
        })
    }

    /// Takes ownership of `len` bytes at `ptr` without copying them. See
    /// [`RawDocumentBuf::from_raw_parts`].
    ///
    /// # Safety
    ///
    /// The same contract as [`OwnedBuffer::from_raw_parts`].
    pub unsafe fn from_raw_parts(
        ptr: *mut u8,
        len: usize,
        deleter: impl FnOnce(NonNull<u8>, usize) + Send + 'static,
    ) -> Result<Self> {
        Ok(Self {
            inner: RawDocumentBuf::from_raw_parts(ptr, len, deleter)?,
        })
    }

    /// Wraps an [`OwnedBuffer`], checking the array framing.
    pub fn from_owned_buffer(data: OwnedBuffer) -> Result<Self> {
        Ok(Self {
            inner: RawDocumentBuf::from_owned_buffer(data)?,
        })
    }

    /// Reads exactly one array from `reader`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self {
            inner: RawDocumentBuf::from_reader(reader)?,
        })
    }

    pub(crate) fn from_vec_unchecked(data: Vec<u8>) -> Self {
        Self {
            inner: RawDocumentBuf::from_vec_unchecked(data),
        }
    }

    /// Gets an iterator over the elements of the array.
    pub fn iter(&self) -> RawIter<'_> {
        self.inner.iter()
    }

    /// Returns the contained data as a `Vec<u8>`.
    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_bytes()
    }

    /// Gives up the underlying buffer, keeping its release strategy.
    pub fn into_owned_buffer(self) -> OwnedBuffer {
        self.inner.into_owned_buffer()
    }
}

impl Debug for RawArrayBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawArrayBuf")
            .field("data", &hex::encode(self.as_bytes()))
            .finish()
    }
}

impl Deref for RawArrayBuf {
    type Target = RawArray;

    fn deref(&self) -> &Self::Target {
        RawArray::from_doc(&self.inner)
    }
}

impl AsRef<RawArray> for RawArrayBuf {
    fn as_ref(&self) -> &RawArray {
        RawArray::from_doc(&self.inner)
    }
}

impl Borrow<RawArray> for RawArrayBuf {
    fn borrow(&self) -> &RawArray {
        self.as_ref()
    }
}

impl TryFrom<Vec<u8>> for RawArrayBuf {
    type Error = Error;

    fn try_from(data: Vec<u8>) -> Result<Self> {
        Self::decode_from_bytes(data)
    }
}

impl From<&RawArray> for RawArrayBuf {
    fn from(array: &RawArray) -> Self {
        array.to_raw_array_buf()
    }
}

impl<'a> IntoIterator for &'a RawArrayBuf {
    type IntoIter = RawIter<'a>;
    type Item = RawElement<'a>;

    fn into_iter(self) -> RawIter<'a> {
        self.iter()
    }
}
