//! Incremental construction of BSON buffers.
//!
//! [`RawBuilder`] is the structural engine: a stack of open containers writing into one growable
//! buffer, with a pending key for documents and generated positional keys for arrays. Every
//! operation is checked before anything is written, so a protocol violation returns an error and
//! leaves the accumulated bytes untouched.
//!
//! ```
//! use rawbson::{builder::RawBuilder, spec::ElementType};
//!
//! let mut builder = RawBuilder::new_document();
//! builder.key("a")?.append(1)?;
//! builder.key("b")?.append(2.0)?;
//! builder.key("c")?.append("three")?;
//! let doc = builder.extract_document()?;
//!
//! let types = doc
//!     .iter()
//!     .map(|element| element.element_type())
//!     .collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(types, [ElementType::Int32, ElementType::Double, ElementType::String]);
//! assert_eq!(doc.get("b").get_f64()?, 2.0);
//! assert!(!doc.get("z").is_valid());
//! # Ok::<(), rawbson::error::Error>(())
//! ```
//!
//! Two thinner facades drive the same engine: [`basic`] (key/value appends with callback-scoped
//! sub-containers, also behind the [`rawdoc!`](crate::rawdoc) and [`rawarr!`](crate::rawarr)
//! macros) and [`stream`] (typestate contexts that make key/value alternation a compile-time
//! property).

pub mod basic;
pub mod stream;
#[cfg(test)]
mod test;

use crate::{
    error::{BuilderErrorKind, Error, Result},
    raw::{
        check_cstring,
        RawArray,
        RawArrayBuf,
        RawBsonRef,
        RawDocument,
        RawDocumentBuf,
        Validator,
        EMPTY_DOCUMENT,
    },
    spec::{BinarySubtype, ElementType},
};

#[derive(Clone, Debug)]
struct Frame {
    /// Offset of the container's length prefix.
    start: usize,
    is_array: bool,
    /// Number of values appended so far; the next generated array key.
    count: usize,
}

/// A saved builder state that a facade can return to after a failed compound operation.
#[derive(Clone, Debug)]
pub(crate) struct Checkpoint {
    len: usize,
    root: Frame,
    stack: Vec<Frame>,
    key: Option<String>,
}

/// The structural state machine that emits a BSON document or array.
///
/// The builder itself is the top-level container. While no sub-container is open the accumulated
/// bytes are always a complete, terminated buffer, which [`RawBuilder::view_document`] exposes
/// without copying and [`RawBuilder::extract_document`] hands over as a [`RawDocumentBuf`],
/// resetting the builder for reuse.
///
/// Inside a document a key must be declared with [`RawBuilder::key`] before each value; inside an
/// array keys are generated as `"0"`, `"1"`, ...
///
/// ```
/// use rawbson::builder::RawBuilder;
///
/// let mut builder = RawBuilder::new_document();
/// builder.key("list")?.open_array()?;
/// builder.append(1)?.append(2)?.append(3)?;
/// builder.close_array()?;
///
/// let doc = builder.extract_document()?;
/// let list = doc.get_array("list")?;
/// assert_eq!(list.get_i32(1)?, 2);
/// # Ok::<(), rawbson::error::Error>(())
/// ```
///
/// A builder must not be shared between threads without external synchronization; every
/// operation takes `&mut self`.
#[derive(Clone, Debug)]
pub struct RawBuilder {
    data: Vec<u8>,
    root: Frame,
    stack: Vec<Frame>,
    key: Option<String>,
}

impl Default for RawBuilder {
    fn default() -> Self {
        Self::new_document()
    }
}

impl RawBuilder {
    /// A builder whose top-level container is a document.
    pub fn new_document() -> Self {
        Self::with_root(false)
    }

    /// A builder whose top-level container is an array.
    pub fn new_array() -> Self {
        Self::with_root(true)
    }

    fn with_root(is_array: bool) -> Self {
        Self {
            data: EMPTY_DOCUMENT.to_vec(),
            root: Frame {
                start: 0,
                is_array,
                count: 0,
            },
            stack: Vec::new(),
            key: None,
        }
    }

    /// Whether the top-level container is an array.
    pub fn is_array(&self) -> bool {
        self.root.is_array
    }

    /// The number of open sub-containers.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether a key is waiting for its value.
    pub fn has_pending_key(&self) -> bool {
        self.key.is_some()
    }

    fn current(&self) -> &Frame {
        self.stack.last().unwrap_or(&self.root)
    }

    fn current_mut(&mut self) -> &mut Frame {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    fn violation(&self, kind: BuilderErrorKind) -> Error {
        tracing::debug!("rejecting builder operation at depth {}: {}", self.stack.len(), kind);
        Error::builder(kind)
    }

    /// Declares the key of the next value in the current document.
    ///
    /// Fails with [`BuilderErrorKind::KeyInArray`] inside an array, with
    /// [`BuilderErrorKind::UnmatchedKey`] if a key is already pending, and with
    /// [`BuilderErrorKind::InteriorNul`] if the key contains a NUL byte.
    pub fn key(&mut self, key: impl AsRef<str>) -> Result<&mut Self> {
        let key = key.as_ref();
        if self.current().is_array {
            return Err(self.violation(BuilderErrorKind::KeyInArray));
        }
        if self.key.is_some() {
            return Err(self.violation(BuilderErrorKind::UnmatchedKey));
        }
        if let Err(e) = check_cstring(key) {
            tracing::debug!("rejecting builder key: {}", e);
            return Err(e);
        }
        self.key = Some(key.to_string());
        Ok(self)
    }

    /// Checks that a value may be written in the current position without consuming the key.
    fn check_value_position(&self) -> Result<()> {
        if !self.current().is_array && self.key.is_none() {
            return Err(self.violation(BuilderErrorKind::NeedKey));
        }
        Ok(())
    }

    /// Checks that `additional` more bytes keep the whole buffer within the int32 range.
    fn check_size(&self, additional: usize) -> Result<()> {
        let length = self.data.len().saturating_add(additional);
        if length > i32::MAX as usize {
            return Err(self.violation(BuilderErrorKind::TooLarge { length }));
        }
        Ok(())
    }

    /// The key for the next value: the pending key in a document, the next index in an array.
    /// Callers check the position first.
    fn take_key(&mut self) -> String {
        let frame = self.current_mut();
        if frame.is_array {
            let key = frame.count.to_string();
            frame.count += 1;
            key
        } else {
            frame.count += 1;
            self.key.take().unwrap_or_default()
        }
    }

    /// Writes the type tag and key of a new element at the end of the open container.
    fn begin_element(&mut self, element_type: ElementType) {
        let key = self.take_key();
        if self.stack.is_empty() {
            // reopen the root by dropping its terminator
            self.data.pop();
        }
        self.data.push(element_type as u8);
        self.data.extend(key.as_bytes());
        self.data.push(0);
    }

    /// Finishes an element written at the root by restoring the terminator and length.
    fn end_element(&mut self) {
        if self.stack.is_empty() {
            self.data.push(0);
            self.patch_length(0);
        }
    }

    fn patch_length(&mut self, start: usize) {
        let length = (self.data.len() - start) as i32;
        self.data[start..start + 4].copy_from_slice(&length.to_le_bytes());
    }

    /// Appends a value under the pending key (in a document) or the next index (in an array).
    ///
    /// ```
    /// use rawbson::{builder::RawBuilder, error::BuilderErrorKind};
    ///
    /// let mut builder = RawBuilder::new_document();
    /// let err = builder.append(1).unwrap_err();
    /// assert_eq!(err.builder_kind(), Some(&BuilderErrorKind::NeedKey));
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn append<'a>(&mut self, value: impl Into<RawBsonRef<'a>>) -> Result<&mut Self> {
        let value = value.into();
        self.check_value_position()?;
        if let Err(e) = value.check_encodable() {
            tracing::debug!("rejecting builder value: {}", e);
            return Err(e);
        }
        self.check_size(value.encoded_len() + 16)?;

        self.begin_element(value.element_type());
        value.append_to(&mut self.data);
        self.end_element();
        Ok(self)
    }

    /// Appends a binary value of `len` zero bytes and returns the payload so the caller can fill
    /// it in place.
    ///
    /// ```
    /// use rawbson::{builder::RawBuilder, spec::BinarySubtype};
    ///
    /// let mut builder = RawBuilder::new_document();
    /// builder
    ///     .key("bin")?
    ///     .append_binary_uninit(BinarySubtype::Generic, 3)?
    ///     .copy_from_slice(&[1, 2, 3]);
    /// let doc = builder.extract_document()?;
    /// assert_eq!(doc.get_binary("bin")?.bytes, &[1, 2, 3]);
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn append_binary_uninit(&mut self, subtype: BinarySubtype, len: usize) -> Result<&mut [u8]> {
        self.check_value_position()?;
        let inner = if subtype == BinarySubtype::BinaryOld {
            4
        } else {
            0
        };
        let payload_len = len.saturating_add(inner);
        if payload_len > i32::MAX as usize {
            return Err(self.violation(BuilderErrorKind::TooLarge {
                length: payload_len,
            }));
        }
        self.check_size(payload_len + 16)?;

        self.begin_element(ElementType::Binary);
        self.data.extend((payload_len as i32).to_le_bytes());
        self.data.push(subtype.into());
        if inner > 0 {
            self.data.extend((len as i32).to_le_bytes());
        }
        let start = self.data.len();
        self.data.resize(start + len, 0);
        self.end_element();
        Ok(&mut self.data[start..start + len])
    }

    fn open(&mut self, is_array: bool) -> Result<&mut Self> {
        self.check_value_position()?;
        self.check_size(EMPTY_DOCUMENT.len() + 16)?;
        self.begin_element(if is_array {
            ElementType::Array
        } else {
            ElementType::EmbeddedDocument
        });
        self.stack.push(Frame {
            start: self.data.len(),
            is_array,
            count: 0,
        });
        self.data.extend([0; 4]);
        Ok(self)
    }

    /// Opens a sub-document under the pending key or next array index.
    pub fn open_document(&mut self) -> Result<&mut Self> {
        self.open(false)
    }

    /// Opens a sub-array under the pending key or next array index.
    pub fn open_array(&mut self) -> Result<&mut Self> {
        self.open(true)
    }

    fn close(&mut self, is_array: bool) -> Result<&mut Self> {
        let Some(top) = self.stack.last() else {
            return Err(self.violation(if is_array {
                BuilderErrorKind::NoArrayToClose
            } else {
                BuilderErrorKind::NoDocumentToClose
            }));
        };
        if top.is_array != is_array {
            return Err(self.violation(if is_array {
                BuilderErrorKind::CloseArrayInDocument
            } else {
                BuilderErrorKind::CloseDocumentInArray
            }));
        }
        if self.key.is_some() {
            return Err(self.violation(BuilderErrorKind::UnmatchedKey));
        }
        self.check_size(1)?;

        let start = top.start;
        self.data.push(0);
        self.patch_length(start);
        self.stack.pop();
        self.end_element();
        Ok(self)
    }

    /// Closes the innermost open sub-document.
    pub fn close_document(&mut self) -> Result<&mut Self> {
        self.close(false)
    }

    /// Closes the innermost open sub-array.
    pub fn close_array(&mut self) -> Result<&mut Self> {
        self.close(true)
    }

    /// Appends every element of `doc` to the current container. In an array the elements are
    /// re-keyed with the next indexes; in a document their keys are kept.
    ///
    /// `doc` is validated first, so a corrupt document is rejected without writing anything.
    ///
    /// ```
    /// use rawbson::{builder::RawBuilder, rawdoc};
    ///
    /// let extra = rawdoc! { "x" => 1, "y" => 2 }?;
    ///
    /// let mut builder = RawBuilder::new_array();
    /// builder.append("first")?.concatenate(&extra)?;
    /// let array = builder.extract_array()?;
    /// assert_eq!(array.get_i32(2)?, 2);
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn concatenate(&mut self, doc: &RawDocument) -> Result<&mut Self> {
        if self.key.is_some() {
            return Err(self.violation(BuilderErrorKind::UnmatchedKey));
        }
        let doc = Validator::new().validate(doc.as_bytes())?;
        self.check_size(doc.as_bytes().len() * 2)?;

        if self.stack.is_empty() {
            self.data.pop();
        }
        if self.current().is_array {
            for element in doc {
                let bytes = element.as_bytes();
                let key_len = element.key()?.len();
                let index = self.current_mut().count;
                self.current_mut().count += 1;
                self.data.push(bytes[0]);
                self.data.extend(index.to_string().as_bytes());
                self.data.push(0);
                self.data.extend(&bytes[1 + key_len + 1..]);
            }
        } else {
            let body = &doc.as_bytes()[4..doc.as_bytes().len() - 1];
            self.data.extend(body);
            self.current_mut().count += doc.iter().count();
        }
        self.end_element();
        Ok(self)
    }

    /// Checks that the root is complete: no open sub-containers and no pending key.
    fn check_complete(&self, want_array: bool) -> Result<()> {
        if self.root.is_array != want_array {
            return Err(self.violation(if want_array {
                BuilderErrorKind::ArrayOperationOnDocument
            } else {
                BuilderErrorKind::DocumentOperationOnArray
            }));
        }
        if !self.stack.is_empty() {
            return Err(self.violation(BuilderErrorKind::OpenContainers {
                depth: self.stack.len(),
            }));
        }
        if self.key.is_some() {
            return Err(self.violation(BuilderErrorKind::UnmatchedKey));
        }
        Ok(())
    }

    /// A view of the document built so far.
    pub fn view_document(&self) -> Result<&RawDocument> {
        self.check_complete(false)?;
        Ok(RawDocument::new_unchecked(&self.data))
    }

    /// A view of the array built so far.
    pub fn view_array(&self) -> Result<&RawArray> {
        self.check_complete(true)?;
        Ok(RawArray::new_unchecked(&self.data))
    }

    /// Takes the finished document, leaving an empty document builder behind.
    pub fn extract_document(&mut self) -> Result<RawDocumentBuf> {
        self.check_complete(false)?;
        let data = std::mem::replace(&mut self.data, EMPTY_DOCUMENT.to_vec());
        self.clear();
        Ok(RawDocumentBuf::from_vec_unchecked(data))
    }

    /// Takes the finished array, leaving an empty array builder behind.
    pub fn extract_array(&mut self) -> Result<RawArrayBuf> {
        self.check_complete(true)?;
        let data = std::mem::replace(&mut self.data, EMPTY_DOCUMENT.to_vec());
        self.clear();
        Ok(RawArrayBuf::from_vec_unchecked(data))
    }

    /// Discards everything built so far, keeping the kind of the top-level container.
    pub fn clear(&mut self) {
        *self = Self::with_root(self.root.is_array);
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            len: self.data.len(),
            root: self.root.clone(),
            stack: self.stack.clone(),
            key: self.key.clone(),
        }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.data.truncate(checkpoint.len);
        self.root = checkpoint.root;
        self.stack = checkpoint.stack;
        self.key = checkpoint.key;
        if self.stack.is_empty() {
            if let Some(last) = self.data.last_mut() {
                *last = 0;
            }
            self.patch_length(0);
        }
    }
}
