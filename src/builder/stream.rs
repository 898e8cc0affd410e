//! A chained builder whose types enforce the key/value protocol.
//!
//! Every step consumes the current context and returns the next one: a document context only
//! offers `key`, the value context it returns only offers a value (or a nested container), and
//! each nested container returns to its parent when closed. Mismatched closes and missing keys do
//! not compile. Errors that depend on the data itself (a key with a NUL byte, an oversized value)
//! are remembered and reported by `finish`; once one has occurred the remaining steps are ignored.
//!
//! ```
//! use rawbson::builder::stream::StreamDocument;
//!
//! let doc = StreamDocument::new()
//!     .key("a").value(1)
//!     .key("sub").open_document()
//!         .key("b").value("two")
//!     .close_document()
//!     .key("list").open_array()
//!         .value(1.5)
//!         .value(true)
//!     .close_array()
//!     .finish()?;
//!
//! assert_eq!(doc.get_document("sub")?.get_str("b")?, "two");
//! assert!(doc.get_array("list")?.get_bool(1)?);
//! # Ok::<(), rawbson::error::Error>(())
//! ```

use crate::{
    error::Result,
    raw::{RawArrayBuf, RawBsonRef, RawDocument, RawDocumentBuf},
};

use super::RawBuilder;

mod private {
    use crate::{
        builder::RawBuilder,
        error::{Error, Result},
    };

    #[derive(Debug)]
    pub struct StreamState {
        pub(super) builder: RawBuilder,
        pub(super) error: Option<Error>,
    }

    impl StreamState {
        /// Runs `op` unless an earlier step already failed, remembering its error.
        pub(super) fn apply(&mut self, op: impl FnOnce(&mut RawBuilder) -> Result<()>) {
            if self.error.is_some() {
                return;
            }
            if let Err(e) = op(&mut self.builder) {
                self.error = Some(e);
            }
        }
    }

    pub trait Sealed {
        fn state(&mut self) -> &mut StreamState;
    }
}

use private::{Sealed, StreamState};

/// A context that a nested stream container returns to when it is closed.
pub trait StreamContext: Sealed {}

impl<T: Sealed> StreamContext for T {}

/// The top-level document context.
#[derive(Debug)]
pub struct StreamDocument {
    state: StreamState,
}

impl Default for StreamDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Sealed for StreamDocument {
    fn state(&mut self) -> &mut StreamState {
        &mut self.state
    }
}

impl StreamDocument {
    /// Starts an empty document.
    pub fn new() -> Self {
        Self {
            state: StreamState {
                builder: RawBuilder::new_document(),
                error: None,
            },
        }
    }

    /// Declares the key of the next value.
    pub fn key(mut self, key: impl AsRef<str>) -> StreamValue<Self> {
        let key = key.as_ref();
        self.state.apply(|b| b.key(key).map(|_| ()));
        StreamValue { parent: self }
    }

    /// Appends every element of `doc`.
    pub fn concat(mut self, doc: &RawDocument) -> Self {
        self.state.apply(|b| b.concatenate(doc).map(|_| ()));
        self
    }

    /// Finishes the document, reporting the first error that occurred while building it.
    pub fn finish(mut self) -> Result<RawDocumentBuf> {
        match self.state.error.take() {
            Some(e) => Err(e),
            None => self.state.builder.extract_document(),
        }
    }
}

/// The top-level array context.
#[derive(Debug)]
pub struct StreamRootArray {
    state: StreamState,
}

impl Default for StreamRootArray {
    fn default() -> Self {
        Self::new()
    }
}

impl Sealed for StreamRootArray {
    fn state(&mut self) -> &mut StreamState {
        &mut self.state
    }
}

impl StreamRootArray {
    /// Starts an empty array.
    ///
    /// ```
    /// use rawbson::builder::stream::StreamRootArray;
    ///
    /// let array = StreamRootArray::new().value(1).value(2).value(3).finish()?;
    /// assert_eq!(array.get_i32(2)?, 3);
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn new() -> Self {
        Self {
            state: StreamState {
                builder: RawBuilder::new_array(),
                error: None,
            },
        }
    }

    /// Appends a value at the next index.
    pub fn value<'a>(mut self, value: impl Into<RawBsonRef<'a>>) -> Self {
        let value = value.into();
        self.state.apply(|b| b.append(value).map(|_| ()));
        self
    }

    /// Opens a sub-document at the next index.
    pub fn open_document(mut self) -> StreamSubDocument<Self> {
        self.state.apply(|b| b.open_document().map(|_| ()));
        StreamSubDocument { parent: self }
    }

    /// Opens a sub-array at the next index.
    pub fn open_array(mut self) -> StreamArray<Self> {
        self.state.apply(|b| b.open_array().map(|_| ()));
        StreamArray { parent: self }
    }

    /// Appends every element of `doc` at the next indexes.
    pub fn concat(mut self, doc: &RawDocument) -> Self {
        self.state.apply(|b| b.concatenate(doc).map(|_| ()));
        self
    }

    /// Finishes the array, reporting the first error that occurred while building it.
    pub fn finish(mut self) -> Result<RawArrayBuf> {
        match self.state.error.take() {
            Some(e) => Err(e),
            None => self.state.builder.extract_array(),
        }
    }
}

/// A context waiting for the value of a declared key.
#[derive(Debug)]
pub struct StreamValue<P> {
    parent: P,
}

impl<P: StreamContext> StreamValue<P> {
    /// Appends the value and returns to the enclosing document.
    pub fn value<'a>(mut self, value: impl Into<RawBsonRef<'a>>) -> P {
        let value = value.into();
        self.parent.state().apply(|b| b.append(value).map(|_| ()));
        self.parent
    }

    /// Opens a sub-document as the value.
    pub fn open_document(mut self) -> StreamSubDocument<P> {
        self.parent.state().apply(|b| b.open_document().map(|_| ()));
        StreamSubDocument {
            parent: self.parent,
        }
    }

    /// Opens a sub-array as the value.
    pub fn open_array(mut self) -> StreamArray<P> {
        self.parent.state().apply(|b| b.open_array().map(|_| ()));
        StreamArray {
            parent: self.parent,
        }
    }
}

/// An open sub-document.
#[derive(Debug)]
pub struct StreamSubDocument<P> {
    parent: P,
}

impl<P: StreamContext> Sealed for StreamSubDocument<P> {
    fn state(&mut self) -> &mut StreamState {
        self.parent.state()
    }
}

impl<P: StreamContext> StreamSubDocument<P> {
    /// Declares the key of the next value.
    pub fn key(mut self, key: impl AsRef<str>) -> StreamValue<Self> {
        let key = key.as_ref();
        self.state().apply(|b| b.key(key).map(|_| ()));
        StreamValue { parent: self }
    }

    /// Appends every element of `doc`.
    pub fn concat(mut self, doc: &RawDocument) -> Self {
        self.state().apply(|b| b.concatenate(doc).map(|_| ()));
        self
    }

    /// Closes the sub-document and returns to its parent.
    pub fn close_document(mut self) -> P {
        self.state().apply(|b| b.close_document().map(|_| ()));
        self.parent
    }
}

/// An open sub-array.
#[derive(Debug)]
pub struct StreamArray<P> {
    parent: P,
}

impl<P: StreamContext> Sealed for StreamArray<P> {
    fn state(&mut self) -> &mut StreamState {
        self.parent.state()
    }
}

impl<P: StreamContext> StreamArray<P> {
    /// Appends a value at the next index.
    pub fn value<'a>(mut self, value: impl Into<RawBsonRef<'a>>) -> Self {
        let value = value.into();
        self.state().apply(|b| b.append(value).map(|_| ()));
        self
    }

    /// Opens a sub-document at the next index.
    pub fn open_document(mut self) -> StreamSubDocument<Self> {
        self.state().apply(|b| b.open_document().map(|_| ()));
        StreamSubDocument { parent: self }
    }

    /// Opens a sub-array at the next index.
    pub fn open_array(mut self) -> StreamArray<Self> {
        self.state().apply(|b| b.open_array().map(|_| ()));
        StreamArray { parent: self }
    }

    /// Appends every element of `doc` at the next indexes.
    pub fn concat(mut self, doc: &RawDocument) -> Self {
        self.state().apply(|b| b.concatenate(doc).map(|_| ()));
        self
    }

    /// Closes the sub-array and returns to its parent.
    pub fn close_array(mut self) -> P {
        self.state().apply(|b| b.close_array().map(|_| ()));
        self.parent
    }
}
