//! Key/value appends with callback-scoped sub-containers.
//!
//! Sub-documents and sub-arrays are built inside a closure; the container is closed when the
//! closure returns, so open and close calls can never be mismatched. A failing append or closure
//! rolls the builder back to its state before the call.
//!
//! ```
//! use rawbson::builder::basic::DocumentBuilder;
//!
//! let mut builder = DocumentBuilder::new();
//! builder
//!     .append("name", "rawbson")?
//!     .append_document("version", |v| {
//!         v.append("major", 0)?.append("minor", 1)?;
//!         Ok(())
//!     })?
//!     .append_array("tags", |tags| {
//!         tags.append("bson")?.append("zero-copy")?;
//!         Ok(())
//!     })?;
//! let doc = builder.extract()?;
//!
//! assert_eq!(doc.get_document("version")?.get_i32("minor")?, 1);
//! assert_eq!(doc.get_array("tags")?.get_str(1)?, "zero-copy");
//! # Ok::<(), rawbson::error::Error>(())
//! ```

use crate::{
    error::Result,
    raw::{RawArray, RawArrayBuf, RawBsonRef, RawDocument, RawDocumentBuf},
};

use super::RawBuilder;

/// Runs `op`, restoring the builder to its prior state if it fails.
fn atomically(
    builder: &mut RawBuilder,
    op: impl FnOnce(&mut RawBuilder) -> Result<()>,
) -> Result<()> {
    let checkpoint = builder.checkpoint();
    let result = op(builder);
    if result.is_err() {
        builder.rollback(checkpoint);
    }
    result
}

fn append_value<'a>(
    builder: &mut RawBuilder,
    key: Option<&str>,
    value: RawBsonRef<'a>,
) -> Result<()> {
    atomically(builder, |b| {
        if let Some(key) = key {
            b.key(key)?;
        }
        b.append(value)?;
        Ok(())
    })
}

fn append_sub_document(
    builder: &mut RawBuilder,
    key: Option<&str>,
    f: impl FnOnce(&mut SubDocument<'_>) -> Result<()>,
) -> Result<()> {
    atomically(builder, |b| {
        if let Some(key) = key {
            b.key(key)?;
        }
        b.open_document()?;
        f(&mut SubDocument { builder: &mut *b })?;
        b.close_document()?;
        Ok(())
    })
}

fn append_sub_array(
    builder: &mut RawBuilder,
    key: Option<&str>,
    f: impl FnOnce(&mut SubArray<'_>) -> Result<()>,
) -> Result<()> {
    atomically(builder, |b| {
        if let Some(key) = key {
            b.key(key)?;
        }
        b.open_array()?;
        f(&mut SubArray { builder: &mut *b })?;
        b.close_array()?;
        Ok(())
    })
}

/// Builds a top-level document.
#[derive(Clone, Debug, Default)]
pub struct DocumentBuilder {
    inner: RawBuilder,
}

impl DocumentBuilder {
    /// An empty document builder.
    pub fn new() -> Self {
        Self {
            inner: RawBuilder::new_document(),
        }
    }

    /// Appends `value` under `key`.
    pub fn append<'a>(
        &mut self,
        key: impl AsRef<str>,
        value: impl Into<RawBsonRef<'a>>,
    ) -> Result<&mut Self> {
        append_value(&mut self.inner, Some(key.as_ref()), value.into())?;
        Ok(self)
    }

    /// Appends a sub-document under `key`, filled in by `f`.
    pub fn append_document(
        &mut self,
        key: impl AsRef<str>,
        f: impl FnOnce(&mut SubDocument<'_>) -> Result<()>,
    ) -> Result<&mut Self> {
        append_sub_document(&mut self.inner, Some(key.as_ref()), f)?;
        Ok(self)
    }

    /// Appends a sub-array under `key`, filled in by `f`.
    pub fn append_array(
        &mut self,
        key: impl AsRef<str>,
        f: impl FnOnce(&mut SubArray<'_>) -> Result<()>,
    ) -> Result<&mut Self> {
        append_sub_array(&mut self.inner, Some(key.as_ref()), f)?;
        Ok(self)
    }

    /// Appends every element of `doc`.
    pub fn concatenate(&mut self, doc: &RawDocument) -> Result<&mut Self> {
        self.inner.concatenate(doc)?;
        Ok(self)
    }

    /// A view of the document built so far.
    pub fn view(&self) -> Result<&RawDocument> {
        self.inner.view_document()
    }

    /// Takes the finished document and resets the builder.
    pub fn extract(&mut self) -> Result<RawDocumentBuf> {
        self.inner.extract_document()
    }

    /// Discards everything appended so far.
    pub fn clear(&mut self) {
        self.inner.clear()
    }
}

/// Builds a top-level array.
#[derive(Clone, Debug)]
pub struct ArrayBuilder {
    inner: RawBuilder,
}

impl Default for ArrayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayBuilder {
    /// An empty array builder.
    pub fn new() -> Self {
        Self {
            inner: RawBuilder::new_array(),
        }
    }

    /// Appends `value` at the next index.
    pub fn append<'a>(&mut self, value: impl Into<RawBsonRef<'a>>) -> Result<&mut Self> {
        append_value(&mut self.inner, None, value.into())?;
        Ok(self)
    }

    /// Appends a sub-document at the next index, filled in by `f`.
    pub fn append_document(
        &mut self,
        f: impl FnOnce(&mut SubDocument<'_>) -> Result<()>,
    ) -> Result<&mut Self> {
        append_sub_document(&mut self.inner, None, f)?;
        Ok(self)
    }

    /// Appends a sub-array at the next index, filled in by `f`.
    pub fn append_array(
        &mut self,
        f: impl FnOnce(&mut SubArray<'_>) -> Result<()>,
    ) -> Result<&mut Self> {
        append_sub_array(&mut self.inner, None, f)?;
        Ok(self)
    }

    /// Appends every element of `doc` at the next indexes.
    pub fn concatenate(&mut self, doc: &RawDocument) -> Result<&mut Self> {
        self.inner.concatenate(doc)?;
        Ok(self)
    }

    /// A view of the array built so far.
    pub fn view(&self) -> Result<&RawArray> {
        self.inner.view_array()
    }

    /// Takes the finished array and resets the builder.
    pub fn extract(&mut self) -> Result<RawArrayBuf> {
        self.inner.extract_array()
    }

    /// Discards everything appended so far.
    pub fn clear(&mut self) {
        self.inner.clear()
    }
}

/// A sub-document open for the duration of an [`append_document`](DocumentBuilder::append_document)
/// callback.
#[derive(Debug)]
pub struct SubDocument<'b> {
    builder: &'b mut RawBuilder,
}

impl SubDocument<'_> {
    /// Appends `value` under `key`.
    pub fn append<'a>(
        &mut self,
        key: impl AsRef<str>,
        value: impl Into<RawBsonRef<'a>>,
    ) -> Result<&mut Self> {
        append_value(self.builder, Some(key.as_ref()), value.into())?;
        Ok(self)
    }

    /// Appends a nested sub-document under `key`.
    pub fn append_document(
        &mut self,
        key: impl AsRef<str>,
        f: impl FnOnce(&mut SubDocument<'_>) -> Result<()>,
    ) -> Result<&mut Self> {
        append_sub_document(self.builder, Some(key.as_ref()), f)?;
        Ok(self)
    }

    /// Appends a nested sub-array under `key`.
    pub fn append_array(
        &mut self,
        key: impl AsRef<str>,
        f: impl FnOnce(&mut SubArray<'_>) -> Result<()>,
    ) -> Result<&mut Self> {
        append_sub_array(self.builder, Some(key.as_ref()), f)?;
        Ok(self)
    }

    /// Appends every element of `doc`.
    pub fn concatenate(&mut self, doc: &RawDocument) -> Result<&mut Self> {
        self.builder.concatenate(doc)?;
        Ok(self)
    }
}

/// A sub-array open for the duration of an [`append_array`](DocumentBuilder::append_array)
/// callback.
#[derive(Debug)]
pub struct SubArray<'b> {
    builder: &'b mut RawBuilder,
}

impl SubArray<'_> {
    /// Appends `value` at the next index.
    pub fn append<'a>(&mut self, value: impl Into<RawBsonRef<'a>>) -> Result<&mut Self> {
        append_value(self.builder, None, value.into())?;
        Ok(self)
    }

    /// Appends a nested sub-document at the next index.
    pub fn append_document(
        &mut self,
        f: impl FnOnce(&mut SubDocument<'_>) -> Result<()>,
    ) -> Result<&mut Self> {
        append_sub_document(self.builder, None, f)?;
        Ok(self)
    }

    /// Appends a nested sub-array at the next index.
    pub fn append_array(
        &mut self,
        f: impl FnOnce(&mut SubArray<'_>) -> Result<()>,
    ) -> Result<&mut Self> {
        append_sub_array(self.builder, None, f)?;
        Ok(self)
    }

    /// Appends every element of `doc` at the next indexes.
    pub fn concatenate(&mut self, doc: &RawDocument) -> Result<&mut Self> {
        self.builder.concatenate(doc)?;
        Ok(self)
    }
}
