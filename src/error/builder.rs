use thiserror::Error as ThisError;

use crate::error::{Error, ErrorKind};

/// The ways a [`RawBuilder`](crate::builder::RawBuilder) can be driven out of protocol.
///
/// Every one of these is a bug in the calling code rather than a data condition; the builder
/// rejects the operation before writing anything.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[non_exhaustive]
pub enum BuilderErrorKind {
    /// A value was appended to a document without first declaring its key.
    #[error("need key")]
    NeedKey,

    /// A key was declared while another key was still waiting for its value, or the builder was
    /// viewed or extracted with a key pending.
    #[error("unmatched key in builder")]
    UnmatchedKey,

    /// A key was declared inside an array, whose keys are generated.
    #[error("cannot append key in sub-array")]
    KeyInArray,

    /// `close_array` was called while a document was the innermost open container.
    #[error("cannot close array in sub-document")]
    CloseArrayInDocument,

    /// `close_document` was called while an array was the innermost open container.
    #[error("cannot close document in sub-array")]
    CloseDocumentInArray,

    /// `close_document` was called with no open sub-document.
    #[error("no document to close")]
    NoDocumentToClose,

    /// `close_array` was called with no open sub-array.
    #[error("no array to close")]
    NoArrayToClose,

    /// A document-only operation was requested from a builder whose root is an array.
    #[error("cannot perform document operation on array")]
    DocumentOperationOnArray,

    /// An array-only operation was requested from a builder whose root is a document.
    #[error("cannot perform array operation on document")]
    ArrayOperationOnDocument,

    /// The builder was viewed or extracted while containers were still open.
    #[error("{depth} container(s) still open")]
    #[non_exhaustive]
    OpenContainers {
        /// The number of containers that were still open.
        depth: usize,
    },

    /// A key, regex pattern or regex option string contained a NUL byte.
    #[error("cstring with interior null: {value:?}")]
    #[non_exhaustive]
    InteriorNul {
        /// The offending text.
        value: String,
    },

    /// A value does not fit in the 32-bit length fields used by BSON.
    #[error("value of {length} bytes is too large")]
    #[non_exhaustive]
    TooLarge {
        /// The size of the rejected value.
        length: usize,
    },
}

impl Error {
    pub(crate) fn builder(kind: BuilderErrorKind) -> Self {
        ErrorKind::Builder { kind }.into()
    }

    /// If this error is a builder protocol violation, its kind.
    pub fn builder_kind(&self) -> Option<&BuilderErrorKind> {
        match &self.kind {
            ErrorKind::Builder { kind } => Some(kind),
            _ => None,
        }
    }
}
