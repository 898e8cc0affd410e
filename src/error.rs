//! Contains the error-related types for the `rawbson` crate.

mod builder;
mod decimal128;
mod json;
mod oid;
mod value_access;

use thiserror::Error;

pub use builder::BuilderErrorKind;
pub use decimal128::Decimal128ErrorKind;
pub use json::JsonErrorKind;
pub use oid::ObjectIdErrorKind;
pub use value_access::ValueAccessErrorKind;

/// The result type for all methods that can return an error in the `rawbson` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `rawbson` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// The document key associated with the error, if any.
    pub key: Option<String>,

    /// The array index associated with the error, if any.
    pub index: Option<usize>,

    /// The byte offset of the first detected corruption, if any. Set by the validator.
    pub offset: Option<usize>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(key) = self.key.as_deref() {
            write!(f, "Error at key \"{key}\": ")?;
        } else if let Some(index) = self.index {
            write!(f, "Error at array index {index}: ")?;
        }
        if let Some(offset) = self.offset {
            write!(f, "(offset {offset}) ")?;
        }

        write!(f, "{}", self.kind)
    }
}

/// The types of errors that can occur in the `rawbson` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed BSON bytes were encountered.
    #[error("Malformed BSON bytes: {message}")]
    #[non_exhaustive]
    MalformedBytes { message: String },

    /// Invalid UTF-8 bytes were encountered.
    #[error("Invalid UTF-8")]
    Utf8Encoding,

    /// An error occurred when attempting to access a value in a document, an element or a typed
    /// value.
    #[error("An error occurred when attempting to access a value: {kind}")]
    #[non_exhaustive]
    ValueAccess {
        /// The kind of error that occurred.
        kind: ValueAccessErrorKind,
    },

    /// An error related to the [`ObjectId`](crate::oid::ObjectId) type occurred.
    #[error("An ObjectId-related error occurred: {kind}")]
    #[non_exhaustive]
    ObjectId {
        /// The kind of error that occurred.
        kind: ObjectIdErrorKind,
    },

    /// An error related to the [`Decimal128`](crate::Decimal128) type occurred.
    #[error("A Decimal128-related error occurred: {kind}")]
    #[non_exhaustive]
    Decimal128 {
        /// The kind of error that occurred.
        kind: Decimal128ErrorKind,
    },

    /// A [`DateTime`](crate::DateTime) could not be converted to or from its RFC 3339 form.
    #[error("A DateTime-related error occurred: {message}")]
    #[non_exhaustive]
    DateTime {
        /// A message describing the error.
        message: String,
    },

    /// A [`Binary`](crate::Binary) payload could not be decoded from its text form.
    #[error("A Binary-related error occurred: {message}")]
    #[non_exhaustive]
    Binary {
        /// A message describing the error.
        message: String,
    },

    /// The builder was driven in a way that would produce malformed BSON.
    #[error("A builder error occurred: {kind}")]
    #[non_exhaustive]
    Builder {
        /// The kind of error that occurred.
        kind: BuilderErrorKind,
    },

    /// An error occurred while converting between BSON and extended JSON.
    #[error("An extended JSON error occurred: {kind}")]
    #[non_exhaustive]
    Json {
        /// The kind of error that occurred.
        kind: JsonErrorKind,
    },

    /// A [`std::io::Error`] occurred.
    #[error("An IO error occurred: {0}")]
    Io(std::io::Error),
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            key: None,
            index: None,
            offset: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        ErrorKind::Io(value).into()
    }
}

impl Error {
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub(crate) fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub(crate) fn malformed_bytes(message: impl ToString) -> Self {
        ErrorKind::MalformedBytes {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn datetime(e: impl ToString) -> Self {
        ErrorKind::DateTime {
            message: e.to_string(),
        }
        .into()
    }

    pub(crate) fn binary(message: impl ToString) -> Self {
        ErrorKind::Binary {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn utf8_encoding() -> Self {
        ErrorKind::Utf8Encoding.into()
    }

    /// Whether this error was caused by malformed BSON bytes.
    pub fn is_malformed_bytes(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedBytes { .. })
    }
}
