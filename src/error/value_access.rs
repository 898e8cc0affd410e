use thiserror::Error as ThisError;

use crate::{
    error::{Error, ErrorKind},
    spec::ElementType,
};

/// The types of errors that can occur when attempting to access a value in a document, an
/// element or a typed value.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[non_exhaustive]
pub enum ValueAccessErrorKind {
    /// No value for the specified key was present in the document.
    #[error("the key was not present in the document")]
    NotPresent,

    /// The element does not refer to any bytes: it came from an end iterator, a missing key, an
    /// invalid view or a corrupt buffer.
    #[error("unset element")]
    UnsetElement,

    /// The type of the value did not match the requested type.
    #[error("need element type {expected}, got type {actual}")]
    #[non_exhaustive]
    UnexpectedType {
        /// The actual type of the value.
        actual: ElementType,

        /// The type that was requested.
        expected: ElementType,
    },
}

impl Error {
    pub(crate) fn value_access_not_present() -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::NotPresent,
        }
        .into()
    }

    pub(crate) fn value_access_unset() -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::UnsetElement,
        }
        .into()
    }

    pub(crate) fn value_access_unexpected_type(actual: ElementType, expected: ElementType) -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::UnexpectedType { actual, expected },
        }
        .into()
    }

    /// Whether this error reports a key that was not present.
    pub fn is_not_present(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::NotPresent,
            }
        )
    }

    /// Whether this error reports an access on an unset element.
    pub fn is_unset_element(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::UnsetElement,
            }
        )
    }

    /// If this error is a type mismatch, the type that was requested ("need element type X").
    pub fn expected_type(&self) -> Option<ElementType> {
        match self.kind {
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::UnexpectedType { expected, .. },
            } => Some(expected),
            _ => None,
        }
    }
}
