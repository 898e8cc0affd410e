use thiserror::Error as ThisError;

use crate::error::{Error, ErrorKind};

/// The kinds of errors that can occur when working with the [`Decimal128`](crate::Decimal128) type.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[non_exhaustive]
pub enum Decimal128ErrorKind {
    /// Empty exponent.
    #[error("invalid decimal128: empty exponent")]
    EmptyExponent,

    /// Invalid exponent.
    #[error("invalid decimal128: invalid exponent: {message}")]
    #[non_exhaustive]
    InvalidExponent {
        /// A message describing the error.
        message: String,
    },

    /// Invalid coefficient.
    #[error("invalid decimal128: invalid coefficient: {message}")]
    #[non_exhaustive]
    InvalidCoefficient {
        /// A message describing the error.
        message: String,
    },

    /// Overflow.
    #[error("invalid decimal128: overflow")]
    Overflow,

    /// Underflow.
    #[error("invalid decimal128: underflow")]
    Underflow,

    /// Inexact rounding.
    #[error("invalid decimal128: inexact rounding")]
    InexactRounding,

    /// Unparseable.
    #[error("invalid decimal128: unparseable")]
    Unparseable,
}

impl Error {
    pub(crate) fn decimal128(kind: Decimal128ErrorKind) -> Self {
        ErrorKind::Decimal128 { kind }.into()
    }
}
