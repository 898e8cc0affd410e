use thiserror::Error as ThisError;

use crate::error::{Error, ErrorKind};

/// The kinds of errors that can occur in the extended JSON bridge.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[non_exhaustive]
pub enum JsonErrorKind {
    /// The input was not valid JSON, or not valid extended JSON.
    #[error("JSON parse failure: {message}")]
    #[non_exhaustive]
    Parse {
        /// A message describing the error.
        message: String,
    },

    /// The BSON could not be represented as JSON, e.g. because it was malformed.
    #[error("failed converting BSON to JSON: {message}")]
    #[non_exhaustive]
    FromBson {
        /// A message describing the error.
        message: String,
    },
}

impl Error {
    #[cfg_attr(not(feature = "serde_json-1"), allow(dead_code))]
    pub(crate) fn json_parse(message: impl ToString) -> Self {
        ErrorKind::Json {
            kind: JsonErrorKind::Parse {
                message: message.to_string(),
            },
        }
        .into()
    }

    #[cfg_attr(not(feature = "serde_json-1"), allow(dead_code))]
    pub(crate) fn json_from_bson(message: impl ToString) -> Self {
        ErrorKind::Json {
            kind: JsonErrorKind::FromBson {
                message: message.to_string(),
            },
        }
        .into()
    }
}
