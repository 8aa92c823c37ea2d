//! Marshalling engine error types

use thiserror::Error;

/// Errors raised while encoding or decoding an object graph.
///
/// Every variant is fatal to the call that produced it. Nothing is retried
/// and no partially decoded value is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A read or seek went past the end of the buffer
    #[error("out of range: {needed} bytes at offset {offset} exceed buffer of {len} bytes")]
    OutOfRange {
        /// Position the operation started at
        offset: usize,
        /// Number of bytes the operation required
        needed: usize,
        /// Total buffer length
        len: usize,
    },

    /// No codec exists for the requested width or representation
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Field metadata is incomplete or contradicts the value being coded
    #[error("invalid configuration for field `{field}`: {reason}")]
    InvalidConfiguration {
        /// Name of the offending field
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// A value could not be converted during type substitution
    #[error("incompatible mapping from {from} to {to}")]
    IncompatibleMapping {
        /// Source type or value description
        from: String,
        /// Target type
        to: String,
    },
}

impl Error {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn mapping(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::IncompatibleMapping {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
