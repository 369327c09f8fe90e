//! AMP codec error types

use thiserror::Error;

/// AMP codec errors
#[derive(Error, Debug)]
pub enum Error {
    /// Input ended in the middle of a length prefix or payload
    #[error("truncated frame at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        /// Offset of the field that could not be read
        offset: usize,
        /// Bytes required by the field
        needed: usize,
        /// Bytes left in the input
        available: usize,
    },

    /// Key, value or chunk too long for a 16-bit length prefix
    #[error("field too long: {len} bytes (max {max})")]
    Overflow {
        /// Field length
        len: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Structurally invalid frame
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// Bytes cannot be converted to (or a value does not match) the declared type
    #[error("cannot convert {value:?} to {expected}")]
    TypeMismatch {
        /// Declared type name
        expected: &'static str,
        /// Offending input, rendered for diagnostics
        value: String,
    },

    /// Operation or value the codec refuses to handle
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// List attribute has no element type descriptor
    #[error("missing element type for list {0}")]
    Missing(String),

    /// Error reported by the remote peer
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl Error {
    pub(crate) fn type_mismatch(expected: &'static str, value: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected,
            value: value.into(),
        }
    }

    pub(crate) fn mismatch_bytes(expected: &'static str, bytes: &[u8]) -> Self {
        Self::type_mismatch(expected, String::from_utf8_lossy(bytes))
    }
}

/// Error carried by a box holding `_error_code` / `_error_description`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("remote error {code}: {description}")]
pub struct RemoteError {
    /// Error code (`_error_code`)
    pub code: String,
    /// Human readable description (`_error_description`)
    pub description: String,
}

impl RemoteError {
    /// Create a remote error
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
