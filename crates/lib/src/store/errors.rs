//! Error types for persistent stores.

use thiserror::Error;

use crate::Error;

/// Errors that can occur while reading or writing a [`Store`](super::Store).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("Store file I/O failed")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// The store contents could not be serialized.
    #[error("Store serialization failed")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// The store contents could not be parsed.
    #[error("Store deserialization failed")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// A stored value is not in the expected format.
    #[error("Corrupt store value for '{key}': {reason}")]
    CorruptValue { key: String, reason: String },

    /// The file was written by an incompatible version.
    #[error("Unsupported store version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl StoreError {
    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, StoreError::FileIo { .. })
    }

    /// Check if this error indicates damaged stored data.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            StoreError::DeserializationFailed { .. }
                | StoreError::CorruptValue { .. }
                | StoreError::UnsupportedVersion { .. }
        )
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}
