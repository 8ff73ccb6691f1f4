//! Error types for identity keys.

use thiserror::Error;

use crate::Error;

/// Errors produced while parsing, encoding or using identity keys.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Key text is neither a valid bech32 key nor 64 hexadecimal characters.
    #[error("Invalid key format: {reason}")]
    InvalidKeyFormat {
        /// Description of why the key text was rejected
        reason: String,
    },

    /// A signature failed verification.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The signing primitive reported an error.
    #[error("Signing failed: {reason}")]
    SigningFailed {
        /// Description of the failure
        reason: String,
    },

    /// Elliptic-curve key agreement could not be performed.
    #[error("Key agreement failed")]
    KeyAgreementFailed,
}

impl IdentityError {
    pub(crate) fn invalid_format(reason: impl Into<String>) -> Self {
        IdentityError::InvalidKeyFormat {
            reason: reason.into(),
        }
    }

    /// Check if this error indicates malformed key text.
    pub fn is_invalid_key_format(&self) -> bool {
        matches!(self, IdentityError::InvalidKeyFormat { .. })
    }
}

impl From<IdentityError> for Error {
    fn from(err: IdentityError) -> Self {
        Error::Identity(err)
    }
}
