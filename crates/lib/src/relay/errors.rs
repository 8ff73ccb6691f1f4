//! Error types for relay communication.

use thiserror::Error;

use crate::Error;

/// Errors reported by a [`RelayGateway`](super::RelayGateway).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RelayError {
    /// The relay requires NIP-42 authentication before serving the request.
    #[error("Relay {url} requires authentication")]
    AuthRequired { url: String },

    /// An AUTH event was refused.
    #[error("Authentication rejected: {reason}")]
    AuthRejected { reason: String },

    /// A published event was refused.
    #[error("Event rejected: {reason}")]
    EventRejected { reason: String },

    /// The relay could not be reached.
    #[error("Failed to reach relay {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },
}

impl RelayError {
    /// Check if the relay wants (valid) authentication.
    pub fn is_auth_required(&self) -> bool {
        matches!(
            self,
            RelayError::AuthRequired { .. } | RelayError::AuthRejected { .. }
        )
    }
}

impl From<RelayError> for Error {
    fn from(err: RelayError) -> Self {
        Error::Relay(err)
    }
}
