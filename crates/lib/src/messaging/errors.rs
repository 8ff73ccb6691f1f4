//! Error types for encrypted messaging
use thiserror::Error;

use crate::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MessagingError {
    /// A gift wrap could not be opened by this identity.
    ///
    /// Covers every failure on the receive path: wrong recipient, corrupted or
    /// forged layers, malformed JSON. Carries no detail so that callers cannot tell
    /// which layer failed.
    #[error("Undecryptable envelope")]
    UndecryptableEnvelope,

    /// Plaintext outside the 1..=65535 byte range NIP-44 can carry.
    #[error("Invalid plaintext length: {len} bytes")]
    InvalidPlaintextLength { len: usize },

    /// A NIP-44 payload is malformed.
    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    /// A NIP-44 payload failed authentication.
    #[error("Invalid MAC")]
    InvalidMac,

    /// The event handed over as a gift wrap is not one.
    #[error("Not a gift wrap: kind {kind}")]
    NotGiftWrap { kind: u16 },

    /// A blocking wrap/unwrap task panicked or was cancelled by the runtime.
    #[error("Messaging worker failed: {reason}")]
    WorkerFailed { reason: String },
}

impl MessagingError {
    pub(crate) fn invalid_payload(reason: impl Into<String>) -> Self {
        MessagingError::InvalidPayload {
            reason: reason.into(),
        }
    }
}

impl From<MessagingError> for Error {
    fn from(err: MessagingError) -> Self {
        Error::Messaging(err)
    }
}
