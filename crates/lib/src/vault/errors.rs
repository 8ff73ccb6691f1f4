//! Error types for the key vault
use thiserror::Error;

use crate::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum VaultError {
    /// The passphrase does not meet the configured policy.
    #[error("Weak passphrase: {reason}")]
    WeakPassphrase { reason: String },

    /// Wrong passphrase, tampered record or malformed record.
    ///
    /// Carries no detail so that callers cannot tell the causes apart.
    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    #[error("No encrypted key record stored")]
    RecordNotFound,

    /// A blocking key-derivation task panicked or was cancelled by the runtime.
    #[error("Key derivation worker failed: {reason}")]
    WorkerFailed { reason: String },
}

impl VaultError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VaultError::RecordNotFound)
    }
}

impl From<VaultError> for Error {
    fn from(err: VaultError) -> Self {
        Error::Vault(err)
    }
}
