//! Haven: the client-side identity, session and encrypted-messaging core of a
//! Nostr community platform.
//!
//! ## Core Concepts
//!
//! Haven is built from a small set of leaf-first components:
//!
//! * **Identities (`identity::Identity`)**: secp256k1 key pairs with NIP-19 (`nsec`/`npub`)
//!   and hexadecimal encodings.
//! * **Key Vault (`vault::KeyVault`)**: at-rest custody of the private key using Argon2id
//!   and AES-256-GCM.
//! * **Session Guard (`session::SessionGuard`)**: login throttling, idle expiry and the
//!   single active session holding the unlocked identity.
//! * **Access Control (`access::AccessEngine`)**: zone/section policies and the
//!   request → pending → approved/denied grant workflow.
//! * **Messaging (`messaging`)**: NIP-44 encryption and NIP-59 gift-wrapped direct messages.
//! * **Collaborators (`relay::RelayGateway`, `store::Store`)**: the contracts a relay
//!   connection and a persistent key/blob store must satisfy.
//! * **Client (`client::Client`)**: wires the components together for a host application.

use std::time::Duration;

pub mod access;
pub mod client;
pub mod clock;
pub mod config;
pub mod event;
pub mod identity;
pub mod messaging;
pub mod relay;
pub mod session;
pub mod store;
pub mod vault;

pub use client::Client;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use identity::{Identity, PublicKey};

/// Result type used throughout the Haven library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Haven library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An operation exceeded its caller-provided deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Invalid configuration values.
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error(transparent)]
    Identity(identity::IdentityError),

    #[error(transparent)]
    Vault(vault::VaultError),

    #[error(transparent)]
    Session(session::SessionError),

    #[error(transparent)]
    Access(access::AccessError),

    #[error(transparent)]
    Messaging(messaging::MessagingError),

    #[error(transparent)]
    Relay(relay::RelayError),

    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Timeout { .. } => "timeout",
            Error::Config { .. } => "config",
            Error::Identity(_) => "identity",
            Error::Vault(_) => "vault",
            Error::Session(_) => "session",
            Error::Access(_) => "access",
            Error::Messaging(_) => "messaging",
            Error::Relay(_) => "relay",
            Error::Store(_) => "store",
        }
    }

    /// Check if this error indicates malformed key text.
    pub fn is_invalid_key_format(&self) -> bool {
        matches!(self, Error::Identity(identity::IdentityError::InvalidKeyFormat { .. }))
    }

    /// Check if this error is the opaque at-rest decryption failure.
    pub fn is_decryption_failed(&self) -> bool {
        matches!(self, Error::Vault(vault::VaultError::DecryptionFailed))
    }

    /// Check if this error indicates the passphrase policy rejected a passphrase.
    pub fn is_weak_passphrase(&self) -> bool {
        matches!(self, Error::Vault(vault::VaultError::WeakPassphrase { .. }))
    }

    /// Check if this error indicates login throttling.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Error::Session(err) => err.is_rate_limited(),
            _ => false,
        }
    }

    /// Check if this error means there is no usable authenticated session.
    pub fn is_not_authenticated(&self) -> bool {
        match self {
            Error::Session(err) => err.is_not_authenticated(),
            Error::Relay(err) => err.is_auth_required(),
            _ => false,
        }
    }

    /// Check if this error indicates access was refused.
    pub fn is_forbidden(&self) -> bool {
        match self {
            Error::Access(err) => err.is_forbidden(),
            _ => false,
        }
    }

    /// Check if this error is a caller logic error in the grant workflow.
    pub fn is_transition_error(&self) -> bool {
        match self {
            Error::Access(err) => err.is_transition_error(),
            _ => false,
        }
    }

    /// Check if this error is the opaque envelope failure.
    pub fn is_undecryptable(&self) -> bool {
        matches!(
            self,
            Error::Messaging(messaging::MessagingError::UndecryptableEnvelope)
        )
    }

    /// Check if this error indicates a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Check if the caller may retry the same call after a delay.
    ///
    /// Everything else needs corrected input or indicates a logic error.
    pub fn is_retryable_after_delay(&self) -> bool {
        self.is_rate_limited() || self.is_timeout()
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Access(err) => err.is_not_found(),
            Error::Vault(err) => err.is_not_found(),
            _ => false,
        }
    }
}

/// Run `future`, failing with [`Error::Timeout`] once `after` has elapsed.
pub(crate) async fn with_timeout<T, F>(
    operation: &'static str,
    after: Duration,
    future: F,
) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    match tokio::time::timeout(after, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, ?after, "Operation timed out");
            Err(Error::Timeout { operation, after })
        }
    }
}
