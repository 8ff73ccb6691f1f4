//! Core data types for the session guard

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::identity::{Identity, PublicKey};

/// Lifecycle of the session slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    LoggedOut,
    /// A login is verifying its credential.
    Authenticating,
    Active,
    /// The session passed its idle deadline; a new login is required.
    IdleExpired,
}

/// Result of an expiry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    /// The session is active and not yet near its deadline.
    Active { remaining: Duration },
    /// The session is active but expires within the configured warning lead.
    Warning { remaining: Duration },
    /// The session has idle-expired.
    Expired,
    /// There is no session to check.
    NoSession,
}

impl ExpiryStatus {
    /// Whether the session can still be used.
    pub fn is_usable(&self) -> bool {
        matches!(self, ExpiryStatus::Active { .. } | ExpiryStatus::Warning { .. })
    }
}

/// What a login presents to prove possession of the identity.
pub enum Credential {
    /// Passphrase unlocking the stored encrypted key record.
    Passphrase(Zeroizing<String>),
    /// Private key text (`nsec1…` or hexadecimal) imported directly.
    SecretKey(Zeroizing<String>),
}

impl Credential {
    pub fn passphrase(text: impl Into<String>) -> Self {
        Credential::Passphrase(Zeroizing::new(text.into()))
    }

    pub fn secret_key(text: impl Into<String>) -> Self {
        Credential::SecretKey(Zeroizing::new(text.into()))
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Passphrase(_) => f.write_str("Credential::Passphrase([REDACTED])"),
            Credential::SecretKey(_) => f.write_str("Credential::SecretKey([REDACTED])"),
        }
    }
}

/// The live authenticated context.
///
/// Owns the unlocked identity; dropping the session zeroizes the private key.
pub struct Session {
    pub(crate) id: Uuid,
    pub(crate) identity: Identity,
    pub(crate) created_at: u64,
    pub(crate) last_activity_at: u64,
    pub(crate) idle_timeout: Duration,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn public_key(&self) -> PublicKey {
        self.identity.public_key()
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn last_activity_at(&self) -> u64 {
        self.last_activity_at
    }

    /// Unix milliseconds at which the session idle-expires.
    pub fn deadline(&self) -> u64 {
        let timeout = u64::try_from(self.idle_timeout.as_millis()).unwrap_or(u64::MAX);
        self.last_activity_at.saturating_add(timeout)
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.deadline()
    }

    pub fn metadata(&self) -> SessionMetadata {
        SessionMetadata {
            id: self.id,
            public_key: self.public_key(),
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("public_key", &self.public_key())
            .field("created_at", &self.created_at)
            .field("last_activity_at", &self.last_activity_at)
            .finish()
    }
}

/// Session details safe to persist in the volatile store region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub id: Uuid,
    pub public_key: PublicKey,
    pub created_at: u64,
    pub last_activity_at: u64,
}
