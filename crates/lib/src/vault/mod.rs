//! Key vault for Haven
//!
//! Owns identity creation and the at-rest custody of private keys:
//!
//! * [`KeyVault::generate`] and [`KeyVault::import_from_text`] produce identities,
//! * [`KeyVault::encrypt_for_storage`] seals an identity into an
//!   [`EncryptedKeyRecord`] with Argon2id and AES-256-GCM,
//! * [`KeyVault::decrypt`] opens a record again.
//!
//! The async [`KeyVault::unlock`] and [`KeyVault::seal`] run key derivation on the
//! blocking thread pool, bounded by a deadline, and never run two derivations for the
//! same record at once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::clock::Clock;
use crate::config::Config;
use crate::identity::{Identity, PublicKey};
use crate::store::{self, Region, Store};
use crate::{Result, with_timeout};

pub mod crypto;
pub mod errors;
pub mod passphrase;
pub mod types;

pub use errors::VaultError;
pub use passphrase::PassphrasePolicy;
pub use types::{EncryptedKeyRecord, KdfParams, MAX_ARGON2_COSTS, RECORD_VERSION};

/// Durable-region key holding the encrypted identity.
pub const RECORD_KEY: &str = "vault/identity";

/// Identity generation, import and at-rest encryption.
#[derive(Debug)]
pub struct KeyVault {
    kdf: KdfParams,
    policy: PassphrasePolicy,
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    /// One async lock per record, keyed by the record's public key
    record_locks: Mutex<HashMap<PublicKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyVault {
    pub fn new(config: &Config, store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            kdf: config.kdf,
            policy: config.passphrase,
            store,
            clock,
            record_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Generate a new identity from a secure random source.
    pub fn generate(&self) -> Identity {
        let identity = Identity::generate();
        info!(public_key = %identity.public_key(), "Generated identity");
        identity
    }

    /// Import an identity from `nsec1…` or 64-character hexadecimal text.
    pub fn import_from_text(&self, text: &str) -> Result<Identity> {
        Ok(Identity::from_text(text)?)
    }

    /// Public key of `identity`.
    pub fn derive_public_key(&self, identity: &Identity) -> PublicKey {
        identity.public_key()
    }

    /// Encrypt `identity` under `passphrase`.
    ///
    /// CPU and memory heavy; async callers should prefer [`KeyVault::seal`].
    pub fn encrypt_for_storage(
        &self,
        identity: &Identity,
        passphrase: &str,
    ) -> Result<EncryptedKeyRecord> {
        encrypt_record(
            identity,
            passphrase,
            &self.policy,
            &self.kdf,
            self.clock.now_millis(),
        )
    }

    /// Decrypt a record.
    ///
    /// Wrong passphrases and any modification of the record fail with the same
    /// [`VaultError::DecryptionFailed`]. Key derivation always runs to completion with
    /// the record's parameters, so the time taken does not depend on the passphrase.
    /// Records asking for costs above the vault's ceiling are refused before any
    /// derivation starts.
    ///
    /// CPU and memory heavy; async callers should prefer [`KeyVault::unlock`].
    pub fn decrypt(&self, record: &EncryptedKeyRecord, passphrase: &str) -> Result<Identity> {
        decrypt_record(record, passphrase, &self.kdf.ceiling())
    }

    /// Async [`KeyVault::encrypt_for_storage`] on the blocking pool.
    pub async fn seal(
        &self,
        identity: &Identity,
        passphrase: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<EncryptedKeyRecord> {
        // Reject before paying for key derivation.
        self.policy.check(&passphrase)?;

        let lock = self.record_lock(&identity.public_key());
        let identity = identity.clone();
        let policy = self.policy;
        let kdf = self.kdf;
        let created_at = self.clock.now_millis();

        with_timeout("seal", timeout, async move {
            let guard = lock.lock_owned().await;
            tokio::task::spawn_blocking(move || {
                let _guard = guard;
                encrypt_record(&identity, &passphrase, &policy, &kdf, created_at)
            })
            .await
            .map_err(|e| VaultError::WorkerFailed {
                reason: e.to_string(),
            })?
        })
        .await
    }

    /// Async [`KeyVault::decrypt`] on the blocking pool.
    ///
    /// Unlocks of the same record are serialised. The per-record lock moves into the
    /// blocking task, so a caller that times out does not let a second derivation
    /// start while the first is still running.
    pub async fn unlock(
        &self,
        record: &EncryptedKeyRecord,
        passphrase: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Identity> {
        let lock = self.record_lock(&record.public_key);
        let record = record.clone();
        let ceiling = self.kdf.ceiling();

        with_timeout("unlock", timeout, async move {
            let guard = lock.lock_owned().await;
            tokio::task::spawn_blocking(move || {
                let _guard = guard;
                decrypt_record(&record, &passphrase, &ceiling)
            })
            .await
            .map_err(|e| VaultError::WorkerFailed {
                reason: e.to_string(),
            })?
        })
        .await
    }

    /// Persist `record` in the durable region, replacing any previous record.
    pub async fn store_record(&self, record: &EncryptedKeyRecord) -> Result<()> {
        store::set_json(self.store.as_ref(), Region::Durable, RECORD_KEY, record).await?;
        info!(public_key = %record.public_key, "Stored encrypted key record");
        Ok(())
    }

    /// Load the stored record, if any.
    pub async fn load_record(&self) -> Result<Option<EncryptedKeyRecord>> {
        store::get_json(self.store.as_ref(), Region::Durable, RECORD_KEY).await
    }

    /// Load the stored record, failing with [`VaultError::RecordNotFound`] if absent.
    pub async fn require_record(&self) -> Result<EncryptedKeyRecord> {
        self.load_record()
            .await?
            .ok_or_else(|| VaultError::RecordNotFound.into())
    }

    /// Delete the stored record. Without a backup the identity is gone for good.
    pub async fn remove_record(&self) -> Result<()> {
        self.store.delete(Region::Durable, RECORD_KEY).await?;
        info!("Removed encrypted key record");
        Ok(())
    }

    fn record_lock(&self, public_key: &PublicKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.record_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(*public_key).or_default().clone()
    }
}

fn encrypt_record(
    identity: &Identity,
    passphrase: &str,
    policy: &PassphrasePolicy,
    kdf: &KdfParams,
    created_at: u64,
) -> Result<EncryptedKeyRecord> {
    policy.check(passphrase)?;

    let public_key = identity.public_key();
    let salt = crypto::generate_salt();
    let key = crypto::derive_encryption_key(passphrase, &salt, kdf)?;
    let aad = EncryptedKeyRecord::associated_data(RECORD_VERSION, &public_key);
    let (ciphertext, nonce) = crypto::encrypt_secret(identity.secret_bytes(), &aad, &key)?;

    debug!(public_key = %public_key, "Encrypted identity for storage");
    Ok(EncryptedKeyRecord {
        version: RECORD_VERSION,
        public_key,
        ciphertext,
        nonce: nonce.to_vec(),
        salt: salt.to_vec(),
        kdf: *kdf,
        created_at,
    })
}

fn decrypt_record(
    record: &EncryptedKeyRecord,
    passphrase: &str,
    ceiling: &KdfParams,
) -> Result<Identity> {
    // The costs are not authenticated until after derivation.
    if !record.kdf.fits_within(ceiling) {
        debug!(
            public_key = %record.public_key,
            kdf = ?record.kdf,
            "Record KDF costs over ceiling"
        );
        return Err(VaultError::DecryptionFailed.into());
    }
    let key = crypto::derive_encryption_key(passphrase, &record.salt, &record.kdf)
        .map_err(|_| VaultError::DecryptionFailed)?;
    let aad = EncryptedKeyRecord::associated_data(record.version, &record.public_key);
    let secret = crypto::decrypt_secret(&record.ciphertext, &record.nonce, &aad, &key)?;

    if record.version != RECORD_VERSION || record.salt.len() != crypto::SALT_LENGTH {
        return Err(VaultError::DecryptionFailed.into());
    }
    let identity =
        Identity::from_secret_bytes(&secret).map_err(|_| VaultError::DecryptionFailed)?;
    if identity.public_key() != record.public_key {
        return Err(VaultError::DecryptionFailed.into());
    }

    debug!(public_key = %record.public_key, "Decrypted identity");
    Ok(identity)
}
