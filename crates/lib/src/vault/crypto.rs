//! Cryptographic functions for key custody
//!
//! Provides key derivation and secret encryption using:
//! - Argon2id for passphrase-based key derivation
//! - AES-256-GCM for private key encryption

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng, Payload},
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

use super::errors::VaultError;
use super::types::KdfParams;

/// Salt length for Argon2 (16 random bytes)
pub const SALT_LENGTH: usize = 16;

/// Nonce length for AES-GCM (12 bytes standard)
pub const NONCE_LENGTH: usize = 12;

/// Derived key length for AES-256 (32 bytes)
pub const KEY_LENGTH: usize = 32;

/// Generate a fresh random salt.
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive an encryption key from a passphrase and salt using Argon2id
///
/// # Arguments
/// * `passphrase` - The user's passphrase
/// * `salt` - Random per-record salt
/// * `params` - Memory, iteration and parallelism costs
///
/// # Returns
/// A 32-byte encryption key suitable for AES-256, zeroized on drop
pub fn derive_encryption_key(
    passphrase: &str,
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LENGTH]>, VaultError> {
    let params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LENGTH),
    )
    .map_err(|e| VaultError::EncryptionFailed {
        reason: format!("Invalid Argon2 parameters: {e}"),
    })?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])
        .map_err(|e| VaultError::EncryptionFailed {
            reason: format!("Key derivation failed: {e}"),
        })?;

    Ok(key)
}

/// Encrypt a 32-byte secret with a passphrase-derived key
///
/// `aad` is authenticated but not encrypted; decryption fails unless the same bytes
/// are supplied again.
///
/// # Returns
/// A tuple of (ciphertext, nonce) where the nonce is freshly generated
pub fn encrypt_secret(
    secret: &[u8; 32],
    aad: &[u8],
    encryption_key: &[u8; KEY_LENGTH],
) -> Result<(Vec<u8>, [u8; NONCE_LENGTH]), VaultError> {
    let cipher =
        Aes256Gcm::new_from_slice(encryption_key).map_err(|e| VaultError::EncryptionFailed {
            reason: format!("Failed to create cipher: {e}"),
        })?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: secret,
                aad,
            },
        )
        .map_err(|e| VaultError::EncryptionFailed {
            reason: format!("Encryption failed: {e}"),
        })?;

    let mut nonce_bytes = [0u8; NONCE_LENGTH];
    nonce_bytes.copy_from_slice(&nonce);
    Ok((ciphertext, nonce_bytes))
}

/// Decrypt a 32-byte secret
///
/// Every failure, including malformed lengths, is reported as
/// [`VaultError::DecryptionFailed`].
pub fn decrypt_secret(
    ciphertext: &[u8],
    nonce: &[u8],
    aad: &[u8],
    encryption_key: &[u8; KEY_LENGTH],
) -> Result<Zeroizing<[u8; 32]>, VaultError> {
    if nonce.len() != NONCE_LENGTH {
        return Err(VaultError::DecryptionFailed);
    }

    let cipher =
        Aes256Gcm::new_from_slice(encryption_key).map_err(|_| VaultError::DecryptionFailed)?;

    let plaintext = Zeroizing::new(
        cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| VaultError::DecryptionFailed)?,
    );

    if plaintext.len() != 32 {
        return Err(VaultError::DecryptionFailed);
    }

    let mut secret = Zeroizing::new([0u8; 32]);
    secret.copy_from_slice(&plaintext);
    Ok(secret)
}
