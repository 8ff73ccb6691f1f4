//! Core data types for the key vault

use serde::{Deserialize, Serialize};

use crate::identity::PublicKey;
use crate::{Error, Result};

/// Current [`EncryptedKeyRecord`] format version.
pub const RECORD_VERSION: u8 = 1;

/// Default Argon2 memory cost in KiB (19 MiB)
pub const DEFAULT_ARGON2_M_COST: u32 = 19 * 1024;
/// Default Argon2 time cost (iterations)
pub const DEFAULT_ARGON2_T_COST: u32 = 2;
/// Default Argon2 parallelism
pub const DEFAULT_ARGON2_P_COST: u32 = 1;

/// Largest costs a stored record may ask for, unless the vault is configured higher.
pub const MAX_ARGON2_COSTS: KdfParams = KdfParams {
    memory_kib: 256 * 1024,
    iterations: 16,
    parallelism: 8,
};

/// Argon2id cost parameters, stored with every record so old records stay readable
/// when the defaults change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Time cost (iterations)
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl KdfParams {
    /// Check the parameters are accepted by Argon2.
    pub fn validate(&self) -> Result<()> {
        argon2::Params::new(self.memory_kib, self.iterations, self.parallelism, Some(32))
            .map(|_| ())
            .map_err(|e| Error::Config {
                reason: format!("Invalid Argon2 parameters: {e}"),
            })
    }

    /// Per-field maximum of `self` and [`MAX_ARGON2_COSTS`].
    pub fn ceiling(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.memory_kib.max(MAX_ARGON2_COSTS.memory_kib),
            iterations: self.iterations.max(MAX_ARGON2_COSTS.iterations),
            parallelism: self.parallelism.max(MAX_ARGON2_COSTS.parallelism),
        }
    }

    /// Whether no cost exceeds the matching cost in `ceiling`.
    pub fn fits_within(&self, ceiling: &KdfParams) -> bool {
        self.memory_kib <= ceiling.memory_kib
            && self.iterations <= ceiling.iterations
            && self.parallelism <= ceiling.parallelism
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_ARGON2_M_COST,
            iterations: DEFAULT_ARGON2_T_COST,
            parallelism: DEFAULT_ARGON2_P_COST,
        }
    }
}

/// At-rest custody of a private key.
///
/// The public key is stored in the clear (it is public) and authenticated as
/// associated data, so swapping it for another key makes decryption fail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedKeyRecord {
    /// Format version
    pub version: u8,
    /// Public key of the encrypted identity
    pub public_key: PublicKey,
    /// AES-256-GCM ciphertext of the 32-byte secret, tag included
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    /// 12-byte AES-GCM nonce
    #[serde(with = "base64_bytes")]
    pub nonce: Vec<u8>,
    /// 16-byte Argon2 salt
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    /// Argon2id parameters used for this record
    pub kdf: KdfParams,
    /// When the record was written (Unix milliseconds)
    pub created_at: u64,
}

impl EncryptedKeyRecord {
    /// Bytes bound to the ciphertext as AES-GCM associated data.
    pub(crate) fn associated_data(version: u8, public_key: &PublicKey) -> Vec<u8> {
        let mut aad = Vec::with_capacity(16 + 32);
        aad.extend_from_slice(b"haven-key-record");
        aad.push(version);
        aad.extend_from_slice(public_key.as_bytes());
        aad
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Serde helper encoding byte vectors as standard base64 strings.
mod base64_bytes {
    use base64ct::{Base64, Encoding};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&Base64::encode_string(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        Base64::decode_vec(&s).map_err(serde::de::Error::custom)
    }
}
