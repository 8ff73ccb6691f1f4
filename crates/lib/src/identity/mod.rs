//! Identity key pairs.
//!
//! An [`Identity`] is a secp256k1 private key together with its BIP-340 x-only public
//! key, the key material Nostr uses for signing events and for NIP-44 key agreement.
//!
//! Secret bytes live in a [`Zeroizing`] buffer and are cleared whenever an `Identity`
//! (or one of its clones) is dropped. `Debug` never prints them.

use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

pub mod encoding;
pub mod errors;

pub use encoding::{KeyText, NPUB_HRP, NSEC_HRP};
pub use errors::IdentityError;

/// Size of a secret key in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// Size of an x-only public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of a BIP-340 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// BIP-340 x-only public key.
///
/// Construction validates that the bytes are the x coordinate of a curve point, so
/// every `PublicKey` can be used for verification and key agreement.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    /// Build from raw bytes.
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Result<Self, IdentityError> {
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| IdentityError::invalid_format("not a valid x-only public key"))?;
        Ok(Self(bytes))
    }

    /// Parse 64 hexadecimal characters.
    pub fn from_hex(text: &str) -> Result<Self, IdentityError> {
        match KeyText::parse(text)? {
            key @ KeyText::HexEncoded(_) => Self::from_bytes(*key.resolve(NPUB_HRP)?),
            KeyText::Bech32Encoded(_) => Err(IdentityError::invalid_format(
                "expected hexadecimal public key",
            )),
        }
    }

    /// Parse an `npub1…` string.
    pub fn from_npub(text: &str) -> Result<Self, IdentityError> {
        Self::from_bytes(*encoding::decode_bech32(NPUB_HRP, text)?)
    }

    /// Parse either textual form.
    pub fn from_text(text: &str) -> Result<Self, IdentityError> {
        Self::from_bytes(*KeyText::parse(text)?.resolve(NPUB_HRP)?)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_npub(&self) -> String {
        encoding::encode_bech32(NPUB_HRP, &self.0)
    }

    /// Verify a BIP-340 signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), IdentityError> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| IdentityError::InvalidSignature)?;
        let signature =
            Signature::try_from(signature).map_err(|_| IdentityError::InvalidSignature)?;
        key.verify_raw(message, &signature)
            .map_err(|_| IdentityError::InvalidSignature)
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl std::str::FromStr for PublicKey {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

/// Serializes as lowercase hex, the form Nostr events use.
impl Serialize for PublicKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A private/public key pair identifying a user.
///
/// There is deliberately no `Serialize` implementation: the only way secret bytes
/// leave an `Identity` is the vault's ciphertext or the explicit export methods.
#[derive(Clone)]
pub struct Identity {
    secret: Zeroizing<[u8; SECRET_KEY_SIZE]>,
    public: PublicKey,
}

impl Identity {
    /// Generate a fresh identity from the operating system's secure random source.
    pub fn generate() -> Self {
        let signing = SigningKey::random(&mut OsRng);
        let secret = Zeroizing::new(<[u8; SECRET_KEY_SIZE]>::from(signing.to_bytes()));
        let public = PublicKey(signing.verifying_key().to_bytes().into());
        Self { secret, public }
    }

    /// Build from raw secret bytes, rejecting zero and out-of-range scalars.
    pub fn from_secret_bytes(bytes: &[u8; SECRET_KEY_SIZE]) -> Result<Self, IdentityError> {
        let signing = SigningKey::from_bytes(bytes)
            .map_err(|_| IdentityError::invalid_format("secret key is not a valid scalar"))?;
        Ok(Self {
            secret: Zeroizing::new(*bytes),
            public: PublicKey(signing.verifying_key().to_bytes().into()),
        })
    }

    /// Import an `nsec1…` string or 64 hexadecimal characters.
    pub fn from_text(text: &str) -> Result<Self, IdentityError> {
        let bytes = KeyText::parse(text)?.resolve(NSEC_HRP)?;
        Self::from_secret_bytes(&bytes)
    }

    /// The public half; a pure function of the secret.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Export as `nsec1…` for user backup.
    pub fn to_nsec(&self) -> Zeroizing<String> {
        Zeroizing::new(encoding::encode_bech32(NSEC_HRP, &self.secret))
    }

    /// Export as 64 hexadecimal characters for user backup.
    pub fn to_secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&self.secret[..]))
    }

    pub(crate) fn secret_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.secret
    }

    /// Produce a BIP-340 signature over `message` with fresh auxiliary randomness.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_SIZE], IdentityError> {
        let signing = SigningKey::from_bytes(&self.secret[..]).map_err(|e| {
            IdentityError::SigningFailed {
                reason: e.to_string(),
            }
        })?;
        let mut aux = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(&mut aux[..]);
        let signature = signing
            .sign_raw(message, &aux)
            .map_err(|e| IdentityError::SigningFailed {
                reason: e.to_string(),
            })?;
        Ok(signature.to_bytes())
    }

    /// ECDH with `peer`, returning the shared x coordinate.
    ///
    /// The peer's x-only key is lifted to the point with even y, as BIP-340 defines.
    pub(crate) fn shared_x(&self, peer: &PublicKey) -> Result<Zeroizing<[u8; 32]>, IdentityError> {
        let secret = k256::SecretKey::from_slice(&self.secret[..])
            .map_err(|_| IdentityError::KeyAgreementFailed)?;
        let mut sec1 = [0u8; 33];
        sec1[0] = 0x02;
        sec1[1..].copy_from_slice(peer.as_bytes());
        let point = k256::PublicKey::from_sec1_bytes(&sec1)
            .map_err(|_| IdentityError::KeyAgreementFailed)?;
        let shared = k256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), point.as_affine());
        let mut out = Zeroizing::new([0u8; 32]);
        out.copy_from_slice(shared.raw_secret_bytes());
        Ok(out)
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public
    }
}

impl Eq for Identity {}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
