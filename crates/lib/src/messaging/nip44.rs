//! NIP-44 version 2 payload encryption.
//!
//! * Conversation key: HKDF-extract(salt = `nip44-v2`, ECDH shared x).
//! * Per message: a random 32-byte nonce expanded with HKDF into a ChaCha20 key,
//!   ChaCha20 nonce and HMAC-SHA256 key.
//! * Plaintext is prefixed with its big-endian `u16` length and zero-padded to
//!   [`calc_padded_len`].
//! * Payload: base64(`0x02 ‖ nonce ‖ ciphertext ‖ mac`), the MAC covering
//!   `nonce ‖ ciphertext`.

use base64ct::{Base64, Encoding};
use chacha20::ChaCha20;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::errors::MessagingError;
use crate::identity::{Identity, PublicKey};

pub const VERSION: u8 = 2;
pub const MIN_PLAINTEXT_SIZE: usize = 1;
pub const MAX_PLAINTEXT_SIZE: usize = 65535;

const SALT: &[u8] = b"nip44-v2";
const NONCE_SIZE: usize = 32;
const MAC_SIZE: usize = 32;
const MIN_PAYLOAD_BASE64: usize = 132;
const MAX_PAYLOAD_BASE64: usize = 87472;
const MIN_PAYLOAD_DECODED: usize = 99;
const MAX_PAYLOAD_DECODED: usize = 65603;

type HmacSha256 = Hmac<Sha256>;

/// Symmetric key shared by a pair of identities.
///
/// Either side derives the same key from its own secret and the peer's public key.
pub struct ConversationKey(Zeroizing<[u8; 32]>);

impl ConversationKey {
    pub fn derive(identity: &Identity, peer: &PublicKey) -> Result<Self, MessagingError> {
        let shared_x = identity
            .shared_x(peer)
            .map_err(|_| MessagingError::invalid_payload("key agreement failed"))?;
        let (prk, _) = Hkdf::<Sha256>::extract(Some(SALT), &shared_x[..]);
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&prk);
        Ok(Self(key))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn message_keys(&self, nonce: &[u8; NONCE_SIZE]) -> Result<MessageKeys, MessagingError> {
        let hkdf = Hkdf::<Sha256>::from_prk(&self.0[..])
            .map_err(|_| MessagingError::invalid_payload("invalid conversation key"))?;
        let mut okm = Zeroizing::new([0u8; 76]);
        hkdf.expand(nonce, &mut okm[..])
            .map_err(|_| MessagingError::invalid_payload("key expansion failed"))?;

        let mut keys = MessageKeys {
            chacha_key: Zeroizing::new([0u8; 32]),
            chacha_nonce: [0u8; 12],
            hmac_key: Zeroizing::new([0u8; 32]),
        };
        keys.chacha_key.copy_from_slice(&okm[0..32]);
        keys.chacha_nonce.copy_from_slice(&okm[32..44]);
        keys.hmac_key.copy_from_slice(&okm[44..76]);
        Ok(keys)
    }
}

impl std::fmt::Debug for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConversationKey([REDACTED])")
    }
}

struct MessageKeys {
    chacha_key: Zeroizing<[u8; 32]>,
    chacha_nonce: [u8; 12],
    hmac_key: Zeroizing<[u8; 32]>,
}

impl MessageKeys {
    fn apply_keystream(&self, buffer: &mut [u8]) {
        let mut cipher = ChaCha20::new(
            chacha20::Key::from_slice(&self.chacha_key[..]),
            chacha20::Nonce::from_slice(&self.chacha_nonce),
        );
        cipher.apply_keystream(buffer);
    }

    fn mac(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<HmacSha256, MessagingError> {
        let mut mac = HmacSha256::new_from_slice(&self.hmac_key[..])
            .map_err(|_| MessagingError::InvalidMac)?;
        mac.update(nonce);
        mac.update(ciphertext);
        Ok(mac)
    }
}

/// Padded length for a plaintext of `len` bytes.
///
/// At least 32; beyond that, the next multiple of a chunk that grows with the
/// message (32 bytes up to 256, then an eighth of the next power of two).
pub fn calc_padded_len(len: usize) -> usize {
    if len <= 32 {
        return 32;
    }
    let next_power = 1usize << ((len - 1).ilog2() + 1);
    let chunk = if next_power <= 256 { 32 } else { next_power / 8 };
    chunk * ((len - 1) / chunk + 1)
}

fn pad(plaintext: &[u8]) -> Result<Zeroizing<Vec<u8>>, MessagingError> {
    let len = plaintext.len();
    if !(MIN_PLAINTEXT_SIZE..=MAX_PLAINTEXT_SIZE).contains(&len) {
        return Err(MessagingError::InvalidPlaintextLength { len });
    }
    let mut padded = Zeroizing::new(vec![0u8; 2 + calc_padded_len(len)]);
    padded[0..2].copy_from_slice(&(len as u16).to_be_bytes());
    padded[2..2 + len].copy_from_slice(plaintext);
    Ok(padded)
}

fn unpad(padded: &[u8]) -> Result<String, MessagingError> {
    if padded.len() < 2 {
        return Err(MessagingError::invalid_payload("missing length prefix"));
    }
    let len = usize::from(u16::from_be_bytes([padded[0], padded[1]]));
    if len < MIN_PLAINTEXT_SIZE || padded.len() != 2 + calc_padded_len(len) {
        return Err(MessagingError::invalid_payload("invalid padding"));
    }
    String::from_utf8(padded[2..2 + len].to_vec())
        .map_err(|_| MessagingError::invalid_payload("plaintext is not UTF-8"))
}

/// Encrypt with a fresh random nonce.
pub fn encrypt(key: &ConversationKey, plaintext: &str) -> Result<String, MessagingError> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    encrypt_with_nonce(key, plaintext, &nonce)
}

/// Encrypt with a caller-chosen nonce. The nonce must never repeat under one key.
pub fn encrypt_with_nonce(
    key: &ConversationKey,
    plaintext: &str,
    nonce: &[u8; NONCE_SIZE],
) -> Result<String, MessagingError> {
    let keys = key.message_keys(nonce)?;
    let mut buffer = pad(plaintext.as_bytes())?;
    keys.apply_keystream(&mut buffer);
    let mac = keys.mac(nonce, &buffer)?.finalize().into_bytes();

    let mut payload = Vec::with_capacity(1 + NONCE_SIZE + buffer.len() + MAC_SIZE);
    payload.push(VERSION);
    payload.extend_from_slice(nonce);
    payload.extend_from_slice(&buffer);
    payload.extend_from_slice(&mac);
    Ok(Base64::encode_string(&payload))
}

/// Authenticate and decrypt a payload.
pub fn decrypt(key: &ConversationKey, payload: &str) -> Result<String, MessagingError> {
    if payload.starts_with('#') {
        return Err(MessagingError::invalid_payload("unsupported encryption version"));
    }
    if !(MIN_PAYLOAD_BASE64..=MAX_PAYLOAD_BASE64).contains(&payload.len()) {
        return Err(MessagingError::invalid_payload("invalid payload length"));
    }
    let data = Base64::decode_vec(payload)
        .map_err(|_| MessagingError::invalid_payload("invalid base64"))?;
    if !(MIN_PAYLOAD_DECODED..=MAX_PAYLOAD_DECODED).contains(&data.len()) {
        return Err(MessagingError::invalid_payload("invalid data length"));
    }
    if data[0] != VERSION {
        return Err(MessagingError::invalid_payload(format!(
            "unknown version {}",
            data[0]
        )));
    }

    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&data[1..1 + NONCE_SIZE]);
    let (ciphertext, mac) =
        data[1 + NONCE_SIZE..].split_at(data.len() - 1 - NONCE_SIZE - MAC_SIZE);

    let keys = key.message_keys(&nonce)?;
    keys.mac(&nonce, ciphertext)?
        .verify_slice(mac)
        .map_err(|_| MessagingError::InvalidMac)?;

    let mut padded = Zeroizing::new(ciphertext.to_vec());
    keys.apply_keystream(&mut padded);
    unpad(&padded)
}
