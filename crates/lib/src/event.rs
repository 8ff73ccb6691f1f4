//! Nostr events (NIP-01).
//!
//! An event's id is the SHA-256 of the canonical JSON array
//! `[0, pubkey, created_at, kind, tags, content]`; its signature is a BIP-340 Schnorr
//! signature over that id by `pubkey`.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::identity::{Identity, IdentityError, PublicKey, SIGNATURE_SIZE};
use crate::Result;

/// Sealed rumor (NIP-59).
pub const KIND_SEAL: u16 = 13;
/// Private direct message (NIP-17).
pub const KIND_PRIVATE_DIRECT_MESSAGE: u16 = 14;
/// Gift wrap (NIP-59).
pub const KIND_GIFT_WRAP: u16 = 1059;
/// Relay authentication (NIP-42).
pub const KIND_CLIENT_AUTH: u16 = 22242;

/// SHA-256 event id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId([u8; 32]);

impl EventId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", self.to_hex())
    }
}

impl Serialize for EventId {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&text, &mut bytes[..]).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

/// Event without a signature.
///
/// Rumors (the innermost layer of a gift wrap) travel in this form: they carry an id
/// but are never signed, so they cannot be replayed as proof of authorship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedEvent {
    pub id: EventId,
    pub pubkey: PublicKey,
    pub created_at: u64,
    pub kind: u16,
    pub tags: Vec<Vec<String>>,
    pub content: String,
}

impl UnsignedEvent {
    pub fn new(
        pubkey: PublicKey,
        created_at: u64,
        kind: u16,
        tags: Vec<Vec<String>>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let id = compute_id(&pubkey, created_at, kind, &tags, &content);
        Self {
            id,
            pubkey,
            created_at,
            kind,
            tags,
            content,
        }
    }

    /// Whether `id` matches the other fields.
    pub fn has_valid_id(&self) -> bool {
        compute_id(
            &self.pubkey,
            self.created_at,
            self.kind,
            &self.tags,
            &self.content,
        ) == self.id
    }

    /// Sign with `identity`, which must own `pubkey`.
    pub fn sign(self, identity: &Identity) -> Result<Event> {
        if identity.public_key() != self.pubkey {
            return Err(IdentityError::SigningFailed {
                reason: "identity does not match event author".to_string(),
            }
            .into());
        }
        let sig = identity.sign(self.id.as_bytes())?;
        Ok(Event {
            id: self.id,
            pubkey: self.pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig,
        })
    }

    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        tag_values(&self.tags, name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Signed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub pubkey: PublicKey,
    pub created_at: u64,
    pub kind: u16,
    pub tags: Vec<Vec<String>>,
    pub content: String,
    #[serde(with = "signature_hex")]
    pub sig: [u8; SIGNATURE_SIZE],
}

impl Event {
    /// Check the id against the contents and the signature against the id.
    pub fn verify(&self) -> Result<()> {
        let expected = compute_id(
            &self.pubkey,
            self.created_at,
            self.kind,
            &self.tags,
            &self.content,
        );
        if expected != self.id {
            return Err(IdentityError::InvalidSignature.into());
        }
        Ok(self.pubkey.verify(self.id.as_bytes(), &self.sig)?)
    }

    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        tag_values(&self.tags, name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Build a `["p", <hex>]` tag.
pub fn p_tag(public_key: &PublicKey) -> Vec<String> {
    vec!["p".to_string(), public_key.to_hex()]
}

fn tag_values<'a>(tags: &'a [Vec<String>], name: &'a str) -> impl Iterator<Item = &'a str> {
    tags.iter()
        .filter(move |tag| tag.first().map(String::as_str) == Some(name))
        .filter_map(|tag| tag.get(1).map(String::as_str))
}

fn compute_id(
    pubkey: &PublicKey,
    created_at: u64,
    kind: u16,
    tags: &[Vec<String>],
    content: &str,
) -> EventId {
    let canonical = serde_json::to_vec(&(0u8, pubkey.to_hex(), created_at, kind, tags, content))
        .expect("strings and integers always serialize");
    EventId(Sha256::digest(&canonical).into())
}

mod signature_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::identity::SIGNATURE_SIZE;

    pub fn serialize<S: Serializer>(
        sig: &[u8; SIGNATURE_SIZE],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(sig))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; SIGNATURE_SIZE], D::Error> {
        let text = String::deserialize(deserializer)?;
        let mut sig = [0u8; SIGNATURE_SIZE];
        hex::decode_to_slice(&text, &mut sig[..]).map_err(serde::de::Error::custom)?;
        Ok(sig)
    }
}
