//! Gift-wrapped direct messages (NIP-17 / NIP-59).
//!
//! ```text
//! gift wrap  kind 1059  signed by a one-time key   NIP-44(one-time ↔ recipient)
//!  └ seal    kind 13    signed by the sender       NIP-44(sender ↔ recipient)
//!     └ rumor kind 14   unsigned, authored by the sender
//! ```
//!
//! Every timestamp is drawn independently from `[now - jitter, now]`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::MessagingError;
use super::nip44::{self, ConversationKey};
use crate::Result;
use crate::config::MessagingConfig;
use crate::event::{
    Event, KIND_GIFT_WRAP, KIND_PRIVATE_DIRECT_MESSAGE, KIND_SEAL, UnsignedEvent, p_tag,
};
use crate::identity::{Identity, PublicKey};

/// Source of fuzzed wire timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFuzz {
    /// True current time, Unix seconds
    pub now: u64,
    /// Maximum offset into the past, seconds; at least one
    pub jitter_secs: u64,
}

impl TimestampFuzz {
    pub fn new(now: u64, jitter_secs: u64) -> Self {
        Self {
            now,
            jitter_secs: jitter_secs.max(1),
        }
    }

    pub fn from_config(now: u64, config: &MessagingConfig) -> Self {
        Self::new(now, config.timestamp_jitter_secs)
    }

    /// A timestamp in `[now - jitter, now - 1]`. The true time is never returned.
    pub fn sample(&self) -> u64 {
        let offset = rand::rngs::OsRng.gen_range(1..=self.jitter_secs.max(1));
        self.now.saturating_sub(offset)
    }
}

/// Plaintext direct message. Lives only inside the client.
#[derive(Clone, PartialEq, Eq)]
pub struct DirectMessage {
    pub sender: PublicKey,
    pub recipient: PublicKey,
    pub body: String,
    /// Fuzzed send time, Unix seconds
    pub created_at: u64,
}

impl std::fmt::Debug for DirectMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectMessage")
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("body", &format_args!("[{} bytes]", self.body.len()))
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Signed kind-1059 event ready for a relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GiftWrap(Event);

impl GiftWrap {
    /// Accept a relay event as a gift wrap. Only the kind is checked here; contents
    /// are checked by [`unwrap`].
    pub fn from_event(event: Event) -> Result<Self> {
        if event.kind != KIND_GIFT_WRAP {
            return Err(MessagingError::NotGiftWrap { kind: event.kind }.into());
        }
        Ok(Self(event))
    }

    pub fn event(&self) -> &Event {
        &self.0
    }

    pub fn into_event(self) -> Event {
        self.0
    }

    /// The single-use key that signed and encrypted the outer layer.
    pub fn ephemeral_key(&self) -> PublicKey {
        self.0.pubkey
    }

    /// Addressee from the `p` tag.
    pub fn recipient(&self) -> Option<PublicKey> {
        self.0
            .tag_values("p")
            .next()
            .and_then(|hex| PublicKey::from_hex(hex).ok())
    }

    /// Fuzzed timestamp of the outer layer.
    pub fn created_at(&self) -> u64 {
        self.0.created_at
    }
}

/// The two wraps produced for one outgoing message.
#[derive(Debug, Clone)]
pub struct WrappedMessage {
    /// Addressed to the recipient
    pub to_recipient: GiftWrap,
    /// Addressed to the sender, so their other devices can show the sent message
    pub to_sender: GiftWrap,
}

/// Wrap `message` from `sender` to `recipient`.
pub fn wrap(
    message: &str,
    recipient: &PublicKey,
    sender: &Identity,
    fuzz: &TimestampFuzz,
) -> Result<GiftWrap> {
    let rumor = rumor(message, recipient, sender, fuzz);
    seal_and_wrap(&rumor, sender, recipient, fuzz)
}

/// Wrap `message` for `recipient` and, with the same rumor, for the sender.
pub fn wrap_with_self_copy(
    message: &str,
    recipient: &PublicKey,
    sender: &Identity,
    fuzz: &TimestampFuzz,
) -> Result<WrappedMessage> {
    let rumor = rumor(message, recipient, sender, fuzz);
    Ok(WrappedMessage {
        to_recipient: seal_and_wrap(&rumor, sender, recipient, fuzz)?,
        to_sender: seal_and_wrap(&rumor, sender, &sender.public_key(), fuzz)?,
    })
}

/// Open a gift wrap addressed to `recipient`.
///
/// Every failure is [`MessagingError::UndecryptableEnvelope`].
pub fn unwrap(gift: &GiftWrap, recipient: &Identity) -> Result<DirectMessage> {
    open(gift, recipient).map_err(|_| {
        debug!(wrap_id = %gift.event().id, "Discarding undecryptable gift wrap");
        MessagingError::UndecryptableEnvelope.into()
    })
}

fn rumor(
    message: &str,
    recipient: &PublicKey,
    sender: &Identity,
    fuzz: &TimestampFuzz,
) -> UnsignedEvent {
    UnsignedEvent::new(
        sender.public_key(),
        fuzz.sample(),
        KIND_PRIVATE_DIRECT_MESSAGE,
        vec![p_tag(recipient)],
        message,
    )
}

fn seal_and_wrap(
    rumor: &UnsignedEvent,
    sender: &Identity,
    addressee: &PublicKey,
    fuzz: &TimestampFuzz,
) -> Result<GiftWrap> {
    let inner = ConversationKey::derive(sender, addressee)?;
    let seal = UnsignedEvent::new(
        sender.public_key(),
        fuzz.sample(),
        KIND_SEAL,
        Vec::new(),
        nip44::encrypt(&inner, &rumor.to_json()?)?,
    )
    .sign(sender)?;

    let ephemeral = Identity::generate();
    let outer = ConversationKey::derive(&ephemeral, addressee)?;
    let wrap = UnsignedEvent::new(
        ephemeral.public_key(),
        fuzz.sample(),
        KIND_GIFT_WRAP,
        vec![p_tag(addressee)],
        nip44::encrypt(&outer, &seal.to_json()?)?,
    )
    .sign(&ephemeral)?;

    debug!(wrap_id = %wrap.id, "Built gift wrap");
    Ok(GiftWrap(wrap))
}

fn open(gift: &GiftWrap, recipient: &Identity) -> Result<DirectMessage> {
    let me = recipient.public_key();
    let wrap = gift.event();
    if wrap.kind != KIND_GIFT_WRAP || gift.recipient() != Some(me) {
        return Err(MessagingError::UndecryptableEnvelope.into());
    }
    wrap.verify()?;

    let outer = ConversationKey::derive(recipient, &wrap.pubkey)?;
    let seal = Event::from_json(&nip44::decrypt(&outer, &wrap.content)?)?;
    if seal.kind != KIND_SEAL {
        return Err(MessagingError::UndecryptableEnvelope.into());
    }
    seal.verify()?;

    let inner = ConversationKey::derive(recipient, &seal.pubkey)?;
    let rumor = UnsignedEvent::from_json(&nip44::decrypt(&inner, &seal.content)?)?;
    if rumor.kind != KIND_PRIVATE_DIRECT_MESSAGE
        || rumor.pubkey != seal.pubkey
        || !rumor.has_valid_id()
    {
        return Err(MessagingError::UndecryptableEnvelope.into());
    }

    // The rumor names the conversation partner; a copy addressed to ourselves is one
    // we sent.
    let addressee = rumor
        .tag_values("p")
        .next()
        .and_then(|hex| PublicKey::from_hex(hex).ok())
        .ok_or(MessagingError::UndecryptableEnvelope)?;
    if addressee != me && rumor.pubkey != me {
        return Err(MessagingError::UndecryptableEnvelope.into());
    }

    Ok(DirectMessage {
        sender: rumor.pubkey,
        recipient: addressee,
        body: rumor.content,
        created_at: rumor.created_at,
    })
}
