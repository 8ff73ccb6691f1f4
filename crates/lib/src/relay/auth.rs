//! NIP-42 relay authentication events.
//!
//! The client proves possession of its private key by signing a kind-22242 event
//! carrying the relay's URL and the challenge the relay issued.

use crate::Result;
use crate::event::{Event, KIND_CLIENT_AUTH, UnsignedEvent};
use crate::identity::{Identity, PublicKey};

use super::errors::RelayError;

/// How far an AUTH event's timestamp may be from the relay's clock, in seconds.
pub const AUTH_WINDOW_SECS: u64 = 10 * 60;

/// Build and sign an AUTH event for `challenge` issued by `relay_url`.
pub fn auth_event(
    identity: &Identity,
    relay_url: &str,
    challenge: &str,
    now: u64,
) -> Result<Event> {
    UnsignedEvent::new(
        identity.public_key(),
        now,
        KIND_CLIENT_AUTH,
        vec![
            vec!["relay".to_string(), relay_url.to_string()],
            vec!["challenge".to_string(), challenge.to_string()],
        ],
        "",
    )
    .sign(identity)
}

/// Check an AUTH event as a relay would, returning the authenticated key.
pub fn verify_auth_event(
    event: &Event,
    relay_url: &str,
    challenge: &str,
    now: u64,
) -> std::result::Result<PublicKey, RelayError> {
    let reject = |reason: &str| RelayError::AuthRejected {
        reason: reason.to_string(),
    };

    if event.kind != KIND_CLIENT_AUTH {
        return Err(reject("wrong event kind"));
    }
    if event.created_at.abs_diff(now) > AUTH_WINDOW_SECS {
        return Err(reject("stale timestamp"));
    }
    if event.tag_values("challenge").next() != Some(challenge) {
        return Err(reject("challenge mismatch"));
    }
    let tagged_url = event.tag_values("relay").next().unwrap_or_default();
    if normalize_url(tagged_url) != normalize_url(relay_url) {
        return Err(reject("relay mismatch"));
    }
    event.verify().map_err(|_| reject("invalid signature"))?;
    Ok(event.pubkey)
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_ascii_lowercase()
}
