//! In-memory relay.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use rand::RngCore;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::errors::RelayError;
use super::{Filter, RelayGateway, auth};
use crate::Result;
use crate::clock::Clock;
use crate::event::{Event, EventId, KIND_GIFT_WRAP};
use crate::identity::PublicKey;

#[derive(Debug, Default)]
struct LoopbackState {
    events: Vec<Event>,
    seen: HashSet<EventId>,
    challenge: Option<String>,
    authenticated: HashSet<PublicKey>,
}

/// Relay living in process memory, modelling a single connection.
///
/// Enforces what the core relies on from a real relay: events must be validly
/// signed, and gift wraps are only served to the identity they are addressed to
/// after it has authenticated.
#[derive(Debug)]
pub struct LoopbackRelay {
    url: String,
    clock: Arc<dyn Clock>,
    state: Mutex<LoopbackState>,
}

impl LoopbackRelay {
    pub fn new(url: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            url: url.into(),
            clock,
            state: Mutex::new(LoopbackState::default()),
        }
    }

    /// Number of stored events.
    pub async fn len(&self) -> usize {
        self.state.lock().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Every stored event, bypassing authentication. For inspecting what an observer
    /// of the relay would see.
    pub async fn events(&self) -> Vec<Event> {
        self.state.lock().await.events.clone()
    }

    /// Forget authentications, as a reconnect would.
    pub async fn disconnect(&self) {
        let mut state = self.state.lock().await;
        state.authenticated.clear();
        state.challenge = None;
    }
}

#[async_trait]
impl RelayGateway for LoopbackRelay {
    fn url(&self) -> &str {
        &self.url
    }

    async fn challenge(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        let challenge = state
            .challenge
            .get_or_insert_with(|| {
                let mut bytes = [0u8; 16];
                rand::rngs::OsRng.fill_bytes(&mut bytes);
                hex::encode(bytes)
            })
            .clone();
        Ok(challenge)
    }

    async fn authenticate(&self, auth_event: &Event) -> Result<()> {
        let mut state = self.state.lock().await;
        let Some(challenge) = state.challenge.as_deref() else {
            return Err(RelayError::AuthRejected {
                reason: "no challenge issued".to_string(),
            }
            .into());
        };
        let public_key =
            auth::verify_auth_event(auth_event, &self.url, challenge, self.clock.now_secs())?;
        state.authenticated.insert(public_key);
        info!(relay = %self.url, public_key = %public_key, "Relay client authenticated");
        Ok(())
    }

    async fn publish(&self, event: &Event) -> Result<()> {
        event.verify().map_err(|_| RelayError::EventRejected {
            reason: "invalid id or signature".to_string(),
        })?;
        let mut state = self.state.lock().await;
        if state.seen.insert(event.id) {
            state.events.push(event.clone());
            debug!(relay = %self.url, event_id = %event.id, kind = event.kind, "Stored event");
        }
        Ok(())
    }

    async fn query(&self, filter: &Filter) -> Result<Vec<Event>> {
        let state = self.state.lock().await;

        if filter.kinds.contains(&KIND_GIFT_WRAP)
            && (filter.p_tags.is_empty()
                || !filter
                    .p_tags
                    .iter()
                    .all(|p| state.authenticated.contains(p)))
        {
            return Err(RelayError::AuthRequired {
                url: self.url.clone(),
            }
            .into());
        }

        let mut events: Vec<Event> = state
            .events
            .iter()
            .filter(|event| filter.matches(event))
            .filter(|event| {
                event.kind != KIND_GIFT_WRAP
                    || event
                        .tag_values("p")
                        .filter_map(|hex| PublicKey::from_hex(hex).ok())
                        .any(|p| state.authenticated.contains(&p))
            })
            .cloned()
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            events.truncate(limit);
        }
        Ok(events)
    }
}
