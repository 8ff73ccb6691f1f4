//! Relay gateway contract.
//!
//! The core never speaks WebSocket itself; hosts provide a [`RelayGateway`] that
//! publishes signed events, answers filter queries and performs the NIP-42
//! challenge/response exchange. [`LoopbackRelay`] implements the contract in memory.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::event::Event;
use crate::identity::PublicKey;

pub mod auth;
pub mod errors;
pub mod loopback;

pub use auth::{AUTH_WINDOW_SECS, auth_event, verify_auth_event};
pub use errors::RelayError;
pub use loopback::LoopbackRelay;

/// Connection to a single relay.
#[async_trait]
pub trait RelayGateway: Send + Sync + Debug {
    /// The relay's URL, as it must appear in AUTH events.
    fn url(&self) -> &str;

    /// The challenge the relay issued for this connection.
    async fn challenge(&self) -> Result<String>;

    /// Present a signed AUTH event. Authentication lasts for the connection.
    async fn authenticate(&self, auth: &Event) -> Result<()>;

    /// Publish a signed event.
    async fn publish(&self, event: &Event) -> Result<()>;

    /// Stored events matching `filter`, newest first.
    ///
    /// Gift wraps are only served to the identity they are addressed to; querying them
    /// before authenticating fails with [`RelayError::AuthRequired`].
    async fn query(&self, filter: &Filter) -> Result<Vec<Event>>;
}

/// NIP-01 subscription filter. Empty lists match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<PublicKey>,
    #[serde(rename = "#p", default, skip_serializing_if = "Vec::is_empty")]
    pub p_tags: Vec<PublicKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: u16) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn author(mut self, author: PublicKey) -> Self {
        self.authors.push(author);
        self
    }

    pub fn p_tag(mut self, public_key: PublicKey) -> Self {
        self.p_tags.push(public_key);
        self
    }

    pub fn since(mut self, since: u64) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: u64) -> Self {
        self.until = Some(until);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        (self.kinds.is_empty() || self.kinds.contains(&event.kind))
            && (self.authors.is_empty() || self.authors.contains(&event.pubkey))
            && (self.p_tags.is_empty()
                || event
                    .tag_values("p")
                    .filter_map(|hex| PublicKey::from_hex(hex).ok())
                    .any(|p| self.p_tags.contains(&p)))
            && self.since.is_none_or(|since| event.created_at >= since)
            && self.until.is_none_or(|until| event.created_at <= until)
    }
}
