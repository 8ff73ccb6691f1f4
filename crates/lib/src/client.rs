//! Client facade
//!
//! Wires the components in the order a host uses them: the key vault unlocks, the
//! session guard admits, the access engine authorises, and the messaging layer wraps
//! and unwraps events crossing the relay.
//!
//! ```no_run
//! # async fn example() -> haven::Result<()> {
//! use std::sync::Arc;
//!
//! use haven::relay::LoopbackRelay;
//! use haven::session::Credential;
//! use haven::store::InMemoryStore;
//! use haven::{Client, Config, SystemClock};
//!
//! let clock = Arc::new(SystemClock);
//! let relay = Arc::new(LoopbackRelay::new("wss://relay.example.com", clock.clone()));
//! let client = Client::new(Config::default(), Arc::new(InMemoryStore::new()), relay, clock);
//!
//! client.create_identity("correct horse battery staple").await?;
//! client.login(Credential::passphrase("correct horse battery staple")).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::access::{
    AccessEngine, AccessGrant, Action, CalendarEntry, CalendarView, Decision, Target,
};
use crate::clock::Clock;
use crate::config::Config;
use crate::event::KIND_GIFT_WRAP;
use crate::identity::{Identity, PublicKey};
use crate::messaging::{self, DirectMessage, GiftWrap, MessagingError, TimestampFuzz};
use crate::relay::{self, Filter, RelayGateway};
use crate::session::{Credential, ExpiryStatus, SessionGuard, SessionMetadata, SessionState};
use crate::store::Store;
use crate::vault::{EncryptedKeyRecord, KeyVault};
use crate::{Result, with_timeout};

/// Entry point for host applications.
#[derive(Debug)]
pub struct Client {
    config: Config,
    vault: Arc<KeyVault>,
    session: SessionGuard,
    access: AccessEngine,
    relay: Arc<dyn RelayGateway>,
    clock: Arc<dyn Clock>,
}

impl Client {
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        relay: Arc<dyn RelayGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let vault = Arc::new(KeyVault::new(&config, store.clone(), clock.clone()));
        let session = SessionGuard::new(&config, vault.clone(), store, clock.clone());
        let access = AccessEngine::new(clock.clone());
        Self {
            config,
            vault,
            session,
            access,
            relay,
            clock,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn vault(&self) -> &KeyVault {
        &self.vault
    }

    pub fn session(&self) -> &SessionGuard {
        &self.session
    }

    pub fn access(&self) -> &AccessEngine {
        &self.access
    }

    // === Identity ===

    /// Generate a new identity and store it encrypted under `passphrase`.
    ///
    /// Replaces any stored record. Returns the new public key.
    pub async fn create_identity(&self, passphrase: &str) -> Result<PublicKey> {
        let identity = self.vault.generate();
        self.store_identity(&identity, passphrase).await
    }

    /// Import an `nsec1…`/hex private key and store it encrypted under `passphrase`.
    pub async fn import_identity(&self, key_text: &str, passphrase: &str) -> Result<PublicKey> {
        let identity = self.vault.import_from_text(key_text)?;
        self.store_identity(&identity, passphrase).await
    }

    /// The stored record, if any.
    pub async fn stored_record(&self) -> Result<Option<EncryptedKeyRecord>> {
        self.vault.load_record().await
    }

    async fn store_identity(&self, identity: &Identity, passphrase: &str) -> Result<PublicKey> {
        let record = self
            .vault
            .seal(
                identity,
                Zeroizing::new(passphrase.to_string()),
                self.config.timeouts.kdf(),
            )
            .await?;
        self.vault.store_record(&record).await?;
        Ok(record.public_key)
    }

    // === Session ===

    pub async fn login(&self, credential: Credential) -> Result<SessionMetadata> {
        self.session.attempt_login(credential).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await
    }

    /// Record user activity.
    pub async fn touch(&self) -> Result<()> {
        self.session.touch().await
    }

    /// Evaluate idle expiry at the current time.
    pub async fn check_expiry(&self) -> Result<ExpiryStatus> {
        self.session.check_expiry(self.clock.now_millis()).await
    }

    pub async fn session_state(&self) -> SessionState {
        self.session.state().await
    }

    pub async fn public_key(&self) -> Result<PublicKey> {
        Ok(self.session.identity().await?.public_key())
    }

    // === Access ===

    pub async fn request_access(
        &self,
        target: &Target,
        message: Option<String>,
    ) -> Result<AccessGrant> {
        let me = self.public_key().await?;
        self.access.request_access(&me, target, message)
    }

    /// Decide a pending request as the logged-in administrator.
    pub async fn decide(&self, snapshot: &AccessGrant, decision: Decision) -> Result<AccessGrant> {
        let me = self.public_key().await?;
        self.access.decide(&me, snapshot, decision)
    }

    pub async fn authorize(&self, target: &Target, action: Action) -> Result<()> {
        let me = self.public_key().await?;
        self.access.authorize(&me, target, action)
    }

    pub async fn calendar(&self, entries: Vec<CalendarEntry>) -> Result<Vec<CalendarView>> {
        let me = self.public_key().await?;
        Ok(self.access.calendar_view(&me, entries))
    }

    // === Messaging ===

    /// Gift-wrap `body` to `recipient` and publish it, along with a copy for ourselves.
    ///
    /// Returns the wrap addressed to the recipient.
    pub async fn send_direct_message(&self, recipient: &PublicKey, body: &str) -> Result<GiftWrap> {
        self.session.touch().await?;
        let sender = self.session.identity().await?;
        let fuzz = TimestampFuzz::from_config(self.clock.now_secs(), &self.config.messaging);
        let recipient_key = *recipient;
        let body = Zeroizing::new(body.to_string());

        let wrapped = tokio::task::spawn_blocking(move || {
            messaging::wrap_with_self_copy(&body, &recipient_key, &sender, &fuzz)
        })
        .await
        .map_err(|e| MessagingError::WorkerFailed {
            reason: e.to_string(),
        })??;

        let timeout = self.config.timeouts.relay();
        for gift in [&wrapped.to_recipient, &wrapped.to_sender] {
            with_timeout("relay publish", timeout, self.relay.publish(gift.event())).await?;
        }
        info!(wrap_id = %wrapped.to_recipient.event().id, "Sent direct message");
        Ok(wrapped.to_recipient)
    }

    /// Fetch, open and return every direct message we received or sent, oldest first.
    ///
    /// Authenticates to the relay first. Wraps that cannot be opened are skipped.
    pub async fn fetch_direct_messages(&self) -> Result<Vec<DirectMessage>> {
        self.session.touch().await?;
        let me = self.session.identity().await?;
        let timeout = self.config.timeouts.relay();

        let challenge = with_timeout("relay challenge", timeout, self.relay.challenge()).await?;
        let auth = relay::auth_event(&me, self.relay.url(), &challenge, self.clock.now_secs())?;
        with_timeout("relay authenticate", timeout, self.relay.authenticate(&auth)).await?;

        let filter = Filter::new().kind(KIND_GIFT_WRAP).p_tag(me.public_key());
        let events = with_timeout("relay query", timeout, self.relay.query(&filter)).await?;
        debug!(count = events.len(), "Fetched gift wraps");

        let mut messages = tokio::task::spawn_blocking(move || {
            events
                .into_iter()
                .filter_map(|event| GiftWrap::from_event(event).ok())
                .filter_map(|gift| match messaging::unwrap(&gift, &me) {
                    Ok(message) => Some(message),
                    Err(_) => {
                        warn!(wrap_id = %gift.event().id, "Skipping undecryptable gift wrap");
                        None
                    }
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| MessagingError::WorkerFailed {
            reason: e.to_string(),
        })?;
        messages.sort_by_key(|message| message.created_at);
        Ok(messages)
    }

    /// Remove the stored identity and end the session. Irreversible without a backup.
    pub async fn forget_identity(&self) -> Result<()> {
        self.session.logout().await?;
        self.vault.remove_record().await
    }
}
