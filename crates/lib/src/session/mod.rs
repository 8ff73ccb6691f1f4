//! Session guard
//!
//! Owns the single session slot and the login attempt window. A session moves
//! `LoggedOut → Authenticating → Active → (IdleExpired | LoggedOut)`; the unlocked
//! [`Identity`] lives only inside the `Active` session and is zeroized when the session
//! ends.
//!
//! Expiry is driven by the host calling [`SessionGuard::check_expiry`] with the current
//! time, rather than by timers owned by the guard.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::Result;
use crate::clock::Clock;
use crate::config::{Config, LoginThrottleConfig, SessionConfig};
use crate::identity::Identity;
use crate::store::{self, Region, Store};
use crate::vault::KeyVault;

pub mod errors;
pub mod throttle;
pub mod types;

pub use errors::SessionError;
pub use throttle::LoginAttemptWindow;
pub use types::{Credential, ExpiryStatus, Session, SessionMetadata, SessionState};

/// Durable-region key of the login attempt window.
pub const ATTEMPTS_KEY: &str = "session/login_attempts";
/// Volatile-region key of the current session's metadata.
pub const SESSION_KEY: &str = "session/current";

#[derive(Debug)]
struct Slot {
    state: SessionState,
    session: Option<Session>,
    /// Bumped whenever a login starts or the session is torn down, so a login that
    /// finishes after a logout can tell it was overtaken.
    generation: u64,
}

impl Slot {
    /// Drop the current session, zeroizing its key.
    fn end(&mut self, state: SessionState) -> Option<Uuid> {
        self.state = state;
        self.generation += 1;
        self.session.take().map(|session| session.id)
    }
}

/// Gatekeeper for authenticated operations.
#[derive(Debug)]
pub struct SessionGuard {
    session_config: SessionConfig,
    throttle: LoginThrottleConfig,
    kdf_timeout: Duration,
    vault: Arc<KeyVault>,
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    slot: Mutex<Slot>,
    /// Serialises logins so that attempt counting is exact.
    login_lock: Mutex<()>,
}

impl SessionGuard {
    pub fn new(
        config: &Config,
        vault: Arc<KeyVault>,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session_config: config.session,
            throttle: config.login,
            kdf_timeout: config.timeouts.kdf(),
            vault,
            store,
            clock,
            slot: Mutex::new(Slot {
                state: SessionState::LoggedOut,
                session: None,
                generation: 0,
            }),
            login_lock: Mutex::new(()),
        }
    }

    /// Authenticate and start a new session.
    ///
    /// The attempt window is consulted before the credential is looked at, so a
    /// throttled call fails with [`SessionError::RateLimited`] even if the credential is
    /// correct. Starting a login ends any existing session.
    pub async fn attempt_login(&self, credential: Credential) -> Result<SessionMetadata> {
        let _login = self.login_lock.lock().await;

        let mut window = self.load_window().await?;
        let started = self.clock.now_millis();
        if let Err(err) = window.check(started, &self.throttle) {
            warn!(
                attempts = window.attempts_at(started, self.throttle.window()),
                "Login rate limited"
            );
            return Err(err.into());
        }

        let generation = {
            let mut slot = self.slot.lock().await;
            if let Some(previous) = slot.end(SessionState::Authenticating) {
                info!(session_id = %previous, "Previous session invalidated by new login");
            }
            slot.generation
        };
        self.store.clear(Region::Volatile).await?;

        let outcome = self.verify(credential).await;
        let now = self.clock.now_millis();

        let identity = match outcome {
            Ok(identity) => identity,
            Err(err) => {
                // A deadline miss says nothing about the credential.
                if !err.is_timeout() {
                    window.record_failure(now, &self.throttle);
                    store::set_json(self.store.as_ref(), Region::Durable, ATTEMPTS_KEY, &window)
                        .await?;
                }
                warn!(attempts = window.attempts(), error = %err, "Login failed");
                let mut slot = self.slot.lock().await;
                if slot.generation == generation {
                    slot.state = SessionState::LoggedOut;
                }
                return Err(err);
            }
        };

        self.store.delete(Region::Durable, ATTEMPTS_KEY).await?;

        let mut slot = self.slot.lock().await;
        if slot.generation != generation {
            debug!("Login overtaken by logout");
            return Err(SessionError::LoginCancelled.into());
        }
        let session = Session {
            id: Uuid::new_v4(),
            identity,
            created_at: now,
            last_activity_at: now,
            idle_timeout: self.session_config.idle_timeout(),
        };
        let metadata = session.metadata();
        store::set_json(self.store.as_ref(), Region::Volatile, SESSION_KEY, &metadata).await?;
        slot.session = Some(session);
        slot.state = SessionState::Active;

        info!(session_id = %metadata.id, public_key = %metadata.public_key, "Session started");
        Ok(metadata)
    }

    /// Record user activity, pushing the idle deadline back.
    pub async fn touch(&self) -> Result<()> {
        let now = self.clock.now_millis();
        let mut slot = self.slot.lock().await;
        let Some(session) = slot.session.as_mut() else {
            return Err(SessionError::NotAuthenticated.into());
        };
        if session.is_expired_at(now) {
            self.expire(&mut slot).await?;
            return Err(SessionError::NotAuthenticated.into());
        }
        session.last_activity_at = now.max(session.last_activity_at);
        let metadata = session.metadata();
        store::set_json(self.store.as_ref(), Region::Volatile, SESSION_KEY, &metadata).await
    }

    /// Evaluate the idle deadline at `now` (Unix milliseconds).
    ///
    /// Only the transition to [`ExpiryStatus::Expired`] mutates state; calling this
    /// again afterwards keeps returning `Expired` until the next login.
    pub async fn check_expiry(&self, now: u64) -> Result<ExpiryStatus> {
        let mut slot = self.slot.lock().await;
        let Some(session) = slot.session.as_ref() else {
            return Ok(match slot.state {
                SessionState::IdleExpired => ExpiryStatus::Expired,
                _ => ExpiryStatus::NoSession,
            });
        };

        let idle_timeout = self.session_config.idle_timeout();
        let idle = Duration::from_millis(now.saturating_sub(session.last_activity_at));
        if idle >= idle_timeout {
            self.expire(&mut slot).await?;
            return Ok(ExpiryStatus::Expired);
        }

        let remaining = idle_timeout - idle;
        if remaining <= self.session_config.warning_lead() {
            Ok(ExpiryStatus::Warning { remaining })
        } else {
            Ok(ExpiryStatus::Active { remaining })
        }
    }

    /// End the session immediately, zeroizing the identity.
    pub async fn logout(&self) -> Result<()> {
        let mut slot = self.slot.lock().await;
        let ended = slot.end(SessionState::LoggedOut);
        self.store.clear(Region::Volatile).await?;
        match ended {
            Some(id) => info!(session_id = %id, "Logged out"),
            None => debug!("Logout without an active session"),
        }
        Ok(())
    }

    /// A copy of the active identity for the duration of one operation.
    ///
    /// The copy zeroizes itself on drop. Fails with [`SessionError::NotAuthenticated`]
    /// when there is no active session or its deadline has passed.
    pub async fn identity(&self) -> Result<Identity> {
        let now = self.clock.now_millis();
        let mut slot = self.slot.lock().await;
        match slot.session.as_ref() {
            Some(session) if !session.is_expired_at(now) => Ok(session.identity.clone()),
            Some(_) => {
                self.expire(&mut slot).await?;
                Err(SessionError::NotAuthenticated.into())
            }
            None => Err(SessionError::NotAuthenticated.into()),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.slot.lock().await.state
    }

    /// Metadata of the active session, if any.
    pub async fn current(&self) -> Option<SessionMetadata> {
        self.slot.lock().await.session.as_ref().map(Session::metadata)
    }

    /// The persisted login attempt window.
    pub async fn login_attempts(&self) -> Result<LoginAttemptWindow> {
        self.load_window().await
    }

    async fn verify(&self, credential: Credential) -> Result<Identity> {
        match credential {
            Credential::Passphrase(passphrase) => {
                let record = self.vault.require_record().await?;
                self.vault
                    .unlock(&record, passphrase, self.kdf_timeout)
                    .await
            }
            Credential::SecretKey(text) => self.vault.import_from_text(&text),
        }
    }

    async fn expire(&self, slot: &mut Slot) -> Result<()> {
        if let Some(id) = slot.end(SessionState::IdleExpired) {
            info!(session_id = %id, "Session idle-expired");
        }
        self.store.clear(Region::Volatile).await
    }

    async fn load_window(&self) -> Result<LoginAttemptWindow> {
        Ok(
            store::get_json(self.store.as_ref(), Region::Durable, ATTEMPTS_KEY)
                .await?
                .unwrap_or_default(),
        )
    }
}
