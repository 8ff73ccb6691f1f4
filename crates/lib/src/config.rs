//! Runtime configuration for the Haven core.
//!
//! Every field has a default, so a partial JSON file (or none at all) yields a
//! usable configuration:
//!
//! ```json
//! { "session": { "idle_timeout_secs": 900 }, "login": { "max_attempts": 3 } }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::vault::{KdfParams, PassphrasePolicy};
use crate::{Error, Result};

/// Idle-expiry timing for the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Inactivity after which the session expires.
    pub idle_timeout_secs: u64,
    /// How long before the deadline the expiry warning is raised.
    pub warning_lead_secs: u64,
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn warning_lead(&self) -> Duration {
        Duration::from_secs(self.warning_lead_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
            warning_lead_secs: 2 * 60,
        }
    }
}

/// Brute-force throttling for login attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginThrottleConfig {
    /// Failed attempts allowed inside one window.
    pub max_attempts: u32,
    /// Length of the rolling window, starting at the first failure.
    pub window_secs: u64,
}

impl LoginThrottleConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for LoginThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 15 * 60,
        }
    }
}

/// Gift-wrap parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Upper bound of the random offset subtracted from every wire timestamp.
    pub timestamp_jitter_secs: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            timestamp_jitter_secs: 30 * 60,
        }
    }
}

/// Default deadlines for operations that may stall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Key derivation (unlock and seal).
    pub kdf_secs: u64,
    /// A single relay round-trip.
    pub relay_secs: u64,
}

impl TimeoutConfig {
    pub fn kdf(&self) -> Duration {
        Duration::from_secs(self.kdf_secs)
    }

    pub fn relay(&self) -> Duration {
        Duration::from_secs(self.relay_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            kdf_secs: 30,
            relay_secs: 10,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub login: LoginThrottleConfig,
    pub messaging: MessagingConfig,
    pub kdf: KdfParams,
    pub passphrase: PassphrasePolicy,
    pub timeouts: TimeoutConfig,
}

impl Config {
    /// Parse a configuration from JSON text and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file. A missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        match tokio::fs::read_to_string(path.as_ref()).await {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reject values the components cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.session.idle_timeout_secs == 0 {
            return Err(invalid("session.idle_timeout_secs must be positive"));
        }
        if self.session.warning_lead_secs >= self.session.idle_timeout_secs {
            return Err(invalid(
                "session.warning_lead_secs must be shorter than the idle timeout",
            ));
        }
        if self.login.max_attempts == 0 {
            return Err(invalid("login.max_attempts must be positive"));
        }
        if self.login.window_secs == 0 {
            return Err(invalid("login.window_secs must be positive"));
        }
        if self.messaging.timestamp_jitter_secs == 0 {
            return Err(invalid("messaging.timestamp_jitter_secs must be positive"));
        }
        if self.timeouts.kdf_secs == 0 || self.timeouts.relay_secs == 0 {
            return Err(invalid("timeouts must be positive"));
        }
        self.kdf.validate()?;
        Ok(())
    }
}

fn invalid(reason: &str) -> Error {
    Error::Config {
        reason: reason.to_string(),
    }
}
