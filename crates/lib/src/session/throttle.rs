//! Brute-force throttling of login attempts.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::SessionError;
use crate::config::LoginThrottleConfig;

/// Failed-login times over a rolling window.
///
/// A failure counts while it is younger than the window. Only the newest
/// `max_attempts` failures are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttemptWindow {
    /// Failure times (Unix milliseconds), oldest first
    #[serde(default)]
    pub failures: VecDeque<u64>,
}

impl LoginAttemptWindow {
    /// Number of stored failures.
    pub fn attempts(&self) -> u32 {
        u32::try_from(self.failures.len()).unwrap_or(u32::MAX)
    }

    /// Failures inside `(now - window, now]`.
    pub fn attempts_at(&self, now: u64, window: Duration) -> u32 {
        let counted = self.counted(now, window).count();
        u32::try_from(counted).unwrap_or(u32::MAX)
    }

    /// Fail with [`SessionError::RateLimited`] if another attempt is not allowed yet.
    ///
    /// The retry delay runs until the oldest counted failure leaves the window.
    pub fn check(&self, now: u64, config: &LoginThrottleConfig) -> Result<(), SessionError> {
        let window = config.window();
        let counted: Vec<u64> = self.counted(now, window).collect();
        let max = usize::try_from(config.max_attempts.max(1)).unwrap_or(usize::MAX);
        if counted.len() < max {
            return Ok(());
        }
        // Once the excess leaves the window, `max - 1` remain and one more is allowed.
        let oldest = counted.get(counted.len() - max).copied().unwrap_or(now);
        let reopens_at = oldest.saturating_add(millis(window));
        Err(SessionError::RateLimited {
            retry_after: Duration::from_millis(reopens_at.saturating_sub(now)),
        })
    }

    /// Count a failed attempt at `now`, dropping failures that no longer count.
    pub fn record_failure(&mut self, now: u64, config: &LoginThrottleConfig) {
        let window = millis(config.window());
        self.failures.retain(|&at| at <= now && now.saturating_sub(at) < window);
        self.failures.push_back(now);
        let max = usize::try_from(config.max_attempts.max(1)).unwrap_or(usize::MAX);
        while self.failures.len() > max {
            self.failures.pop_front();
        }
    }

    fn counted(&self, now: u64, window: Duration) -> impl Iterator<Item = u64> + '_ {
        let window = millis(window);
        self.failures
            .iter()
            .copied()
            .filter(move |&at| at <= now && now.saturating_sub(at) < window)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
