//! Error types for the session guard
use std::time::Duration;

use thiserror::Error;

use crate::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SessionError {
    /// Too many failed logins inside the current attempt window.
    #[error("Too many failed login attempts, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// No active session, or the active session has passed its idle deadline.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The login was overtaken by a logout before it completed.
    #[error("Login cancelled by logout")]
    LoginCancelled,
}

impl SessionError {
    /// Check if this error indicates login throttling.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SessionError::RateLimited { .. })
    }

    /// Check if this error means there is no usable session.
    pub fn is_not_authenticated(&self) -> bool {
        matches!(
            self,
            SessionError::NotAuthenticated | SessionError::LoginCancelled
        )
    }

    /// How long the caller must wait before retrying, if throttled.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SessionError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        Error::Session(err)
    }
}
