//! Error types for access control
use thiserror::Error;

use super::types::{Action, GrantState, Target, ZoneId};
use crate::Error;
use crate::identity::PublicKey;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Access request already pending for {target}")]
    AlreadyPending { target: Target },

    /// The grant is not in a state the operation applies to, or the caller's snapshot
    /// is stale.
    #[error("Invalid grant transition for {target} from {from:?}")]
    InvalidTransition { target: Target, from: GrantState },

    #[error("{target} is open and needs no approval")]
    ApprovalNotRequired { target: Target },

    #[error("{admin} is not an administrator of zone {zone}")]
    NotAdministrator { admin: PublicKey, zone: ZoneId },

    #[error("Access to {target} for {action} refused")]
    Forbidden { target: Target, action: Action },

    #[error("Unknown target: {target}")]
    UnknownTarget { target: Target },

    #[error("Target already registered: {target}")]
    DuplicateTarget { target: Target },
}

impl AccessError {
    /// Check if this error indicates access was refused.
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            AccessError::Forbidden { .. } | AccessError::NotAdministrator { .. }
        )
    }

    /// Check if this error is a misuse of the request/decide workflow.
    pub fn is_transition_error(&self) -> bool {
        matches!(
            self,
            AccessError::AlreadyPending { .. }
                | AccessError::InvalidTransition { .. }
                | AccessError::ApprovalNotRequired { .. }
        )
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccessError::UnknownTarget { .. })
    }
}

impl From<AccessError> for Error {
    fn from(err: AccessError) -> Self {
        Error::Access(err)
    }
}
