//! Core data types for access control

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::PublicKey;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Stable identifier of a zone.
    ZoneId
);
string_id!(
    /// Stable identifier of a section.
    SectionId
);

/// Something access can be granted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Zone(ZoneId),
    Section(SectionId),
}

impl Target {
    pub fn zone(id: impl Into<ZoneId>) -> Self {
        Target::Zone(id.into())
    }

    pub fn section(id: impl Into<SectionId>) -> Self {
        Target::Section(id.into())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Zone(id) => write!(f, "zone:{id}"),
            Target::Section(id) => write!(f, "section:{id}"),
        }
    }
}

/// Admission policy. Ordered from least to most restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// Any authenticated identity is admitted.
    Open,
    /// Admission requires an approved grant.
    ApprovalRequired,
}

/// Top-level access domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub policy: AccessPolicy,
    /// Identities allowed to decide requests in this zone and its sections
    pub admins: BTreeSet<PublicKey>,
}

impl Zone {
    pub fn new(id: impl Into<ZoneId>, name: impl Into<String>, policy: AccessPolicy) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            policy,
            admins: BTreeSet::new(),
        }
    }

    pub fn with_admin(mut self, admin: PublicKey) -> Self {
        self.admins.insert(admin);
        self
    }

    pub fn is_admin(&self, identity: &PublicKey) -> bool {
        self.admins.contains(identity)
    }
}

/// Access domain nested in exactly one zone, referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub zone: ZoneId,
    pub name: String,
    pub policy: AccessPolicy,
}

impl Section {
    pub fn new(
        id: impl Into<SectionId>,
        zone: impl Into<ZoneId>,
        name: impl Into<String>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            id: id.into(),
            zone: zone.into(),
            name: name.into(),
            policy,
        }
    }
}

/// Standing of an identity towards a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantState {
    #[default]
    NotRequested,
    Pending,
    Approved,
    Denied,
}

/// Administrative outcome for a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Deny,
}

impl Decision {
    pub(crate) fn resulting_state(self) -> GrantState {
        match self {
            Decision::Approve => GrantState::Approved,
            Decision::Deny => GrantState::Denied,
        }
    }
}

/// What an identity wants to do with a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Post,
    /// Decide requests and manage the zone; only listed administrators.
    Administer,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Read => f.write_str("read"),
            Action::Post => f.write_str("post"),
            Action::Administer => f.write_str("administer"),
        }
    }
}

/// A single identity's standing towards a single target.
///
/// `revision` increases with every transition; [`AccessEngine::decide`] only applies
/// to the revision it was given.
///
/// [`AccessEngine::decide`]: super::AccessEngine::decide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub identity: PublicKey,
    pub target: Target,
    pub state: GrantState,
    /// Message attached to the latest request
    pub message: Option<String>,
    pub revision: u64,
    /// Unix milliseconds of the latest transition
    pub updated_at: u64,
    /// Administrator who made the latest decision
    pub decided_by: Option<PublicKey>,
}

impl AccessGrant {
    pub(crate) fn not_requested(identity: PublicKey, target: Target) -> Self {
        Self {
            identity,
            target,
            state: GrantState::NotRequested,
            message: None,
            revision: 0,
            updated_at: 0,
            decided_by: None,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.state == GrantState::Approved
    }
}
