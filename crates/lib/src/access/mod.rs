//! Access control for zones and sections
//!
//! Each (identity, target) pair has one [`AccessGrant`] moving through
//!
//! ```text
//! NotRequested ──request──▶ Pending ──decide──▶ Approved
//!                              ▲        └─────▶ Denied
//!                              └────request─────────┘
//! ```
//!
//! All grants live behind a single lock. Every transition checks the grant's current
//! state under that lock, and [`AccessEngine::decide`] additionally requires the
//! revision the administrator looked at, so a decision made on a stale view is
//! rejected rather than applied.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::Result;
use crate::clock::Clock;
use crate::identity::PublicKey;

pub mod calendar;
pub mod directory;
pub mod errors;
pub mod types;

pub use calendar::{CalendarEntry, CalendarView};
pub use directory::AccessDirectory;
pub use errors::AccessError;
pub use types::{
    AccessGrant, AccessPolicy, Action, Decision, GrantState, Section, SectionId, Target, Zone,
    ZoneId,
};

#[derive(Debug, Default)]
struct AccessState {
    directory: AccessDirectory,
    grants: HashMap<(PublicKey, Target), AccessGrant>,
}

impl AccessState {
    fn grant(&self, identity: &PublicKey, target: &Target) -> AccessGrant {
        self.grants
            .get(&(*identity, target.clone()))
            .cloned()
            .unwrap_or_else(|| AccessGrant::not_requested(*identity, target.clone()))
    }

    fn state_of(&self, identity: &PublicKey, target: &Target) -> GrantState {
        self.grants
            .get(&(*identity, target.clone()))
            .map(|grant| grant.state)
            .unwrap_or_default()
    }

    fn store(&mut self, grant: AccessGrant) {
        self.grants
            .insert((grant.identity, grant.target.clone()), grant);
    }

    /// Read-only authorization against the current grants.
    fn authorize(
        &self,
        identity: &PublicKey,
        target: &Target,
        action: Action,
    ) -> std::result::Result<(), AccessError> {
        let zone = self.directory.zone_of(target)?;
        let forbidden = || AccessError::Forbidden {
            target: target.clone(),
            action,
        };

        if action == Action::Administer {
            return if zone.is_admin(identity) {
                Ok(())
            } else {
                Err(forbidden())
            };
        }

        if self.directory.effective_policy(target)? == AccessPolicy::Open {
            return Ok(());
        }
        if self.state_of(identity, target) != GrantState::Approved {
            return Err(forbidden());
        }
        if matches!(target, Target::Section(_))
            && zone.policy == AccessPolicy::ApprovalRequired
            && self.state_of(identity, &Target::Zone(zone.id.clone())) != GrantState::Approved
        {
            return Err(forbidden());
        }
        Ok(())
    }
}

/// Evaluates and drives access grants.
#[derive(Debug)]
pub struct AccessEngine {
    state: RwLock<AccessState>,
    clock: Arc<dyn Clock>,
}

impl AccessEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_directory(AccessDirectory::new(), clock)
    }

    pub fn with_directory(directory: AccessDirectory, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(AccessState {
                directory,
                grants: HashMap::new(),
            }),
            clock,
        }
    }

    pub fn add_zone(&self, zone: Zone) -> Result<()> {
        debug!(zone = %zone.id, policy = ?zone.policy, "Registering zone");
        Ok(self.write().directory.add_zone(zone)?)
    }

    pub fn add_section(&self, section: Section) -> Result<()> {
        debug!(
            section = %section.id,
            zone = %section.zone,
            policy = ?section.policy,
            "Registering section"
        );
        Ok(self.write().directory.add_section(section)?)
    }

    /// Snapshot of the directory.
    pub fn directory(&self) -> AccessDirectory {
        self.read().directory.clone()
    }

    /// Ask for access to an approval-required target.
    ///
    /// Moves the grant from `NotRequested` or `Denied` to `Pending`. Requesting a
    /// section inside an approval-required zone also moves the zone grant to `Pending`
    /// unless it is already pending or approved.
    pub fn request_access(
        &self,
        identity: &PublicKey,
        target: &Target,
        message: Option<String>,
    ) -> Result<AccessGrant> {
        let now = self.clock.now_millis();
        let mut state = self.write();

        if state.directory.effective_policy(target)? == AccessPolicy::Open {
            return Err(AccessError::ApprovalNotRequired {
                target: target.clone(),
            }
            .into());
        }

        let current = state.grant(identity, target);
        match current.state {
            GrantState::NotRequested | GrantState::Denied => {}
            GrantState::Pending => {
                return Err(AccessError::AlreadyPending {
                    target: target.clone(),
                }
                .into());
            }
            GrantState::Approved => {
                return Err(AccessError::InvalidTransition {
                    target: target.clone(),
                    from: current.state,
                }
                .into());
            }
        }

        let zone = state.directory.zone_of(target)?;
        let zone_target = match target {
            Target::Section(_) if zone.policy == AccessPolicy::ApprovalRequired => {
                Some(Target::Zone(zone.id.clone()))
            }
            _ => None,
        };

        if let Some(zone_target) = zone_target {
            let zone_grant = state.grant(identity, &zone_target);
            if matches!(
                zone_grant.state,
                GrantState::NotRequested | GrantState::Denied
            ) {
                let zone_grant = pending(zone_grant, message.clone(), now);
                info!(identity = %identity, target = %zone_target, "Zone access requested");
                state.store(zone_grant);
            }
        }

        let grant = pending(current, message, now);
        state.store(grant.clone());
        info!(identity = %identity, target = %target, "Access requested");
        Ok(grant)
    }

    /// Approve or deny a pending request.
    ///
    /// `snapshot` is the grant as the administrator saw it. The decision applies only
    /// if the stored grant is still `Pending` at the same revision; otherwise it fails
    /// with [`AccessError::InvalidTransition`] and nothing changes.
    pub fn decide(
        &self,
        admin: &PublicKey,
        snapshot: &AccessGrant,
        decision: Decision,
    ) -> Result<AccessGrant> {
        let now = self.clock.now_millis();
        let mut state = self.write();

        let zone = state.directory.zone_of(&snapshot.target)?;
        if !zone.is_admin(admin) {
            return Err(AccessError::NotAdministrator {
                admin: *admin,
                zone: zone.id.clone(),
            }
            .into());
        }

        let current = state.grant(&snapshot.identity, &snapshot.target);
        if current.state != GrantState::Pending || current.revision != snapshot.revision {
            debug!(
                target = %snapshot.target,
                stored_revision = current.revision,
                snapshot_revision = snapshot.revision,
                "Rejecting decision on stale or non-pending grant"
            );
            return Err(AccessError::InvalidTransition {
                target: snapshot.target.clone(),
                from: current.state,
            }
            .into());
        }

        let grant = AccessGrant {
            state: decision.resulting_state(),
            revision: current.revision + 1,
            updated_at: now,
            decided_by: Some(*admin),
            ..current
        };
        state.store(grant.clone());
        info!(
            identity = %grant.identity,
            target = %grant.target,
            decision = ?decision,
            admin = %admin,
            "Access request decided"
        );
        Ok(grant)
    }

    /// Check whether `identity` may perform `action` on `target`. Never mutates.
    pub fn authorize(&self, identity: &PublicKey, target: &Target, action: Action) -> Result<()> {
        Ok(self.read().authorize(identity, target, action)?)
    }

    /// The grant for a pair, `NotRequested` if none was ever made.
    pub fn grant(&self, identity: &PublicKey, target: &Target) -> Result<AccessGrant> {
        let state = self.read();
        state.directory.zone_of(target)?;
        Ok(state.grant(identity, target))
    }

    /// Pending requests for a zone and its sections, oldest first.
    pub fn pending_requests(&self, zone: &ZoneId) -> Result<Vec<AccessGrant>> {
        let state = self.read();
        state.directory.zone_of(&Target::Zone(zone.clone()))?;

        let mut pending: Vec<AccessGrant> = state
            .grants
            .values()
            .filter(|grant| grant.state == GrantState::Pending)
            .filter(|grant| {
                state
                    .directory
                    .zone_of(&grant.target)
                    .is_ok_and(|z| &z.id == zone)
            })
            .cloned()
            .collect();
        pending.sort_by(|a, b| {
            a.updated_at
                .cmp(&b.updated_at)
                .then_with(|| a.target.cmp(&b.target))
        });
        Ok(pending)
    }

    fn read(&self) -> RwLockReadGuard<'_, AccessState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AccessState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn pending(grant: AccessGrant, message: Option<String>, now: u64) -> AccessGrant {
    AccessGrant {
        state: GrantState::Pending,
        message,
        revision: grant.revision + 1,
        updated_at: now,
        decided_by: None,
        ..grant
    }
}
