//! Access control integration tests

mod calendar_tests;
mod workflow_tests;

use std::sync::Arc;

use haven::access::{AccessEngine, AccessPolicy, Section, Zone};
use haven::{FixedClock, PublicKey};

/// Engine with an approval-required zone `Z` holding an approval-required section
/// `S` and an open section `lobby`, administered by `admin`.
pub fn community(admin: &PublicKey) -> (AccessEngine, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::default());
    let engine = AccessEngine::new(clock.clone());
    engine
        .add_zone(Zone::new("Z", "Members", AccessPolicy::ApprovalRequired).with_admin(*admin))
        .unwrap();
    engine
        .add_section(Section::new("S", "Z", "Planning", AccessPolicy::ApprovalRequired))
        .unwrap();
    engine
        .add_section(Section::new("lobby", "Z", "Lobby", AccessPolicy::Open))
        .unwrap();
    (engine, clock)
}
