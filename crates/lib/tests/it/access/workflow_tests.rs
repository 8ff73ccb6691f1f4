use haven::access::{Action, Decision, GrantState, Target};

use super::community;
use crate::helpers::identity;

#[test]
fn approve_zone_then_section_admits_reader() {
    let admin = identity(1).public_key();
    let member = identity(2).public_key();
    let (engine, _) = community(&admin);
    let (zone, section) = (Target::zone("Z"), Target::section("S"));

    let requested = engine
        .request_access(&member, &section, Some("I help plan events".into()))
        .unwrap();
    assert_eq!(requested.state, GrantState::Pending);
    let zone_grant = engine.grant(&member, &zone).unwrap();
    assert_eq!(zone_grant.state, GrantState::Pending);

    engine.decide(&admin, &zone_grant, Decision::Approve).unwrap();
    assert!(engine.authorize(&member, &section, Action::Read).unwrap_err().is_forbidden());

    engine.decide(&admin, &requested, Decision::Approve).unwrap();
    engine.authorize(&member, &section, Action::Read).unwrap();
    engine.authorize(&member, &zone, Action::Post).unwrap();
}

#[test]
fn denied_section_stays_forbidden_whatever_the_zone() {
    let admin = identity(1).public_key();
    let member = identity(2).public_key();
    let (engine, _) = community(&admin);
    let (zone, section) = (Target::zone("Z"), Target::section("S"));

    let requested = engine.request_access(&member, &section, None).unwrap();
    let denied = engine.decide(&admin, &requested, Decision::Deny).unwrap();
    assert_eq!(denied.state, GrantState::Denied);
    assert_eq!(denied.decided_by, Some(admin));

    let zone_grant = engine.grant(&member, &zone).unwrap();
    engine.decide(&admin, &zone_grant, Decision::Approve).unwrap();

    let err = engine.authorize(&member, &section, Action::Read).unwrap_err();
    assert!(err.is_forbidden());
    engine.authorize(&member, &zone, Action::Read).unwrap();
}

#[test]
fn denied_request_may_be_renewed() {
    let admin = identity(1).public_key();
    let member = identity(2).public_key();
    let (engine, _) = community(&admin);
    let zone = Target::zone("Z");

    let first = engine.request_access(&member, &zone, None).unwrap();
    engine.decide(&admin, &first, Decision::Deny).unwrap();

    let second = engine
        .request_access(&member, &zone, Some("second try".into()))
        .unwrap();
    assert_eq!(second.state, GrantState::Pending);
    assert!(second.revision > first.revision);
    assert_eq!(second.message.as_deref(), Some("second try"));

    let err = engine.request_access(&member, &zone, None).unwrap_err();
    assert!(err.is_transition_error());
}

#[test]
fn stale_snapshot_cannot_decide() {
    let admin = identity(1).public_key();
    let member = identity(2).public_key();
    let (engine, _) = community(&admin);
    let zone = Target::zone("Z");

    let snapshot = engine.request_access(&member, &zone, None).unwrap();
    engine.decide(&admin, &snapshot, Decision::Approve).unwrap();

    let err = engine.decide(&admin, &snapshot, Decision::Deny).unwrap_err();
    assert!(err.is_transition_error());
    assert_eq!(engine.grant(&member, &zone).unwrap().state, GrantState::Approved);

    let err = engine.request_access(&member, &zone, None).unwrap_err();
    assert!(err.is_transition_error());
}

#[test]
fn only_zone_admins_decide() {
    let admin = identity(1).public_key();
    let member = identity(2).public_key();
    let outsider = identity(3).public_key();
    let (engine, _) = community(&admin);
    let zone = Target::zone("Z");

    let pending = engine.request_access(&member, &zone, None).unwrap();
    let err = engine.decide(&outsider, &pending, Decision::Approve).unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(engine.grant(&member, &zone).unwrap().state, GrantState::Pending);

    engine.authorize(&admin, &zone, Action::Administer).unwrap();
    assert!(engine.authorize(&member, &zone, Action::Administer).is_err());
}

#[test]
fn open_section_inherits_gated_zone() {
    let admin = identity(1).public_key();
    let member = identity(2).public_key();
    let (engine, _) = community(&admin);
    let (zone, lobby) = (Target::zone("Z"), Target::section("lobby"));

    assert!(engine.authorize(&member, &lobby, Action::Read).is_err());
    let section_grant = engine.request_access(&member, &lobby, None).unwrap();
    let zone_grant = engine.grant(&member, &zone).unwrap();
    assert_eq!(zone_grant.state, GrantState::Pending);

    engine.decide(&admin, &zone_grant, Decision::Approve).unwrap();
    engine.decide(&admin, &section_grant, Decision::Approve).unwrap();
    engine.authorize(&member, &lobby, Action::Read).unwrap();
}

#[test]
fn pending_requests_listed_oldest_first() {
    let admin = identity(1).public_key();
    let (engine, clock) = community(&admin);
    let first = identity(2).public_key();
    let second = identity(3).public_key();

    engine.request_access(&first, &Target::zone("Z"), None).unwrap();
    clock.advance_secs(5);
    engine.request_access(&second, &Target::section("S"), None).unwrap();

    let pending = engine.pending_requests(&"Z".into()).unwrap();
    let who: Vec<_> = pending.iter().map(|g| (g.identity, g.target.clone())).collect();
    assert_eq!(
        who,
        vec![
            (first, Target::zone("Z")),
            (second, Target::zone("Z")),
            (second, Target::section("S")),
        ]
    );
}

#[test]
fn unknown_targets_are_not_found() {
    let admin = identity(1).public_key();
    let (engine, _) = community(&admin);
    let err = engine
        .request_access(&admin, &Target::section("nowhere"), None)
        .unwrap_err();
    assert!(err.is_not_found());
}
