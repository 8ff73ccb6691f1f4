use haven::access::{CalendarEntry, CalendarView, Decision, Target};

use super::community;
use crate::helpers::identity;

fn entry(id: &str, section: &str, starts_at: u64) -> CalendarEntry {
    CalendarEntry {
        id: id.to_string(),
        section: section.into(),
        starts_at,
        title: format!("{id} title"),
        details: format!("{id} location and agenda"),
    }
}

fn entries() -> Vec<CalendarEntry> {
    vec![
        entry("picnic", "S", 1_706_000_000),
        entry("orphan", "missing", 1_706_100_000),
    ]
}

#[test]
fn zone_members_see_dates_only() {
    let admin = identity(1).public_key();
    let member = identity(2).public_key();
    let (engine, _) = community(&admin);

    let zone_grant = engine.request_access(&member, &Target::zone("Z"), None).unwrap();
    engine.decide(&admin, &zone_grant, Decision::Approve).unwrap();

    assert_eq!(
        engine.calendar_view(&member, entries()),
        vec![CalendarView::DateOnly {
            id: "picnic".to_string(),
            section: "S".into(),
            starts_at: 1_706_000_000,
        }]
    );
}

#[test]
fn section_members_see_details() {
    let admin = identity(1).public_key();
    let member = identity(2).public_key();
    let (engine, _) = community(&admin);

    let section_grant = engine
        .request_access(&member, &Target::section("S"), None)
        .unwrap();
    let zone_grant = engine.grant(&member, &Target::zone("Z")).unwrap();
    engine.decide(&admin, &zone_grant, Decision::Approve).unwrap();
    engine.decide(&admin, &section_grant, Decision::Approve).unwrap();

    let views = engine.calendar_view(&member, entries());
    assert_eq!(views, vec![CalendarView::Full(entry("picnic", "S", 1_706_000_000))]);
}

#[test]
fn outsiders_see_nothing() {
    let admin = identity(1).public_key();
    let (engine, _) = community(&admin);
    assert!(engine.calendar_view(&identity(9).public_key(), entries()).is_empty());
}

#[test]
fn masked_view_serializes_without_details() {
    let view = CalendarView::DateOnly {
        id: "picnic".to_string(),
        section: "S".into(),
        starts_at: 1_706_000_000,
    };
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["view"], "date_only");
    assert!(json.get("title").is_none());
    assert!(json.get("details").is_none());
}
