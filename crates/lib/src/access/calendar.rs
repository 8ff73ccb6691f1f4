//! Calendar visibility masking.
//!
//! Members of a zone who are not admitted to a section still see that the section has
//! an event on a given date, but none of its details.

use serde::{Deserialize, Serialize};

use super::AccessEngine;
use super::types::{Action, SectionId, Target};
use crate::identity::PublicKey;

/// A scheduled event posted in a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub section: SectionId,
    /// Unix seconds
    pub starts_at: u64,
    pub title: String,
    pub details: String,
}

/// What a given identity may see of a [`CalendarEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum CalendarView {
    Full(CalendarEntry),
    DateOnly {
        id: String,
        section: SectionId,
        starts_at: u64,
    },
}

impl AccessEngine {
    /// Filter `entries` down to what `identity` may read.
    ///
    /// Entries in sections the identity may read are returned in full. Entries in
    /// sections it may not read, but whose zone it may, are reduced to their date.
    /// Everything else, including entries for unknown sections, is dropped.
    pub fn calendar_view(
        &self,
        identity: &PublicKey,
        entries: impl IntoIterator<Item = CalendarEntry>,
    ) -> Vec<CalendarView> {
        let state = self.read();
        entries
            .into_iter()
            .filter_map(|entry| {
                let section = Target::Section(entry.section.clone());
                if state.authorize(identity, &section, Action::Read).is_ok() {
                    return Some(CalendarView::Full(entry));
                }
                let zone = state.directory.zone_of(&section).ok()?;
                state
                    .authorize(identity, &Target::Zone(zone.id.clone()), Action::Read)
                    .ok()?;
                Some(CalendarView::DateOnly {
                    id: entry.id,
                    section: entry.section,
                    starts_at: entry.starts_at,
                })
            })
            .collect()
    }
}
