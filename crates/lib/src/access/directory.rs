//! Zone/section directory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::AccessError;
use super::types::{AccessPolicy, Section, SectionId, Target, Zone, ZoneId};

/// Two-level tree of zones and sections.
///
/// Sections point at their zone by id; zones do not point back. A section can only
/// be registered under a zone that already exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDirectory {
    zones: BTreeMap<ZoneId, Zone>,
    sections: BTreeMap<SectionId, Section>,
}

impl AccessDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_zone(&mut self, zone: Zone) -> Result<(), AccessError> {
        if self.zones.contains_key(&zone.id) {
            return Err(AccessError::DuplicateTarget {
                target: Target::Zone(zone.id),
            });
        }
        self.zones.insert(zone.id.clone(), zone);
        Ok(())
    }

    pub fn add_section(&mut self, section: Section) -> Result<(), AccessError> {
        if !self.zones.contains_key(&section.zone) {
            return Err(AccessError::UnknownTarget {
                target: Target::Zone(section.zone),
            });
        }
        if self.sections.contains_key(&section.id) {
            return Err(AccessError::DuplicateTarget {
                target: Target::Section(section.id),
            });
        }
        self.sections.insert(section.id.clone(), section);
        Ok(())
    }

    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn sections_in<'a>(&'a self, zone: &'a ZoneId) -> impl Iterator<Item = &'a Section> {
        self.sections.values().filter(move |s| &s.zone == zone)
    }

    /// The zone a target belongs to (itself, for a zone).
    pub fn zone_of(&self, target: &Target) -> Result<&Zone, AccessError> {
        let zone_id = match target {
            Target::Zone(id) => id,
            Target::Section(id) => &self.require_section(id)?.zone,
        };
        self.zones
            .get(zone_id)
            .ok_or_else(|| AccessError::UnknownTarget {
                target: Target::Zone(zone_id.clone()),
            })
    }

    /// Policy in force for `target`: for a section, the stricter of its own and its
    /// zone's.
    pub fn effective_policy(&self, target: &Target) -> Result<AccessPolicy, AccessError> {
        let zone = self.zone_of(target)?;
        match target {
            Target::Zone(_) => Ok(zone.policy),
            Target::Section(id) => Ok(self.require_section(id)?.policy.max(zone.policy)),
        }
    }

    fn require_section(&self, id: &SectionId) -> Result<&Section, AccessError> {
        self.sections
            .get(id)
            .ok_or_else(|| AccessError::UnknownTarget {
                target: Target::Section(id.clone()),
            })
    }
}
