//! Album classification and filtering
//!
//! The catalog labels songs with short era codes ("FD (DDE)", "GB&GR"). The
//! classifier expands a code to a human-readable album name and assigns it
//! to a filter group, where one group spans every re-release edition of the
//! same album. Unrecognized labels pass through unchanged and are never
//! filtered out.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display name used when the catalog reports no era at all
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Filter group for an era label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumGroup {
    /// One of the known album groups
    Named(&'static str),
    /// Ungrouped labels: always allowed, regardless of filter state
    Universal,
}

struct AlbumInfo {
    display: &'static str,
    group: &'static str,
}

/// Alias table, keyed by the uppercased era code.
///
/// Display expansions follow the catalog's conventions; groups collapse
/// edition variants onto the base album.
static ALBUM_ALIASES: Lazy<HashMap<&'static str, AlbumInfo>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let mut insert = |alias: &'static str, display: &'static str, group: &'static str| {
        m.insert(alias, AlbumInfo { display, group });
    };

    insert("JUTE", "Juiced Up The EP", "Juiced Up The EP");

    insert("GB&GR", "Goodbye & Good Riddance", "Goodbye & Good Riddance");
    insert(
        "GB&GR (AE)",
        "Goodbye & Good Riddance (Anniversary Edition)",
        "Goodbye & Good Riddance",
    );
    insert(
        "GB&GR (5YAE)",
        "Goodbye & Good Riddance (5 Year Anniversary Edition)",
        "Goodbye & Good Riddance",
    );

    insert("WOD", "WRLD On Drugs", "WRLD On Drugs");
    insert("DRFL", "Death Race For Love", "Death Race For Love");

    insert("LND", "Legends Never Die", "Legends Never Die");
    insert(
        "LND (5YAE)",
        "Legends Never Die (5th Anniversary Edition)",
        "Legends Never Die",
    );

    insert("FD", "Fighting Demons", "Fighting Demons");
    insert(
        "FD (DDE)",
        "Fighting Demons (Digital Deluxe Edition)",
        "Fighting Demons",
    );
    insert(
        "FD (CE)",
        "Fighting Demons (Collector's Edition)",
        "Fighting Demons",
    );

    insert("TPNE", "The Party Never Ends", "The Party Never Ends");
    insert("TPNE 2.0", "The Party Never Ends 2.0", "The Party Never Ends");

    insert("TPP", "The Pre Party", "The Pre Party");
    insert("TPP (EE)", "The Pre Party (Extended)", "The Pre Party");

    insert("OUT", "Outsiders", "Outsiders");
    insert("POST", "Posthumous", "Posthumous");
    insert("AFFLICTIONS", "affliction", "affliction");
    insert("HIH 999", "HIH 999", "HIH 999");
    insert("JW 999", "Juice WRLD 999", "Juice WRLD 999");
    insert("BDM", "BINGEDRINKINGMUSIC", "BINGEDRINKINGMUSIC");
    insert("ND", "NOTHING'S DIFFERENT </3", "NOTHING'S DIFFERENT </3");
    insert("MAINSTREAM", "Mainstream", "Mainstream");
    insert("SMULE", "Smule", "Smule");
    insert("YOUTUBE", "YouTube", "YouTube");
    insert("SOUNDCLOUD", "SoundCloud", "SoundCloud");

    m
});

/// Every known filter group, sorted for stable display
static KNOWN_GROUPS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut groups: Vec<&'static str> = Vec::new();
    for info in ALBUM_ALIASES.values() {
        if !groups.contains(&info.group) {
            groups.push(info.group);
        }
    }
    groups.sort_unstable();
    groups
});

/// All known album groups (the keys of a default filter)
pub fn known_groups() -> &'static [&'static str] {
    &KNOWN_GROUPS
}

/// Expand a raw era label to its display name.
///
/// Absent labels become [`UNKNOWN_ALBUM`]; unrecognized labels are returned
/// unchanged.
pub fn display_name(raw: Option<&str>) -> String {
    match raw {
        None => UNKNOWN_ALBUM.to_string(),
        Some(label) => match ALBUM_ALIASES.get(label.to_uppercase().as_str()) {
            Some(info) => info.display.to_string(),
            None => label.to_string(),
        },
    }
}

/// Resolve a raw era label to its filter group.
///
/// Lookup is case-insensitive; absent or unrecognized labels resolve to
/// [`AlbumGroup::Universal`] so they are never filtered out.
pub fn group_of(raw: Option<&str>) -> AlbumGroup {
    match raw {
        None => AlbumGroup::Universal,
        Some(label) => match ALBUM_ALIASES.get(label.to_uppercase().as_str()) {
            Some(info) => AlbumGroup::Named(info.group),
            None => AlbumGroup::Universal,
        },
    }
}

/// User-controlled album filter: group name → enabled.
///
/// Groups missing from the map count as enabled, so a freshly added album
/// group is playable before the user has ever seen it in settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumFilter {
    groups: HashMap<String, bool>,
}

impl AlbumFilter {
    /// Filter with every known group enabled
    pub fn all_enabled() -> Self {
        let groups = known_groups()
            .iter()
            .map(|g| (g.to_string(), true))
            .collect();
        Self { groups }
    }

    /// Whether songs in the given group may be served
    pub fn allows(&self, group: AlbumGroup) -> bool {
        match group {
            AlbumGroup::Universal => true,
            AlbumGroup::Named(name) => self.is_enabled(name),
        }
    }

    /// Whether a group is enabled (missing entries count as enabled)
    pub fn is_enabled(&self, group: &str) -> bool {
        self.groups.get(group).copied().unwrap_or(true)
    }

    /// Enable or disable a single group
    pub fn set_enabled(&mut self, group: &str, enabled: bool) {
        self.groups.insert(group.to_string(), enabled);
    }

    /// Bulk select/deselect every known group
    pub fn set_all(&mut self, enabled: bool) {
        for group in known_groups() {
            self.groups.insert(group.to_string(), enabled);
        }
    }

    /// True if at least one known group is enabled.
    ///
    /// A game may only start while this holds.
    pub fn any_enabled(&self) -> bool {
        known_groups().iter().any(|g| self.is_enabled(g))
    }
}

impl Default for AlbumFilter {
    fn default() -> Self {
        Self::all_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_expands_known_aliases() {
        assert_eq!(display_name(Some("GB&GR")), "Goodbye & Good Riddance");
        assert_eq!(
            display_name(Some("FD (DDE)")),
            "Fighting Demons (Digital Deluxe Edition)"
        );
        assert_eq!(display_name(Some("JW 999")), "Juice WRLD 999");
    }

    #[test]
    fn display_name_absent_and_unknown() {
        assert_eq!(display_name(None), UNKNOWN_ALBUM);
        assert_eq!(display_name(Some("Bootlegs Vol. 3")), "Bootlegs Vol. 3");
    }

    #[test]
    fn group_lookup_is_alias_and_case_insensitive() {
        assert_eq!(group_of(Some("fd (dde)")), AlbumGroup::Named("Fighting Demons"));
        assert_eq!(group_of(Some("FD (DDE)")), AlbumGroup::Named("Fighting Demons"));
        assert_eq!(group_of(Some("fd")), AlbumGroup::Named("Fighting Demons"));
        assert_eq!(group_of(Some("FD (CE)")), AlbumGroup::Named("Fighting Demons"));
    }

    #[test]
    fn editions_collapse_onto_base_album_group() {
        for alias in ["GB&GR", "GB&GR (AE)", "GB&GR (5YAE)"] {
            assert_eq!(
                group_of(Some(alias)),
                AlbumGroup::Named("Goodbye & Good Riddance")
            );
        }
        for alias in ["TPNE", "tpne 2.0"] {
            assert_eq!(group_of(Some(alias)), AlbumGroup::Named("The Party Never Ends"));
        }
    }

    #[test]
    fn ungrouped_labels_are_universal() {
        assert_eq!(group_of(None), AlbumGroup::Universal);
        assert_eq!(group_of(Some("Unreleased 2018")), AlbumGroup::Universal);
    }

    #[test]
    fn filter_defaults_to_all_enabled() {
        let filter = AlbumFilter::default();
        assert!(filter.any_enabled());
        for group in known_groups() {
            assert!(filter.is_enabled(group));
        }
    }

    #[test]
    fn filter_toggle_and_bulk() {
        let mut filter = AlbumFilter::all_enabled();
        filter.set_enabled("Fighting Demons", false);
        assert!(!filter.allows(AlbumGroup::Named("Fighting Demons")));
        assert!(filter.allows(AlbumGroup::Named("Legends Never Die")));

        filter.set_all(false);
        assert!(!filter.any_enabled());
        // universal labels stay allowed even with everything off
        assert!(filter.allows(AlbumGroup::Universal));

        filter.set_all(true);
        assert!(filter.any_enabled());
    }

    #[test]
    fn filter_roundtrips_through_json() {
        let mut filter = AlbumFilter::all_enabled();
        filter.set_enabled("Posthumous", false);

        let json = serde_json::to_string(&filter).unwrap();
        let restored: AlbumFilter = serde_json::from_str(&json).unwrap();
        assert!(!restored.is_enabled("Posthumous"));
        assert!(restored.is_enabled("Outsiders"));
    }
}
