//! User enablement state.
//!
//! The extension as a whole and every section can be switched on and off.
//! A section without an entry counts as enabled; only an explicit `false`
//! disables it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::section::Section;

// =============================================================================
// Storage Contract
// =============================================================================

/// Settings as they sit in extension storage. Every key may be missing.
///
/// Also used for partial writes: `None` fields are left out of the stored
/// object and so leave the persisted value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredSettingsRepr")]
pub struct StoredSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_settings: Option<BTreeMap<String, bool>>,
}

/// Read-side shape. Older builds stored the section map as `sectionEnabled`;
/// it is only used when `sectionSettings` is absent.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSettingsRepr {
    #[serde(default)]
    extension_enabled: Option<bool>,
    #[serde(default)]
    section_settings: Option<BTreeMap<String, bool>>,
    #[serde(default)]
    section_enabled: Option<BTreeMap<String, bool>>,
}

impl From<StoredSettingsRepr> for StoredSettings {
    fn from(repr: StoredSettingsRepr) -> Self {
        Self {
            extension_enabled: repr.extension_enabled,
            section_settings: repr.section_settings.or(repr.section_enabled),
        }
    }
}

impl StoredSettings {
    /// Partial write of the global flag only.
    pub fn extension_only(enabled: bool) -> Self {
        Self {
            extension_enabled: Some(enabled),
            section_settings: None,
        }
    }

    /// Partial write of the section map only.
    pub fn sections_only(section_settings: BTreeMap<String, bool>) -> Self {
        Self {
            extension_enabled: None,
            section_settings: Some(section_settings),
        }
    }

    /// Overlay the keys present in `partial`.
    pub fn merge(&mut self, partial: &StoredSettings) {
        if let Some(enabled) = partial.extension_enabled {
            self.extension_enabled = Some(enabled);
        }
        if let Some(map) = &partial.section_settings {
            self.section_settings = Some(map.clone());
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    extension_enabled: bool,
    section_settings: BTreeMap<String, bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extension_enabled: true,
            section_settings: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from storage. The extension stays enabled unless stored as
    /// exactly `false`.
    pub fn from_stored(stored: StoredSettings) -> Self {
        Self {
            extension_enabled: stored.extension_enabled != Some(false),
            section_settings: stored.section_settings.unwrap_or_default(),
        }
    }

    /// Full storage object.
    pub fn to_stored(&self) -> StoredSettings {
        StoredSettings {
            extension_enabled: Some(self.extension_enabled),
            section_settings: Some(self.section_settings.clone()),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.extension_enabled
    }

    #[inline]
    pub fn is_section_enabled(&self, section_id: &str) -> bool {
        self.section_settings.get(section_id) != Some(&false)
    }

    pub fn section_settings(&self) -> &BTreeMap<String, bool> {
        &self.section_settings
    }

    /// Flip the global flag and return the new value.
    pub fn toggle_extension(&mut self) -> bool {
        self.extension_enabled = !self.extension_enabled;
        self.extension_enabled
    }

    /// Flip a section and return the new value. A missing entry counts as
    /// enabled before the flip.
    pub fn toggle_section(&mut self, section_id: &str) -> bool {
        let enabled = !self.is_section_enabled(section_id);
        self.section_settings.insert(section_id.to_string(), enabled);
        enabled
    }

    /// Set the global flag. Returns true if the value changed.
    pub fn set_extension_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.extension_enabled != enabled;
        self.extension_enabled = enabled;
        changed
    }

    /// Set a section's flag. Returns true if the effective value changed.
    pub fn set_section_enabled(&mut self, section_id: &str, enabled: bool) -> bool {
        let changed = self.is_section_enabled(section_id) != enabled;
        self.section_settings.insert(section_id.to_string(), enabled);
        changed
    }

    /// Add a `true` entry for every section id not seen before. Existing
    /// entries are never touched. Returns the number of ids added.
    pub fn merge_new_sections(&mut self, sections: &[Section]) -> usize {
        let mut added = 0;
        for section in sections {
            if !self.section_settings.contains_key(section.id()) {
                self.section_settings.insert(section.id().to_string(), true);
                added += 1;
            }
        }
        added
    }

    /// The enabled subset of `sections`, in config order.
    pub fn enabled_sections<'s>(&self, sections: &'s [Section]) -> Vec<&'s Section> {
        sections
            .iter()
            .filter(|section| self.is_section_enabled(section.id()))
            .collect()
    }
}
