//! Control panel model.
//!
//! Everything the popup needs minus the widgets: the settings and sections it
//! displays, the toggles it offers, and the message each toggle broadcasts to
//! the content script.

use std::fmt;

use crate::error::StorageError;
use crate::section::Section;
use crate::settings::{Settings, StoredSettings};
use crate::store::{load_and_merge, load_sections_or_empty, ConfigSource, SettingsStore};
use crate::types::Message;

/// Result of a successful toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    /// New state of the toggled switch
    pub enabled: bool,
    /// Message to broadcast to the active tab
    pub message: Message,
}

/// Summary line under the toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStatus {
    Disabled,
    Enabled {
        hidden_sections: usize,
        active_redirects: usize,
    },
}

impl PanelStatus {
    pub fn is_enabled(&self) -> bool {
        matches!(self, PanelStatus::Enabled { .. })
    }
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PanelStatus::Disabled => f.write_str("Extension disabled"),
            PanelStatus::Enabled {
                hidden_sections,
                active_redirects,
            } => {
                f.write_str("Extension enabled")?;
                let mut parts = Vec::new();
                if hidden_sections > 0 {
                    parts.push(format!("{hidden_sections} sections hidden"));
                }
                if active_redirects > 0 {
                    parts.push(format!("{active_redirects} redirects active"));
                }
                if !parts.is_empty() {
                    write!(f, " - {}", parts.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// One toggle row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub enabled: bool,
    pub is_redirect: bool,
}

pub struct ControlPanel<S> {
    store: S,
    sections: Vec<Section>,
    settings: Settings,
}

impl<S: SettingsStore> ControlPanel<S> {
    /// Load sections and settings the same way the content script does.
    pub async fn load<C>(store: S, config: &C) -> Self
    where
        C: ConfigSource + ?Sized,
    {
        let sections = load_sections_or_empty(config).await;
        let settings = load_and_merge(&store, &sections).await;
        Self {
            store,
            sections,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Flip the main switch and persist it.
    pub async fn toggle_extension(&mut self) -> Result<Toggled, StorageError> {
        let enabled = self.settings.toggle_extension();
        self.store
            .save_field(&StoredSettings::extension_only(enabled))
            .await?;
        Ok(Toggled {
            enabled,
            message: Message::ToggleExtension { enabled },
        })
    }

    /// Flip one section and persist the section map.
    ///
    /// Returns `Ok(None)` while the extension is disabled; section switches
    /// are inert then. Enabling a redirect section asks the content script to
    /// check redirects right away.
    pub async fn toggle_section(&mut self, section_id: &str) -> Result<Option<Toggled>, StorageError> {
        if !self.settings.is_enabled() {
            log::debug!("Extension disabled, ignoring toggle of '{section_id}'");
            return Ok(None);
        }

        let enabled = self.settings.toggle_section(section_id);
        let partial = StoredSettings::sections_only(self.settings.section_settings().clone());
        self.store.save_field(&partial).await?;

        let is_redirect = self
            .sections
            .iter()
            .any(|section| section.id() == section_id && section.is_redirect_section());

        let message = if is_redirect && enabled {
            Message::CheckRedirect {
                section_id: section_id.to_string(),
            }
        } else {
            Message::ToggleSection {
                section_id: section_id.to_string(),
                enabled,
            }
        };
        Ok(Some(Toggled { enabled, message }))
    }

    pub fn status(&self) -> PanelStatus {
        if !self.settings.is_enabled() {
            return PanelStatus::Disabled;
        }
        let enabled = self.settings.enabled_sections(&self.sections);
        PanelStatus::Enabled {
            hidden_sections: enabled.iter().filter(|s| s.is_hide_section()).count(),
            active_redirects: enabled.iter().filter(|s| s.is_redirect_section()).count(),
        }
    }

    pub fn rows(&self) -> Vec<SectionRow<'_>> {
        self.sections
            .iter()
            .map(|section| SectionRow {
                id: section.id(),
                name: section.name(),
                enabled: self.settings.is_section_enabled(section.id()),
                is_redirect: section.is_redirect_section(),
            })
            .collect()
    }
}
