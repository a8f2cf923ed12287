//! Config source and settings storage.

use async_trait::async_trait;

use crate::error::{SourceError, StorageError};
use crate::section::Section;
use crate::settings::{Settings, StoredSettings};

/// Supplies the configured sections.
#[async_trait(?Send)]
pub trait ConfigSource {
    async fn load_sections(&self) -> Result<Vec<Section>, SourceError>;
}

/// Persistent key-value storage for [`Settings`].
#[async_trait(?Send)]
pub trait SettingsStore {
    async fn load(&self) -> Result<StoredSettings, StorageError>;

    /// Write only the keys present in `partial`.
    async fn save_field(&self, partial: &StoredSettings) -> Result<(), StorageError>;

    /// Write the full settings object.
    async fn save(&self, settings: &StoredSettings) -> Result<(), StorageError> {
        self.save_field(settings).await
    }
}

/// Load sections, degrading to none when the source fails.
pub async fn load_sections_or_empty<C>(source: &C) -> Vec<Section>
where
    C: ConfigSource + ?Sized,
{
    match source.load_sections().await {
        Ok(sections) => sections,
        Err(e) => {
            log::warn!("{e}; continuing with no sections");
            Vec::new()
        }
    }
}

/// Load settings, merge in new sections and write the result back.
///
/// Neither a failed load nor a failed save is fatal: a failed load starts
/// from defaults and a failed save keeps the merged in-memory settings.
pub async fn load_and_merge<S>(store: &S, sections: &[Section]) -> Settings
where
    S: SettingsStore + ?Sized,
{
    let mut settings = match store.load().await {
        Ok(stored) => Settings::from_stored(stored),
        Err(e) => {
            log::warn!("{e}; using default settings");
            Settings::new()
        }
    };

    let added = settings.merge_new_sections(sections);
    if added > 0 {
        log::debug!("Merged {added} new section(s) into settings");
    }

    if let Err(e) = store.save(&settings.to_stored()).await {
        log::error!("{e}");
    }

    settings
}
