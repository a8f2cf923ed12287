//! File-backed settings storage and config source.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pf_config::compile_config;
use pf_core::error::{SourceError, StorageError};
use pf_core::section::Section;
use pf_core::settings::StoredSettings;
use pf_core::store::{ConfigSource, SettingsStore};

/// Settings kept as a JSON object in one file. A missing file reads as empty.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait(?Send)]
impl SettingsStore for JsonFileStore {
    async fn load(&self) -> Result<StoredSettings, StorageError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoredSettings::default()),
            Err(e) => return Err(StorageError::Load(format!("{}: {e}", self.path.display()))),
        };
        serde_json::from_str(&text).map_err(|e| StorageError::Load(format!("{}: {e}", self.path.display())))
    }

    async fn save_field(&self, partial: &StoredSettings) -> Result<(), StorageError> {
        let mut stored = self
            .load()
            .await
            .map_err(|e| StorageError::Save(e.to_string()))?;
        stored.merge(partial);

        let text = serde_json::to_string_pretty(&stored).map_err(|e| StorageError::Save(e.to_string()))?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| StorageError::Save(format!("{}: {e}", self.path.display())))
    }
}

/// Config document read from disk on every load.
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait(?Send)]
impl ConfigSource for FileConfigSource {
    async fn load_sections(&self) -> Result<Vec<Section>, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", self.path.display())))?;
        Ok(compile_config(&text)?.sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pf-cli-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let store = JsonFileStore::new(temp_path("missing.json"));
        assert_eq!(store.load().await, Ok(StoredSettings::default()));
    }

    #[tokio::test]
    async fn test_partial_saves_merge() {
        let path = temp_path("merge.json");
        let _ = std::fs::remove_file(&path);
        let store = JsonFileStore::new(&path);

        store.save_field(&StoredSettings::extension_only(false)).await.unwrap();
        let sections = BTreeMap::from([("ads".to_string(), false)]);
        store.save_field(&StoredSettings::sections_only(sections.clone())).await.unwrap();

        let stored = store.load().await.unwrap();
        assert_eq!(stored.extension_enabled, Some(false));
        assert_eq!(stored.section_settings, Some(sections));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_legacy_key_alongside_current_key() {
        let path = temp_path("legacy.json");
        std::fs::write(
            &path,
            r#"{"extensionEnabled":false,"sectionSettings":{"ads":false},"sectionEnabled":{"feed":false}}"#,
        )
        .unwrap();
        let store = JsonFileStore::new(&path);

        let stored = store.load().await.unwrap();
        assert_eq!(stored.extension_enabled, Some(false));
        assert_eq!(stored.section_settings, Some(BTreeMap::from([("ads".to_string(), false)])));

        // Saving rewrites the file without the legacy key
        store.save_field(&StoredSettings::extension_only(true)).await.unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("sectionEnabled"));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_load() {
        let path = temp_path("corrupt.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(&path);

        assert!(matches!(store.load().await, Err(StorageError::Load(_))));
        assert!(matches!(
            store.save_field(&StoredSettings::extension_only(true)).await,
            Err(StorageError::Save(_))
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_file_config_source() {
        let path = temp_path("config.json");
        std::fs::write(&path, r#"{"sections":[{"id":"ads","name":"Ads","platform":"reddit"}]}"#).unwrap();

        let sections = FileConfigSource::new(&path).load_sections().await.unwrap();
        assert_eq!(sections.len(), 1);

        let missing = FileConfigSource::new(temp_path("nope.json")).load_sections().await;
        assert!(matches!(missing, Err(SourceError::Unavailable(_))));

        let _ = std::fs::remove_file(&path);
    }
}
