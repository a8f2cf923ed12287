//! Settings storage over a `chrome.storage`-shaped object.
//!
//! The object needs `get(keys)` and `set(items)`, both returning promises.

use async_trait::async_trait;
use js_sys::{Array, Object, Promise, JSON};
use pf_core::error::StorageError;
use pf_core::settings::StoredSettings;
use pf_core::store::SettingsStore;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use crate::page::{call_method, describe};

const KEYS: [&str; 3] = ["extensionEnabled", "sectionSettings", "sectionEnabled"];

pub struct JsSettingsStore {
    storage: Object,
}

impl JsSettingsStore {
    pub fn new(storage: Object) -> Self {
        Self { storage }
    }

    async fn call(&self, name: &str, arg: JsValue) -> Result<JsValue, String> {
        let returned = call_method(&self.storage, name, &[arg]).map_err(|e| describe(&e))?;
        JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| describe(&e))
    }
}

#[async_trait(?Send)]
impl SettingsStore for JsSettingsStore {
    async fn load(&self) -> Result<StoredSettings, StorageError> {
        let keys: Array = KEYS.iter().map(|key| JsValue::from_str(key)).collect();
        let items = self.call("get", keys.into()).await.map_err(StorageError::Load)?;
        if items.is_undefined() || items.is_null() {
            return Ok(StoredSettings::default());
        }

        let text = JSON::stringify(&items)
            .map_err(|e| StorageError::Load(describe(&e)))?
            .as_string()
            .unwrap_or_default();
        serde_json::from_str(&text).map_err(|e| StorageError::Load(e.to_string()))
    }

    async fn save_field(&self, partial: &StoredSettings) -> Result<(), StorageError> {
        let text = serde_json::to_string(partial).map_err(|e| StorageError::Save(e.to_string()))?;
        let items = JSON::parse(&text).map_err(|e| StorageError::Save(describe(&e)))?;
        self.call("set", items).await.map_err(StorageError::Save)?;
        Ok(())
    }
}
