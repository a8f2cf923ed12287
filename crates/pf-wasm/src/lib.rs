//! WebAssembly bindings for PureFeed

mod page;
mod queue;
mod storage;

use std::rc::Rc;

use js_sys::{Array, Object, Promise, Reflect, JSON};
use pf_config::compile_config;
use pf_core::{Activation, Controller, EngineOptions, Message, MutationBatch, SectionCatalog};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

pub use page::JsPage;
pub use storage::JsSettingsStore;

use queue::{Event, EventQueue};

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// =============================================================================
// Content Script
// =============================================================================

#[wasm_bindgen]
pub struct ContentScript {
    queue: Rc<EventQueue<JsPage, JsSettingsStore>>,
}

#[wasm_bindgen]
impl ContentScript {
    /// `host` carries the page callbacks and `storage` the settings area.
    #[wasm_bindgen(constructor)]
    pub fn new(host: Object, storage: Object) -> ContentScript {
        let controller = Controller::new(
            JsPage::new(host),
            JsSettingsStore::new(storage),
            EngineOptions::default(),
        );
        ContentScript {
            queue: Rc::new(EventQueue::new(controller)),
        }
    }

    fn dispatch(&self, event: Event) {
        self.queue.push(event);
        spawn_local(self.queue.clone().drain());
    }

    /// Load the config and settings and run the first reconciliation.
    ///
    /// Resolves to `true` if this page has applicable sections, and to
    /// `false` if the script is destroyed before startup runs.
    pub fn start(&self, config_json: String) -> Promise {
        let done = self.queue.push_start(config_json);
        spawn_local(self.queue.clone().drain());
        future_to_promise(async move {
            let activation = done.await.unwrap_or(Activation::Inert);
            Ok(JsValue::from(activation == Activation::Active))
        })
    }

    /// Mutation observer callback, with the number of added nodes.
    pub fn on_mutations(&self, added_nodes: u32) {
        self.dispatch(Event::Mutations(MutationBatch::added(added_nodes as usize)));
    }

    pub fn on_debounce_timer(&self) {
        self.dispatch(Event::DebounceTimer);
    }

    pub fn on_url_change(&self, href: String, previous: String) {
        self.dispatch(Event::UrlChange { href, previous });
    }

    /// Re-read `href()` after a history event.
    pub fn poll_url(&self) {
        self.dispatch(Event::PollUrl);
    }

    /// Runtime message from the control panel.
    pub fn on_message(&self, message: JsValue) -> Result<(), JsValue> {
        let message = parse_message(&message)?;
        self.dispatch(Event::Message(message));
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.queue.is_active()
    }

    pub fn hidden_count(&self) -> u32 {
        self.queue.hidden_count() as u32
    }

    /// Disconnect and restore every hidden node.
    pub fn destroy(&self) {
        self.dispatch(Event::Destroy);
    }
}

fn parse_message(value: &JsValue) -> Result<Message, JsValue> {
    let text = JSON::stringify(value)?
        .as_string()
        .ok_or_else(|| JsValue::from_str("Message is not serializable"))?;
    serde_json::from_str(&text).map_err(|e| JsValue::from_str(&format!("Unknown message: {e}")))
}

// =============================================================================
// Helpers
// =============================================================================

/// Compile a config document and report what it contains.
#[wasm_bindgen]
pub fn parse_config(config_json: &str) -> Result<JsValue, JsValue> {
    let compiled = compile_config(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let stats = compiled.stats;
    let catalog = SectionCatalog::new(compiled.sections);

    let result = Object::new();
    let _ = Reflect::set(&result, &"before".into(), &JsValue::from(stats.before as u32));
    let _ = Reflect::set(&result, &"after".into(), &JsValue::from(stats.after as u32));
    let _ = Reflect::set(&result, &"deduped".into(), &JsValue::from(stats.deduped as u32));
    let _ = Reflect::set(&result, &"invalid".into(), &JsValue::from(stats.invalid as u32));

    let platforms: Array = catalog.platforms().into_iter().map(JsValue::from_str).collect();
    let _ = Reflect::set(&result, &"platforms".into(), &platforms);

    let sections = Array::new();
    for section in catalog.sections() {
        let entry = Object::new();
        let _ = Reflect::set(&entry, &"id".into(), &JsValue::from_str(section.id()));
        let _ = Reflect::set(&entry, &"name".into(), &JsValue::from_str(section.name()));
        let _ = Reflect::set(&entry, &"platform".into(), &JsValue::from_str(section.platform()));
        let _ = Reflect::set(&entry, &"hide".into(), &JsValue::from(section.is_hide_section()));
        let _ = Reflect::set(&entry, &"redirect".into(), &JsValue::from(section.is_redirect_section()));
        let _ = Reflect::set(&entry, &"click".into(), &JsValue::from(section.has_click_action()));
        sections.push(&entry);
    }
    let _ = Reflect::set(&result, &"sections".into(), &sections);

    Ok(result.into())
}

#[wasm_bindgen]
pub fn applies_to(platform: &str, hostname: &str) -> bool {
    pf_core::applies_to(platform, hostname)
}
