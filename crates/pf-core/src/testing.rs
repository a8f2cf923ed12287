//! In-memory collaborators for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;

use crate::error::{ClickError, QueryError, SourceError, StorageError};
use crate::host::{ClickTrigger, Dom, Navigator, Observers, Scheduler};
use crate::section::Section;
use crate::settings::StoredSettings;
use crate::store::{ConfigSource, SettingsStore};
use crate::types::{NodeHandle, ObserverOptions};

pub const AD_QUERY: &str = "//div[@class='ad']";

// =============================================================================
// Page
// =============================================================================

#[derive(Debug)]
struct FakeNode {
    query: String,
    display: String,
    tag: Option<String>,
    attached: bool,
}

/// A page whose nodes are keyed by the one query that finds them.
#[derive(Debug, Default)]
pub struct FakePage {
    nodes: BTreeMap<NodeHandle, FakeNode>,
    next_handle: u64,
    failing_queries: HashSet<String>,
    clicks: Vec<(String, u32)>,
    fail_clicks: bool,
    href: String,
    redirects: Vec<String>,
    scheduled: Vec<u32>,
    observing: Option<ObserverOptions>,
}

impl FakePage {
    pub fn new(href: &str) -> Self {
        Self {
            href: href.to_string(),
            ..Self::default()
        }
    }

    pub fn add_node(&mut self, query: &str, display: &str) -> NodeHandle {
        self.next_handle += 1;
        let handle = NodeHandle(self.next_handle);
        self.nodes.insert(
            handle,
            FakeNode {
                query: query.to_string(),
                display: display.to_string(),
                tag: None,
                attached: true,
            },
        );
        handle
    }

    pub fn detach(&mut self, node: NodeHandle) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.attached = false;
        }
    }

    pub fn fail_query(&mut self, query: &str) {
        self.failing_queries.insert(query.to_string());
    }

    pub fn display_of(&self, node: NodeHandle) -> String {
        self.nodes[&node].display.clone()
    }

    pub fn tag_of(&self, node: NodeHandle) -> Option<String> {
        self.nodes[&node].tag.clone()
    }

    pub fn clicks(&self) -> Vec<(String, u32)> {
        self.clicks.clone()
    }

    pub fn fail_clicks(&mut self, fail: bool) {
        self.fail_clicks = fail;
    }

    /// Simulate an in-page navigation that did not go through `replace`.
    pub fn set_href(&mut self, href: &str) {
        self.href = href.to_string();
    }

    pub fn redirects(&self) -> &[String] {
        &self.redirects
    }

    pub fn scheduled(&self) -> &[u32] {
        &self.scheduled
    }

    pub fn observing(&self) -> Option<ObserverOptions> {
        self.observing
    }
}

impl Dom for FakePage {
    fn evaluate(&mut self, query: &str) -> Result<Vec<NodeHandle>, QueryError> {
        if self.failing_queries.contains(query) {
            return Err(QueryError::new(query, "invalid expression"));
        }
        Ok(self
            .nodes
            .iter()
            .filter(|(_, n)| n.attached && n.query == query)
            .map(|(handle, _)| *handle)
            .collect())
    }

    fn display(&self, node: NodeHandle) -> Option<String> {
        self.nodes
            .get(&node)
            .filter(|n| n.attached)
            .map(|n| n.display.clone())
    }

    fn set_display(&mut self, node: NodeHandle, value: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.display = value.to_string();
        }
    }

    fn tag_hidden(&mut self, node: NodeHandle, section_id: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.tag = Some(section_id.to_string());
        }
    }

    fn untag_hidden(&mut self, node: NodeHandle) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.tag = None;
        }
    }
}

impl ClickTrigger for FakePage {
    fn click(&mut self, query: &str, delay_ms: u32) -> Result<(), ClickError> {
        if self.fail_clicks {
            return Err(ClickError::new(query, "target not visible"));
        }
        self.clicks.push((query.to_string(), delay_ms));
        Ok(())
    }
}

impl Navigator for FakePage {
    fn current_href(&self) -> String {
        self.href.clone()
    }

    fn replace(&mut self, url: &str) {
        self.redirects.push(url.to_string());
        self.href = url.to_string();
    }
}

impl Scheduler for FakePage {
    fn schedule(&mut self, delay_ms: u32) {
        self.scheduled.push(delay_ms);
    }
}

impl Observers for FakePage {
    fn attach(&mut self, options: ObserverOptions) {
        self.observing = Some(options);
    }

    fn detach(&mut self) {
        self.observing = None;
    }
}

// =============================================================================
// Storage
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<StoredSettings>,
    fail_loads: Cell<bool>,
    fail_saves: Cell<bool>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn with(json: &str) -> Self {
        Self {
            state: RefCell::new(serde_json::from_str(json).unwrap()),
            ..Self::default()
        }
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.set(fail);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    pub fn snapshot(&self) -> StoredSettings {
        self.state.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

#[async_trait(?Send)]
impl SettingsStore for MemoryStore {
    async fn load(&self) -> Result<StoredSettings, StorageError> {
        if self.fail_loads.get() {
            return Err(StorageError::Load("storage offline".to_string()));
        }
        Ok(self.state.borrow().clone())
    }

    async fn save_field(&self, partial: &StoredSettings) -> Result<(), StorageError> {
        if self.fail_saves.get() {
            return Err(StorageError::Save("quota exceeded".to_string()));
        }
        self.state.borrow_mut().merge(partial);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

// =============================================================================
// Config
// =============================================================================

pub struct StaticConfig {
    result: Result<Vec<Section>, SourceError>,
}

impl StaticConfig {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { result: Ok(sections) }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(SourceError::Unavailable("config.json: 404".to_string())),
        }
    }
}

#[async_trait(?Send)]
impl ConfigSource for StaticConfig {
    async fn load_sections(&self) -> Result<Vec<Section>, SourceError> {
        self.result.clone()
    }
}
