//! PureFeed Core Library
//!
//! This crate provides the rule matching and reconciliation engine behind the
//! PureFeed content script. It hides configured page sections on social-media
//! sites and issues one-shot client-side redirects, driven by a declarative
//! per-platform section config and a user-togglable settings model.
//!
//! # Architecture
//!
//! The engine never touches the page directly. Everything host-specific (node
//! queries, inline styles, navigation, timers, storage) is reached through the
//! capability traits in [`host`] and [`store`], so the same engine runs inside
//! the WASM content script, the CLI and the unit tests.
//!
//! # Modules
//!
//! - `section`: Section rule values and their computed classification
//! - `catalog`: Lookup over the configured sections
//! - `hostname`: Platform alias tables and hostname matching
//! - `url`: Fast href slicing (host, path, origin, search, hash)
//! - `settings`: Global and per-section enablement state
//! - `registry`: Hidden element registry (the hiding engine)
//! - `redirect`: First-match redirect decisions
//! - `debounce`: Coalescing timer state for mutation bursts
//! - `watcher`: SPA navigation change detection
//! - `host`: Page capability traits (DOM, click, navigation, timers, observers)
//! - `store`: Config source and settings storage traits
//! - `controller`: The reconciliation controller
//! - `panel`: Control panel model behind the popup
//! - `types`: Shared type definitions

pub mod catalog;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod host;
pub mod hostname;
pub mod panel;
pub mod redirect;
pub mod registry;
pub mod section;
pub mod settings;
pub mod store;
pub mod types;
pub mod url;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use catalog::SectionCatalog;
pub use controller::{Activation, Controller};
pub use error::{ClickError, PanelError, QueryError, SourceError, StorageError};
pub use host::{ClickTrigger, Dom, Navigator, Observers, Page, Scheduler};
pub use hostname::applies_to;
pub use panel::{ControlPanel, PanelStatus, SectionRow, Toggled};
pub use redirect::decide;
pub use registry::ElementRegistry;
pub use section::{Section, SectionKind};
pub use settings::{Settings, StoredSettings};
pub use store::{ConfigSource, SettingsStore};
pub use types::{EngineOptions, Message, MutationBatch, NodeHandle, ObserverOptions, RedirectDecision};
