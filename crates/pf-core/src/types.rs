//! Core type definitions for PureFeed
//!
//! These types cross the boundary between the engine and its host: node
//! handles issued by the query evaluator, messages from the control panel,
//! observer settings and redirect results.

use serde::{Deserialize, Serialize};

// =============================================================================
// Node Handles
// =============================================================================

/// Opaque, stable identity of a live page node.
///
/// Handles are issued by the [`Dom`](crate::host::Dom) collaborator. Two
/// structurally identical nodes always get different handles, and the same
/// node keeps its handle for as long as it is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

impl From<u64> for NodeHandle {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// =============================================================================
// Redirect Decision
// =============================================================================

/// Result of a redirect evaluation. Computed fresh on every trigger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RedirectDecision {
    /// Whether the page should navigate away
    pub should_redirect: bool,
    /// Absolute target URL when `should_redirect` is set
    pub target_url: Option<String>,
    /// Section that produced the decision
    pub section_id: Option<String>,
}

impl RedirectDecision {
    /// A decision that leaves the page where it is.
    pub fn stay() -> Self {
        Self::default()
    }

    /// A decision to navigate to `target_url` on behalf of `section_id`.
    pub fn redirect_to(target_url: String, section_id: &str) -> Self {
        Self {
            should_redirect: true,
            target_url: Some(target_url),
            section_id: Some(section_id.to_string()),
        }
    }
}

// =============================================================================
// Messages
// =============================================================================

/// Message sent from the control panel to the content script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    /// Turn the whole extension on or off
    ToggleExtension { enabled: bool },
    /// Turn a single section on or off
    #[serde(rename_all = "camelCase")]
    ToggleSection { section_id: String, enabled: bool },
    /// Force-enable a redirect section and evaluate redirects right away
    #[serde(rename_all = "camelCase")]
    CheckRedirect { section_id: String },
}

// =============================================================================
// Observer Options
// =============================================================================

bitflags::bitflags! {
    /// What the mutation observer watches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObserverOptions: u8 {
        /// Additions and removals of child nodes
        const CHILD_LIST = 1 << 0;
        /// The whole subtree, not only direct children
        const SUBTREE = 1 << 1;
        /// Attribute changes
        const ATTRIBUTES = 1 << 2;
        /// Text content changes
        const CHARACTER_DATA = 1 << 3;
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self::CHILD_LIST | Self::SUBTREE
    }
}

// =============================================================================
// Mutation Batches
// =============================================================================

/// Summary of one mutation observer callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationBatch {
    /// Number of `childList` records in the batch
    pub child_list_records: usize,
    /// Total nodes added across those records
    pub added_nodes: usize,
}

impl MutationBatch {
    /// A batch with a single `childList` record adding `count` nodes.
    pub fn added(count: usize) -> Self {
        Self {
            child_list_records: 1,
            added_nodes: count,
        }
    }

    /// Only batches that add nodes can reveal new content to hide.
    #[inline]
    pub fn should_reapply(&self) -> bool {
        self.child_list_records > 0 && self.added_nodes > 0
    }
}

// =============================================================================
// Engine Options
// =============================================================================

/// Timing and observer settings for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Delay used to coalesce bursts of mutations
    pub debounce_delay_ms: u32,
    /// Delay before a click target is clicked, to let layout settle
    pub click_delay_ms: u32,
    /// Delay before re-reading the href after a history event
    pub url_check_delay_ms: u32,
    /// Mutation observer settings
    pub observer: ObserverOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            debounce_delay_ms: 100,
            click_delay_ms: 100,
            url_check_delay_ms: 100,
            observer: ObserverOptions::default(),
        }
    }
}
