//! Hidden element registry (the hiding engine).
//!
//! Tracks every node this engine has hidden, which section hid it, and the
//! inline display value to put back. Records live in an arena indexed by
//! insertion slot, with a side table from node handle to slot, so restores
//! happen in the order nodes were hidden and teardown is a plain clear.
//!
//! Hiding is best-effort against a page we don't control: failed queries and
//! vanished nodes are skipped, never raised.

use std::collections::{BTreeMap, HashMap};

use crate::host::{ClickTrigger, Dom, HIDDEN_DISPLAY};
use crate::section::Section;
use crate::types::NodeHandle;

/// Restore metadata for one hidden node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenElement {
    pub node: NodeHandle,
    pub section_id: String,
    pub original_display: String,
}

impl HiddenElement {
    fn hide(&self, dom: &mut impl Dom) {
        dom.set_display(self.node, HIDDEN_DISPLAY);
        dom.tag_hidden(self.node, &self.section_id);
    }

    fn show(&self, dom: &mut impl Dom) {
        dom.set_display(self.node, &self.original_display);
        dom.untag_hidden(self.node);
    }
}

#[derive(Debug, Default)]
pub struct ElementRegistry {
    records: BTreeMap<u64, HiddenElement>,
    slots: HashMap<NodeHandle, u64>,
    next_slot: u64,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes currently hidden.
    #[inline]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_hidden(&self, node: NodeHandle) -> bool {
        self.slots.contains_key(&node)
    }

    /// Number of nodes currently hidden by `section_id`.
    pub fn count_for(&self, section_id: &str) -> usize {
        self.records
            .values()
            .filter(|record| record.section_id == section_id)
            .count()
    }

    pub fn get(&self, node: NodeHandle) -> Option<&HiddenElement> {
        self.slots.get(&node).and_then(|slot| self.records.get(slot))
    }

    // =========================================================================
    // Hiding
    // =========================================================================

    /// Hide every currently visible match of every hiding section, in order.
    /// Returns the number of nodes newly hidden.
    pub fn apply_hiding<'s, I, H>(&mut self, sections: I, host: &mut H, click_delay_ms: u32) -> usize
    where
        I: IntoIterator<Item = &'s Section>,
        H: Dom + ClickTrigger,
    {
        let mut hidden = 0;
        for section in sections {
            hidden += self.hide_section(section, host, click_delay_ms);
        }
        hidden
    }

    /// Hide the matches of one section. Returns the number newly hidden.
    ///
    /// Nodes already registered are skipped so their restore value is never
    /// re-captured. Nodes already at display "none" are skipped because their
    /// restore value would be wrong. If anything was newly hidden and the
    /// section has a click target, the click is scheduled.
    pub fn hide_section<H>(&mut self, section: &Section, host: &mut H, click_delay_ms: u32) -> usize
    where
        H: Dom + ClickTrigger,
    {
        if !section.is_hide_section() {
            return 0;
        }

        let mut hidden = 0;
        for query in section.queries() {
            let nodes = match host.evaluate(query) {
                Ok(nodes) => nodes,
                Err(e) => {
                    log::warn!("Section '{}': {e}", section.id());
                    continue;
                }
            };

            for node in nodes {
                if self.is_hidden(node) {
                    continue;
                }
                let Some(display) = host.display(node) else {
                    continue;
                };
                if display.trim() == HIDDEN_DISPLAY {
                    continue;
                }

                let record = HiddenElement {
                    node,
                    section_id: section.id().to_string(),
                    original_display: display,
                };
                record.hide(host);
                self.insert(record);
                hidden += 1;
            }
        }

        if hidden > 0 {
            log::debug!("Section '{}': hid {hidden} node(s)", section.id());
            if let Some(target) = section.click_target() {
                if let Err(e) = host.click(target, click_delay_ms) {
                    log::warn!("Section '{}': {e}", section.id());
                }
            }
        }

        hidden
    }

    fn insert(&mut self, record: HiddenElement) {
        let slot = self.next_slot;
        self.next_slot += 1;
        self.slots.insert(record.node, slot);
        self.records.insert(slot, record);
    }

    // =========================================================================
    // Showing
    // =========================================================================

    /// Restore every node hidden by `section_id`. Returns how many.
    pub fn show_section<D: Dom>(&mut self, section_id: &str, dom: &mut D) -> usize {
        let slots: Vec<u64> = self
            .records
            .iter()
            .filter(|(_, record)| record.section_id == section_id)
            .map(|(slot, _)| *slot)
            .collect();

        for slot in &slots {
            if let Some(record) = self.records.remove(slot) {
                record.show(dom);
                self.slots.remove(&record.node);
            }
        }

        if !slots.is_empty() {
            log::debug!("Section '{section_id}': restored {} node(s)", slots.len());
        }
        slots.len()
    }

    /// Restore every hidden node and clear the registry. Returns how many.
    pub fn show_all<D: Dom>(&mut self, dom: &mut D) -> usize {
        let records = std::mem::take(&mut self.records);
        self.slots.clear();

        for record in records.values() {
            record.show(dom);
        }
        records.len()
    }
}
