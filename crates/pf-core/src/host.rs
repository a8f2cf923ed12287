//! Page capabilities the engine calls into.
//!
//! Each trait is one narrow collaborator. The WASM bindings implement them
//! over JS callbacks; tests implement them over an in-memory page.

use crate::error::{ClickError, QueryError};
use crate::types::{NodeHandle, ObserverOptions};

/// Display value the engine writes to hide a node.
pub const HIDDEN_DISPLAY: &str = "none";

/// Attribute tagging a hidden node with its owning section id.
pub const HIDDEN_ATTRIBUTE: &str = "data-smh-hidden";

/// Node queries and inline style access.
pub trait Dom {
    /// Evaluate a query expression against the live document.
    ///
    /// Must be ordered, repeatable and side-effect free. The same node must
    /// come back with the same handle on every call.
    fn evaluate(&mut self, query: &str) -> Result<Vec<NodeHandle>, QueryError>;

    /// Inline display value of `node`, or `None` if the node is gone.
    fn display(&self, node: NodeHandle) -> Option<String>;

    fn set_display(&mut self, node: NodeHandle, value: &str);

    /// Tag `node` as hidden by `section_id` (see [`HIDDEN_ATTRIBUTE`]).
    fn tag_hidden(&mut self, node: NodeHandle, section_id: &str);

    fn untag_hidden(&mut self, node: NodeHandle);
}

/// Delayed, best-effort click on the first node matching a query.
pub trait ClickTrigger {
    fn click(&mut self, query: &str, delay_ms: u32) -> Result<(), ClickError>;
}

/// Current location and navigation.
pub trait Navigator {
    fn current_href(&self) -> String;

    /// Replace the current history entry with `url`.
    fn replace(&mut self, url: &str);
}

/// One-shot timers. When a scheduled timer fires the host calls
/// [`Controller::on_debounce_timer`](crate::controller::Controller::on_debounce_timer).
pub trait Scheduler {
    fn schedule(&mut self, delay_ms: u32);
}

/// Wiring of page triggers: the mutation observer, navigation hooks and the
/// message listener.
pub trait Observers {
    fn attach(&mut self, options: ObserverOptions);

    fn detach(&mut self);
}

/// Everything the controller needs from the page.
pub trait Page: Dom + ClickTrigger + Navigator + Scheduler + Observers {}

impl<T> Page for T where T: Dom + ClickTrigger + Navigator + Scheduler + Observers {}
