//! Page capabilities backed by a JS callback object.
//!
//! The content script passes one object whose methods do the actual DOM work:
//!
//! | method               | returns                       |
//! |----------------------|-------------------------------|
//! | `evaluate(query)`    | array of node ids (numbers)   |
//! | `getDisplay(id)`     | inline display, or `null`     |
//! | `setDisplay(id, v)`  |                               |
//! | `tag(id, sectionId)` |                               |
//! | `untag(id)`          |                               |
//! | `click(query, ms)`   |                               |
//! | `href()`             | current `location.href`       |
//! | `replace(url)`       |                               |
//! | `schedule(ms)`       |                               |
//! | `observe(options)`   |                               |
//! | `disconnect()`       |                               |

use js_sys::{Array, Function, Object, Reflect};
use pf_core::error::{ClickError, QueryError};
use pf_core::host::{ClickTrigger, Dom, Navigator, Observers, Scheduler};
use pf_core::types::{NodeHandle, ObserverOptions};
use wasm_bindgen::{JsCast, JsValue};

pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

pub(crate) fn call_method(target: &Object, name: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let method = Reflect::get(target, &JsValue::from_str(name))?;
    let method: Function = method
        .dyn_into()
        .map_err(|_| JsValue::from_str(&format!("{name} is not a function")))?;
    method.apply(target, &args.iter().collect::<Array>())
}

pub struct JsPage {
    host: Object,
}

impl JsPage {
    pub fn new(host: Object) -> Self {
        Self { host }
    }

    fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
        call_method(&self.host, name, args)
    }

    /// For callbacks whose failure the engine cannot act on.
    fn call_logged(&self, name: &str, args: &[JsValue]) -> Option<JsValue> {
        match self.call(name, args) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("host.{name} failed: {}", describe(&e));
                None
            }
        }
    }
}

fn node_arg(node: NodeHandle) -> JsValue {
    JsValue::from_f64(node.0 as f64)
}

impl Dom for JsPage {
    fn evaluate(&mut self, query: &str) -> Result<Vec<NodeHandle>, QueryError> {
        let result = self
            .call("evaluate", &[JsValue::from_str(query)])
            .map_err(|e| QueryError::new(query, describe(&e)))?;

        if !Array::is_array(&result) {
            return Err(QueryError::new(query, "evaluate did not return an array"));
        }
        Ok(Array::from(&result)
            .iter()
            .filter_map(|id| id.as_f64())
            .map(|id| NodeHandle(id as u64))
            .collect())
    }

    fn display(&self, node: NodeHandle) -> Option<String> {
        self.call_logged("getDisplay", &[node_arg(node)])
            .and_then(|value| value.as_string())
    }

    fn set_display(&mut self, node: NodeHandle, value: &str) {
        self.call_logged("setDisplay", &[node_arg(node), JsValue::from_str(value)]);
    }

    fn tag_hidden(&mut self, node: NodeHandle, section_id: &str) {
        self.call_logged("tag", &[node_arg(node), JsValue::from_str(section_id)]);
    }

    fn untag_hidden(&mut self, node: NodeHandle) {
        self.call_logged("untag", &[node_arg(node)]);
    }
}

impl ClickTrigger for JsPage {
    fn click(&mut self, query: &str, delay_ms: u32) -> Result<(), ClickError> {
        self.call("click", &[JsValue::from_str(query), JsValue::from(delay_ms)])
            .map(|_| ())
            .map_err(|e| ClickError::new(query, describe(&e)))
    }
}

impl Navigator for JsPage {
    fn current_href(&self) -> String {
        self.call_logged("href", &[])
            .and_then(|value| value.as_string())
            .unwrap_or_default()
    }

    fn replace(&mut self, url: &str) {
        self.call_logged("replace", &[JsValue::from_str(url)]);
    }
}

impl Scheduler for JsPage {
    fn schedule(&mut self, delay_ms: u32) {
        self.call_logged("schedule", &[JsValue::from(delay_ms)]);
    }
}

impl Observers for JsPage {
    fn attach(&mut self, options: ObserverOptions) {
        let init = Object::new();
        let flags = [
            ("childList", ObserverOptions::CHILD_LIST),
            ("subtree", ObserverOptions::SUBTREE),
            ("attributes", ObserverOptions::ATTRIBUTES),
            ("characterData", ObserverOptions::CHARACTER_DATA),
        ];
        for (key, flag) in flags {
            let _ = Reflect::set(&init, &key.into(), &JsValue::from(options.contains(flag)));
        }
        self.call_logged("observe", &[init.into()]);
    }

    fn detach(&mut self) {
        self.call_logged("disconnect", &[]);
    }
}
