//! SPA navigation detection.
//!
//! Hosts call [`UrlWatcher::check`] after every `pushState`, `replaceState`
//! and `popstate`. Only real href changes are reported.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlWatcher {
    current: String,
}

impl UrlWatcher {
    pub fn new(href: impl Into<String>) -> Self {
        Self { current: href.into() }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Record `href`. Returns the previous href if it changed.
    pub fn check(&mut self, href: &str) -> Option<String> {
        if self.current == href {
            return None;
        }
        Some(std::mem::replace(&mut self.current, href.to_string()))
    }
}
