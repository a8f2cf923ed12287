//! Section rules.
//!
//! A section is one configured rule for a platform: node queries to hide,
//! a path redirect, or both. What kind of section it is gets derived from
//! which fields are present; nothing stores a kind flag.

use crate::hostname;

bitflags::bitflags! {
    /// Computed classification of a section.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SectionKind: u8 {
        /// Has at least one node query
        const HIDE = 1 << 0;
        /// Has both a current and a new path
        const REDIRECT = 1 << 1;
        /// Has a click target
        const CLICK = 1 << 2;
    }
}

/// One configured rule. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    id: String,
    name: String,
    platform: String,
    queries: Vec<String>,
    current_path: Option<String>,
    new_path: Option<String>,
    click_target: Option<String>,
}

impl Section {
    /// Create an inert section. Use the `with_*` methods to give it rules.
    pub fn new(id: impl Into<String>, name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            platform: platform.into(),
            queries: Vec::new(),
            current_path: None,
            new_path: None,
            click_target: None,
        }
    }

    pub fn with_queries<I, S>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queries = queries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_redirect(mut self, current_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        self.current_path = Some(current_path.into());
        self.new_path = Some(new_path.into());
        self
    }

    /// Keep a lone current or new path. Such a section is not a redirect
    /// section, but the value is preserved for display.
    pub fn with_paths(mut self, current_path: Option<String>, new_path: Option<String>) -> Self {
        self.current_path = current_path;
        self.new_path = new_path;
        self
    }

    pub fn with_click_target(mut self, click_target: impl Into<String>) -> Self {
        self.click_target = Some(click_target.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    pub fn new_path(&self) -> Option<&str> {
        self.new_path.as_deref()
    }

    /// The click target, if it is non-blank.
    pub fn click_target(&self) -> Option<&str> {
        self.click_target.as_deref().filter(|t| !t.trim().is_empty())
    }

    // =========================================================================
    // Classification
    // =========================================================================

    pub fn kind(&self) -> SectionKind {
        let mut kind = SectionKind::empty();
        if self.is_hide_section() {
            kind |= SectionKind::HIDE;
        }
        if self.is_redirect_section() {
            kind |= SectionKind::REDIRECT;
        }
        if self.has_click_action() {
            kind |= SectionKind::CLICK;
        }
        kind
    }

    #[inline]
    pub fn is_hide_section(&self) -> bool {
        !self.queries.is_empty()
    }

    #[inline]
    pub fn is_redirect_section(&self) -> bool {
        self.redirect_paths().is_some()
    }

    #[inline]
    pub fn has_click_action(&self) -> bool {
        self.click_target().is_some()
    }

    /// `(current_path, new_path)` when both are set and non-empty.
    pub fn redirect_paths(&self) -> Option<(&str, &str)> {
        match (self.current_path.as_deref(), self.new_path.as_deref()) {
            (Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => Some((from, to)),
            _ => None,
        }
    }

    // =========================================================================
    // Matching
    // =========================================================================

    /// Does this section apply on `hostname`? See [`hostname::applies_to`].
    pub fn applies_to(&self, hostname: &str) -> bool {
        hostname::applies_to(&self.platform, hostname)
    }

    /// Does `path` match this section's current path?
    ///
    /// Exact match, or match after dropping one trailing slash from each side.
    /// A bare root stays "/".
    pub fn matches_path(&self, path: &str) -> bool {
        let Some((current, _)) = self.redirect_paths() else {
            return false;
        };
        path == current || normalize_trailing_slash(path) == normalize_trailing_slash(current)
    }
}

#[inline]
fn normalize_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some("") => "/",
        Some(stripped) => stripped,
        None => path,
    }
}
