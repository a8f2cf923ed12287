//! Reconciliation controller.
//!
//! One controller per page context. It owns the sections, the settings and
//! the hidden element registry, and reacts to five kinds of trigger:
//!
//! 1. startup ([`Controller::start`])
//! 2. DOM mutations ([`Controller::on_mutations`], debounced)
//! 3. SPA navigation ([`Controller::on_url_change`], [`Controller::poll_url`])
//! 4. control panel messages and toggles ([`Controller::on_message`])
//! 5. teardown ([`Controller::teardown`])
//!
//! Nothing here returns an error for an absent match or an empty config.
//! Collaborator failures are logged; only the explicit toggle operations
//! hand a storage failure back to their caller.

use crate::debounce::Debouncer;
use crate::error::StorageError;
use crate::host::Page;
use crate::redirect;
use crate::registry::ElementRegistry;
use crate::section::Section;
use crate::settings::{Settings, StoredSettings};
use crate::store::{load_and_merge, load_sections_or_empty, ConfigSource, SettingsStore};
use crate::types::{EngineOptions, Message, MutationBatch};
use crate::url::Location;
use crate::watcher::UrlWatcher;

/// Outcome of startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// No configured section applies to this host; nothing was wired up.
    Inert,
    /// Triggers are wired and the initial reconciliation ran.
    Active,
}

pub struct Controller<P, S> {
    page: P,
    store: S,
    options: EngineOptions,
    sections: Vec<Section>,
    settings: Settings,
    registry: ElementRegistry,
    debouncer: Debouncer,
    watcher: UrlWatcher,
    initialized: bool,
    active: bool,
}

impl<P, S> Controller<P, S>
where
    P: Page,
    S: SettingsStore,
{
    pub fn new(page: P, store: S, options: EngineOptions) -> Self {
        Self {
            page,
            store,
            options,
            sections: Vec::new(),
            settings: Settings::new(),
            registry: ElementRegistry::new(),
            debouncer: Debouncer::new(options.debounce_delay_ms),
            watcher: UrlWatcher::default(),
            initialized: false,
            active: false,
        }
    }

    // =========================================================================
    // Startup
    // =========================================================================

    /// Load config and settings, merge and persist them, then activate if any
    /// section applies to the current host.
    pub async fn start<C>(&mut self, config: &C) -> Activation
    where
        C: ConfigSource + ?Sized,
    {
        if self.initialized {
            log::warn!("Controller already started");
            return self.activation();
        }

        let sections = load_sections_or_empty(config).await;
        self.settings = load_and_merge(&self.store, &sections).await;
        self.sections = sections;
        self.initialized = true;

        let href = self.page.current_href();
        let host = Location::parse(&href).host;
        if !self.sections.iter().any(|section| section.applies_to(host)) {
            log::info!("No sections configured for {host}, staying inactive");
            return Activation::Inert;
        }

        log::info!("Found sections for {host}, activating");
        self.watcher = UrlWatcher::new(href.as_str());
        self.page.attach(self.options.observer);
        self.active = true;

        if self.settings.is_enabled() {
            self.reconcile(&href);
        }
        Activation::Active
    }

    fn activation(&self) -> Activation {
        if self.active {
            Activation::Active
        } else {
            Activation::Inert
        }
    }

    /// Started, applicable to this host, and not torn down.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.initialized && self.active
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Redirect check followed by hiding.
    fn reconcile(&mut self, href: &str) {
        self.check_redirect(href);
        self.apply_hiding(href);
    }

    /// Navigate if an enabled redirect section matches. Returns true if it did.
    fn check_redirect(&mut self, href: &str) -> bool {
        let location = Location::parse(href);
        let decision = redirect::decide(self.settings.enabled_sections(&self.sections), &location);

        match decision.target_url {
            Some(target) if decision.should_redirect => {
                log::info!("Redirecting from {} to {target}", location.path);
                self.page.replace(&target);
                true
            }
            _ => false,
        }
    }

    /// Hide the matches of every enabled hiding section for this host.
    fn apply_hiding(&mut self, href: &str) -> usize {
        let host = Location::parse(href).host;
        let sections = self
            .settings
            .enabled_sections(&self.sections)
            .into_iter()
            .filter(|section| section.is_hide_section() && section.applies_to(host));

        self.registry
            .apply_hiding(sections, &mut self.page, self.options.click_delay_ms)
    }

    // =========================================================================
    // DOM Mutations
    // =========================================================================

    /// Observer callback. Batches that add nodes arm the debounce timer.
    pub fn on_mutations(&mut self, batch: &MutationBatch) {
        if !self.is_active() || !self.settings.is_enabled() || !batch.should_reapply() {
            return;
        }
        if let Some(delay) = self.debouncer.trigger() {
            self.page.schedule(delay);
        }
    }

    /// Debounce timer callback. Runs one hiding pass with the latest settings.
    pub fn on_debounce_timer(&mut self) {
        if !self.debouncer.fire() || !self.is_active() || !self.settings.is_enabled() {
            return;
        }
        let href = self.page.current_href();
        let hidden = self.apply_hiding(&href);
        if hidden > 0 {
            log::debug!("Hid {hidden} node(s) after DOM update");
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// The host saw the href change from `previous_href` to `new_href`.
    pub fn on_url_change(&mut self, new_href: &str, previous_href: &str) {
        if !self.is_active() {
            return;
        }
        self.watcher.check(new_href);
        self.reconcile_navigation(new_href, previous_href);
    }

    /// Re-read the href after a history event. Returns true if it changed.
    pub fn poll_url(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        let href = self.page.current_href();
        match self.watcher.check(&href) {
            Some(previous) => {
                self.reconcile_navigation(&href, &previous);
                true
            }
            None => false,
        }
    }

    fn reconcile_navigation(&mut self, new_href: &str, previous_href: &str) {
        if !self.settings.is_enabled() {
            return;
        }
        log::info!("URL changed from {previous_href} to {new_href}");
        self.reconcile(new_href);
    }

    // =========================================================================
    // Messages and Toggles
    // =========================================================================

    /// Apply a control panel message: update settings, persist, reconcile.
    pub async fn on_message(&mut self, message: Message) {
        if !self.is_active() {
            log::debug!("Ignoring {message:?}, controller not active");
            return;
        }

        match message {
            Message::ToggleExtension { enabled } => {
                self.settings.set_extension_enabled(enabled);
                let _ = self.persist(StoredSettings::extension_only(enabled)).await;
                self.after_extension_change(enabled);
            }
            Message::ToggleSection { section_id, enabled } => {
                self.settings.set_section_enabled(&section_id, enabled);
                let _ = self.persist_sections().await;
                self.after_section_change(&section_id, enabled);
            }
            Message::CheckRedirect { section_id } => {
                self.settings.set_section_enabled(&section_id, true);
                let _ = self.persist_sections().await;
                self.after_section_change(&section_id, true);
            }
        }
    }

    /// Flip the extension, persist, and reconcile. The in-memory flip stands
    /// even if the save fails.
    pub async fn toggle_extension(&mut self) -> Result<bool, StorageError> {
        let enabled = self.settings.toggle_extension();
        let saved = self.persist(StoredSettings::extension_only(enabled)).await;
        if self.is_active() {
            self.after_extension_change(enabled);
        }
        saved.map(|_| enabled)
    }

    /// Flip one section, persist, and reconcile. The in-memory flip stands
    /// even if the save fails.
    pub async fn toggle_section(&mut self, section_id: &str) -> Result<bool, StorageError> {
        let enabled = self.settings.toggle_section(section_id);
        let saved = self.persist_sections().await;
        if self.is_active() {
            self.after_section_change(section_id, enabled);
        }
        saved.map(|_| enabled)
    }

    fn after_extension_change(&mut self, enabled: bool) {
        if enabled {
            let href = self.page.current_href();
            self.reconcile(&href);
        } else {
            self.debouncer.cancel();
            let restored = self.registry.show_all(&mut self.page);
            log::debug!("Extension disabled, restored {restored} node(s)");
        }
    }

    fn after_section_change(&mut self, section_id: &str, enabled: bool) {
        if !enabled {
            self.registry.show_section(section_id, &mut self.page);
            return;
        }
        if !self.settings.is_enabled() {
            return;
        }

        let Some(section) = self.sections.iter().find(|s| s.id() == section_id) else {
            log::warn!("Unknown section '{section_id}'");
            return;
        };

        let href = self.page.current_href();
        if section.is_hide_section() && section.applies_to(Location::parse(&href).host) {
            self.registry
                .hide_section(section, &mut self.page, self.options.click_delay_ms);
        }
        if section.is_redirect_section() {
            self.check_redirect(&href);
        }
    }

    async fn persist(&self, partial: StoredSettings) -> Result<(), StorageError> {
        let result = self.store.save_field(&partial).await;
        if let Err(e) = &result {
            log::error!("{e}");
        }
        result
    }

    async fn persist_sections(&self) -> Result<(), StorageError> {
        let partial = StoredSettings::sections_only(self.settings.section_settings().clone());
        self.persist(partial).await
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Stop reacting to triggers and put the page back the way it was.
    ///
    /// Terminal: a later [`start`](Self::start) does nothing.
    pub fn teardown(&mut self) {
        if self.active {
            self.page.detach();
        }
        self.initialized = true;
        self.active = false;
        self.debouncer.cancel();
        let restored = self.registry.show_all(&mut self.page);
        log::info!("Controller torn down, restored {restored} node(s)");
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    pub fn hidden_count(&self) -> usize {
        self.registry.count()
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
