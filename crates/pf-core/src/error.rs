//! Error types for host collaborators.
//!
//! None of these abort the engine. The controller logs them and carries on
//! with its in-memory state; only toggle operations hand a [`StorageError`]
//! back to their caller.

/// Failure to read or write persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to load settings: {0}")]
    Load(String),
    #[error("Failed to save settings: {0}")]
    Save(String),
}

/// Failure to obtain the section config.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("Config unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed config: {0}")]
    Malformed(String),
}

/// Failure to evaluate one query expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Query '{query}' failed: {reason}")]
pub struct QueryError {
    pub query: String,
    pub reason: String,
}

impl QueryError {
    pub fn new(query: &str, reason: impl Into<String>) -> Self {
        Self {
            query: query.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure to schedule or perform a click.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Click on '{target}' failed: {reason}")]
pub struct ClickError {
    pub target: String,
    pub reason: String,
}

impl ClickError {
    pub fn new(target: &str, reason: impl Into<String>) -> Self {
        Self {
            target: target.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure to bind the control panel to its UI.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error("Required element '{0}' not found")]
    MissingElement(String),
}

impl PanelError {
    /// Text shown in place of the status line.
    pub fn status_text(&self) -> &'static str {
        "Error loading extension"
    }
}
