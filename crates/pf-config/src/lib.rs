//! PureFeed Section Config Compiler
//!
//! This crate turns the JSON section config into validated, de-duplicated
//! [`Section`] values for the engine.

pub mod optimizer;
pub mod parser;

use async_trait::async_trait;
use pf_core::error::SourceError;
use pf_core::section::Section;
use pf_core::store::ConfigSource;

pub use optimizer::{optimize_sections, OptimizeStats};
pub use parser::{parse_config, validate_section, ParsedConfig, RawSection};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("Expected an object with a 'sections' array or a bare array, found {0}")]
    Shape(&'static str),
}

impl From<ConfigError> for SourceError {
    fn from(e: ConfigError) -> Self {
        SourceError::Malformed(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Descriptors in the document
    pub before: usize,
    /// Sections kept
    pub after: usize,
    /// Duplicate ids dropped
    pub deduped: usize,
    /// Descriptors rejected by validation
    pub invalid: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledConfig {
    pub sections: Vec<Section>,
    pub stats: CompileStats,
}

/// Parse, validate and de-duplicate a config document.
pub fn compile_config(text: &str) -> Result<CompiledConfig, ConfigError> {
    let ParsedConfig {
        mut sections,
        total,
        invalid,
    } = parse_config(text)?;
    let optimized = optimize_sections(&mut sections);

    let stats = CompileStats {
        before: total,
        after: optimized.after,
        deduped: optimized.deduped,
        invalid,
    };
    log::debug!(
        "Compiled {} of {} section(s) ({} duplicate, {} invalid)",
        stats.after,
        stats.before,
        stats.deduped,
        stats.invalid
    );

    Ok(CompiledConfig { sections, stats })
}

/// A config document held in memory, compiled on every load.
#[derive(Debug, Clone)]
pub struct JsonConfig {
    text: String,
}

impl JsonConfig {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait(?Send)]
impl ConfigSource for JsonConfig {
    async fn load_sections(&self) -> Result<Vec<Section>, SourceError> {
        Ok(compile_config(&self.text)?.sections)
    }
}
