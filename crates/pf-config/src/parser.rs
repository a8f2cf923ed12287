use pf_core::section::Section;
use serde::Deserialize;
use serde_json::Value;

use crate::ConfigError;

/// One section descriptor as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSection {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub platform: String,
    #[serde(default, alias = "xpaths")]
    pub queries: Vec<String>,
    #[serde(default)]
    pub current_path: Option<String>,
    #[serde(default)]
    pub new_path: Option<String>,
    #[serde(default, alias = "toClick")]
    pub click_target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedConfig {
    /// Valid sections in document order
    pub sections: Vec<Section>,
    /// Descriptors seen, valid or not
    pub total: usize,
    /// Descriptors that were rejected
    pub invalid: usize,
}

/// Parse a `{ "sections": [...] }` document or a bare descriptor array.
///
/// Only a syntax error or a wrong top-level shape fails the whole document.
/// A bad descriptor is logged, counted and skipped.
pub fn parse_config(text: &str) -> Result<ParsedConfig, ConfigError> {
    let document: Value = serde_json::from_str(text)?;

    let descriptors = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("sections") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => return Err(ConfigError::Shape(json_kind(&other))),
        },
        other => return Err(ConfigError::Shape(json_kind(&other))),
    };

    let mut parsed = ParsedConfig {
        total: descriptors.len(),
        ..ParsedConfig::default()
    };

    for (index, value) in descriptors.into_iter().enumerate() {
        let raw = match RawSection::deserialize(value) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Skipping section #{index}: {e}");
                parsed.invalid += 1;
                continue;
            }
        };
        match validate_section(raw) {
            Some(section) => parsed.sections.push(section),
            None => {
                log::warn!("Skipping section #{index}: missing id");
                parsed.invalid += 1;
            }
        }
    }

    Ok(parsed)
}

/// Turn a descriptor into a section, or `None` if it has no id.
///
/// Blank strings count as absent, blank queries are dropped and a blank
/// name falls back to the id. A blank platform is kept; such a section
/// applies to no host but still gets a settings entry.
pub fn validate_section(raw: RawSection) -> Option<Section> {
    let id = non_blank(Some(raw.id))?;
    let platform = non_blank(Some(raw.platform)).unwrap_or_default();
    let name = non_blank(raw.name).unwrap_or_else(|| id.clone());

    let queries = raw.queries.into_iter().filter(|q| !q.trim().is_empty());

    let mut section = Section::new(id, name, platform)
        .with_queries(queries)
        .with_paths(non_blank(raw.current_path), non_blank(raw.new_path));
    if let Some(target) = non_blank(raw.click_target) {
        section = section.with_click_target(target);
    }
    Some(section)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
