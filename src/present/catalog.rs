use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Message catalog keyed by gettext-style ids.
///
/// Ids may carry a context prefix (`"Tooltip|This idea ..."`). A missing
/// translation falls back to the id with the context stripped, so an empty
/// catalog yields plain English.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a flat `id: translation` YAML mapping.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let entries: HashMap<String, String> = serde_yaml::from_str(source)?;
        Ok(Self { entries })
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    pub fn insert(&mut self, id: &str, translation: &str) {
        self.entries.insert(id.to_string(), translation.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translate `id`, or strip its context when untranslated.
    pub fn lookup(&self, id: &str) -> String {
        match self.entries.get(id) {
            Some(translation) => translation.clone(),
            None => match id.rsplit_once('|') {
                Some((_, text)) => text.to_string(),
                None => id.to_string(),
            },
        }
    }

    /// Translate `id` and fill in `%{name}` placeholders.
    pub fn format(&self, id: &str, params: &[(&str, &str)]) -> String {
        interpolate(&self.lookup(id), params)
    }
}

/// Replace each `%{name}` with its value. Unknown placeholders are left as is.
///
/// Substitution is a single left-to-right pass, so values are never
/// themselves expanded.
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("%{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            rest = &rest[start..];
            break;
        };
        let name = &after[..end];
        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}
