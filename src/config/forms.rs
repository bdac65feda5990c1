//! Form lookup.
//!
//! Configuration files name forms as `"<plugin>|<hex id>"`. The host resolves
//! those strings through [`FormLookup`]; [`FormTable`] is a table-backed
//! implementation that can be loaded from TOML.

use crate::action::{FormKind, FormRef};
use crate::error::{KeyActionError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Resolves configuration form strings.
pub trait FormLookup {
    fn lookup(&self, key: &str) -> Option<FormRef>;
}

/// Split a form string into its lower-cased plugin name and numeric id.
///
/// The id is hexadecimal, with or without a `0x` prefix.
pub fn parse_form_key(key: &str) -> Option<(String, u32)> {
    let (plugin, id) = key.split_once('|')?;
    let plugin = plugin.trim();
    if plugin.is_empty() {
        return None;
    }
    let id = id.trim();
    let digits = id
        .strip_prefix("0x")
        .or_else(|| id.strip_prefix("0X"))
        .unwrap_or(id);
    let id = u32::from_str_radix(digits, 16).ok()?;
    Some((plugin.to_lowercase(), id))
}

fn normalize(plugin: &str, id: u32) -> String {
    format!("{}|{:X}", plugin, id)
}

#[derive(Debug, Deserialize)]
struct FormTableFile {
    #[serde(default)]
    forms: HashMap<String, FormKind>,
}

/// In-memory form database keyed by plugin and id.
#[derive(Debug, Default, Clone)]
pub struct FormTable {
    entries: HashMap<String, FormRef>,
}

impl FormTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` as a form of `kind`.
    ///
    /// # Errors
    /// * `ConfigError` when `key` is not a valid form string
    pub fn insert(&mut self, key: &str, kind: FormKind) -> Result<FormRef> {
        let (plugin, id) = parse_form_key(key)
            .ok_or_else(|| KeyActionError::config(format!("Invalid form key: {}", key)))?;
        let form = FormRef::new(id, kind);
        self.entries.insert(normalize(&plugin, id), form);
        Ok(form)
    }

    /// Parse a `[forms]` table mapping form strings to kinds.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        let file: FormTableFile =
            toml::from_str(text).map_err(|e| KeyActionError::parse(origin, e.to_string()))?;
        let mut table = Self::new();
        for (key, kind) in file.forms {
            table.insert(&key, kind)?;
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            KeyActionError::file_error(format!("Cannot read form table {}", path.display()), e)
        })?;
        Self::from_toml_str(&text, path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FormLookup for FormTable {
    fn lookup(&self, key: &str) -> Option<FormRef> {
        let (plugin, id) = parse_form_key(key)?;
        self.entries.get(&normalize(&plugin, id)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_form_keys() {
        assert_eq!(
            parse_form_key("Skyrim.esm|0x13794"),
            Some(("skyrim.esm".to_string(), 0x13794))
        );
        assert_eq!(
            parse_form_key(" MyMod.esp | 801 "),
            Some(("mymod.esp".to_string(), 0x801))
        );
        assert_eq!(parse_form_key("Skyrim.esm"), None);
        assert_eq!(parse_form_key("|0x10"), None);
        assert_eq!(parse_form_key("Skyrim.esm|zz"), None);
    }

    #[test]
    fn lookup_ignores_case_and_prefix() {
        let mut table = FormTable::new();
        table.insert("Skyrim.esm|0x0001A8F2", FormKind::Idle).unwrap();

        let form = table.lookup("skyrim.ESM|1a8f2").unwrap();
        assert_eq!(form, FormRef::idle(0x1A8F2));
        assert!(table.lookup("Update.esm|0x1A8F2").is_none());
    }

    #[test]
    fn loads_toml_table() {
        let text = r#"
            [forms]
            "Skyrim.esm|0x13794" = "keyword"
            "Skyrim.esm|0x10" = "action"
        "#;
        let table = FormTable::from_toml_str(text, Path::new("forms.toml")).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup("Skyrim.esm|0x13794").map(|f| f.kind),
            Some(FormKind::Keyword)
        );
    }

    #[test]
    fn rejects_bad_keys_in_table() {
        let text = r#"
            [forms]
            "not a form" = "idle"
        "#;
        let err = FormTable::from_toml_str(text, Path::new("forms.toml")).unwrap_err();
        assert!(matches!(err, KeyActionError::ConfigError { .. }));
    }
}
