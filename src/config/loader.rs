//! JSON action files.
//!
//! Each `*.json` file in the actions directory is an object of named entries.
//! Fields are read one at a time so a malformed field only falls back to its
//! default, a malformed entry only drops that entry and an unreadable file
//! only drops that file.

use crate::action::{
    Action, AssociatedIdle, FormKind, InputCode, KeywordRef, PairedSearch, SearchMode,
};
use crate::config::forms::FormLookup;
use crate::config::validation::{list_action_files, validate_actions_dir};
use crate::error::{KeyActionError, Result};
use crate::registry::ActionRegistry;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// An action together with where it was declared.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedAction {
    pub name: String,
    pub source: PathBuf,
    pub action: Action,
}

/// Counters for one directory load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub files: usize,
    pub entries: usize,
    pub added: usize,
    pub rejected: usize,
}

/// Builds actions from configuration documents.
pub struct ActionLoader<'a, L: FormLookup + ?Sized> {
    forms: &'a L,
    default_idle: AssociatedIdle,
    idle_table_size: u32,
}

impl<'a, L: FormLookup + ?Sized> ActionLoader<'a, L> {
    pub fn new(forms: &'a L) -> Self {
        Self {
            forms,
            default_idle: AssociatedIdle::ACTION_IDLE,
            idle_table_size: AssociatedIdle::TABLE_SIZE,
        }
    }

    /// Override the default associated idle and the range it is checked against.
    pub fn with_idle_table(mut self, default_idle: AssociatedIdle, table_size: u32) -> Self {
        self.default_idle = default_idle;
        self.idle_table_size = table_size;
        self
    }

    /// Load every action file in `dir` into `registry`.
    ///
    /// A missing directory loads nothing. Rejected actions are logged and
    /// counted, never fatal.
    pub fn load_into(&self, dir: &Path, registry: &mut ActionRegistry) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        for named in self.read_dir(dir, &mut report)? {
            match registry.try_add_action(named.action) {
                Ok(()) => {
                    report.added += 1;
                    info!("Action {} successfully added", named.name);
                }
                Err(err) => {
                    report.rejected += 1;
                    info!("Action {} not added: {}", named.name, err);
                }
            }
        }
        Ok(report)
    }

    fn read_dir(&self, dir: &Path, report: &mut LoadReport) -> Result<Vec<NamedAction>> {
        if !dir.exists() {
            warn!("Actions directory {} not found", dir.display());
            return Ok(Vec::new());
        }
        validate_actions_dir(dir)?;

        let mut actions = Vec::new();
        for path in list_action_files(dir)? {
            info!("Loading key-action data {}", path.display());
            match self.load_file(&path) {
                Ok(mut parsed) => {
                    report.files += 1;
                    report.entries += parsed.len();
                    actions.append(&mut parsed);
                }
                Err(err) => warn!("Skipping {}: {}", path.display(), err),
            }
        }
        Ok(actions)
    }

    pub fn load_file(&self, path: &Path) -> Result<Vec<NamedAction>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| KeyActionError::file_error(format!("Cannot read {}", path.display()), e))?;
        self.parse_document(&text, path)
    }

    /// Parse one document. Entries come back in key order.
    pub fn parse_document(&self, text: &str, source: &Path) -> Result<Vec<NamedAction>> {
        let document: Map<String, Value> =
            serde_json::from_str(text).map_err(|e| KeyActionError::parse(source, e.to_string()))?;

        let mut actions = Vec::with_capacity(document.len());
        for (name, entry) in &document {
            let Some(entry) = entry.as_object() else {
                warn!("Action {} is not an object, skipped", name);
                continue;
            };
            info!("Action: {}", name);
            actions.push(NamedAction {
                name: name.clone(),
                source: source.to_path_buf(),
                action: self.parse_entry(name, entry),
            });
        }
        Ok(actions)
    }

    /// Build an action from one entry, coercing malformed fields to defaults.
    ///
    /// A missing or unusable `ActionOrIdle` still yields an action; the
    /// registry refuses it later.
    pub fn parse_entry(&self, name: &str, entry: &Map<String, Value>) -> Action {
        let mut action = Action::default();

        if let Some(keys) = field(name, entry, "Keys", Value::as_str) {
            action.keys = parse_codes(name, "Keys", keys);
        }
        if let Some(keys) = field(name, entry, "GamepadKeys", Value::as_str) {
            action.gamepad_keys = parse_codes(name, "GamepadKeys", keys);
        }

        let mode = field(name, entry, "PairedSearchMode", Value::as_i64)
            .map(|raw| {
                SearchMode::from_raw(raw).unwrap_or_else(|| {
                    warn!("{}: unknown PairedSearchMode {}. Search disabled.", name, raw);
                    SearchMode::None
                })
            })
            .unwrap_or(SearchMode::None);
        let distance = field(name, entry, "PairedSearchDist", Value::as_f64).map(|d| d as f32);
        action.paired_search = PairedSearch::new(mode, distance.unwrap_or(0.0));
        if mode != SearchMode::None && !action.paired_search.is_enabled() {
            warn!("{}: invalid value for PairedSearchDist. Search disabled.", name);
        }

        if let Some(keywords) = field(name, entry, "PairedTargetKeywords", Value::as_str) {
            action.paired_target_keywords = self.parse_keywords(name, keywords);
        }

        match field(name, entry, "ActionOrIdle", Value::as_str) {
            Some(key) => match self.forms.lookup(key) {
                Some(form) if form.is_executable() => {
                    debug!("{}: ActionOrIdle {}", name, form);
                    action.action_or_idle = Some(form);
                }
                Some(form) => warn!("{}: {} is neither an idle nor an action", name, form),
                None => warn!("{}: ActionOrIdle {} not found", name, key),
            },
            None => warn!("{}: ActionOrIdle not found in the data.", name),
        }

        action.action_assoc_idle = self.default_idle;
        if let Some(raw) = field(name, entry, "ActionAssociatedWithIdle", Value::as_i64) {
            match AssociatedIdle::from_index(raw, self.idle_table_size) {
                Some(idle) => action.action_assoc_idle = idle,
                None => warn!(
                    "{}: ActionAssociatedWithIdle {} out of range! Defaulting to ActionIdle",
                    name, raw
                ),
            }
        }

        if let Some(seconds) = field(name, entry, "PressDuration", Value::as_f64) {
            action.press_duration = seconds as f32;
        }
        if let Some(priority) = field(name, entry, "Priority", |v| {
            v.as_i64().and_then(|p| i32::try_from(p).ok())
        }) {
            action.priority = priority;
        }
        if let Some(on_release) = field(name, entry, "triggersOnRelease", Value::as_bool) {
            action.triggers_on_release = on_release;
        }

        debug!(
            "{}: keys {:?}, gamepad {:?}, press {}s, priority {}, on release {}",
            name,
            action.keys,
            action.gamepad_keys,
            action.press_duration,
            action.priority,
            action.triggers_on_release
        );
        action
    }

    fn parse_keywords(&self, name: &str, list: &str) -> Vec<KeywordRef> {
        split_list(list)
            .filter_map(|key| match self.forms.lookup(key) {
                Some(form) if form.kind == FormKind::Keyword => Some(KeywordRef(form.id)),
                Some(form) => {
                    warn!("{}: {} is not a keyword, ignored", name, form);
                    None
                }
                None => {
                    warn!("{}: keyword {} not found, ignored", name, key);
                    None
                }
            })
            .collect()
    }
}

/// Read `key` from `entry`, warning when it is present but malformed.
fn field<'v, T>(
    name: &str,
    entry: &'v Map<String, Value>,
    key: &str,
    extract: impl FnOnce(&'v Value) -> Option<T>,
) -> Option<T> {
    let value = entry.get(key)?;
    let parsed = extract(value);
    if parsed.is_none() {
        warn!("{}: ignoring malformed {} ({})", name, key, value);
    }
    parsed
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|token| !token.is_empty())
}

fn parse_codes(name: &str, key: &str, list: &str) -> Vec<InputCode> {
    split_list(list)
        .filter_map(|token| match token.parse::<InputCode>() {
            Ok(code) => Some(code),
            Err(_) => {
                warn!("{}: invalid code '{}' in {}, ignored", name, token, key);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{FormId, FormRef};
    use crate::config::forms::FormTable;
    use tempfile::TempDir;

    fn forms() -> FormTable {
        let mut table = FormTable::new();
        table.insert("Skyrim.esm|0x1000", FormKind::Idle).unwrap();
        table.insert("Skyrim.esm|0x2000", FormKind::Action).unwrap();
        table.insert("Skyrim.esm|0x13794", FormKind::Keyword).unwrap();
        table.insert("Skyrim.esm|0x3000", FormKind::Other).unwrap();
        table
    }

    fn parse(forms: &FormTable, json: &str) -> Vec<NamedAction> {
        ActionLoader::new(forms)
            .parse_document(json, Path::new("test.json"))
            .unwrap()
    }

    #[test]
    fn parses_full_entry() {
        let forms = forms();
        let actions = parse(
            &forms,
            r#"{
                "Hug": {
                    "Keys": "30, 31",
                    "GamepadKeys": "4096",
                    "PairedSearchMode": 3,
                    "PairedSearchDist": 150.0,
                    "PairedTargetKeywords": "Skyrim.esm|0x13794",
                    "ActionOrIdle": "Skyrim.esm|0x2000",
                    "ActionAssociatedWithIdle": 7,
                    "PressDuration": 0.5,
                    "Priority": 3,
                    "triggersOnRelease": true
                }
            }"#,
        );

        assert_eq!(actions.len(), 1);
        let action = &actions[0].action;
        assert_eq!(actions[0].name, "Hug");
        assert_eq!(action.keys, vec![30, 31]);
        assert_eq!(action.gamepad_keys, vec![4096]);
        assert_eq!(action.paired_search, PairedSearch::Radius { distance: 150.0 });
        assert_eq!(action.paired_target_keywords, vec![KeywordRef(FormId(0x13794))]);
        assert_eq!(action.action_or_idle, Some(FormRef::action(0x2000)));
        assert_eq!(action.action_assoc_idle, AssociatedIdle(7));
        assert_eq!(action.press_duration, 0.5);
        assert_eq!(action.priority, 3);
        assert!(action.triggers_on_release);
    }

    #[test]
    fn defaults_for_missing_fields() {
        let forms = forms();
        let actions = parse(
            &forms,
            r#"{ "Wave": { "Keys": "57", "ActionOrIdle": "Skyrim.esm|0x1000" } }"#,
        );
        let action = &actions[0].action;
        assert_eq!(action.paired_search, PairedSearch::None);
        assert_eq!(action.action_assoc_idle, AssociatedIdle::ACTION_IDLE);
        assert_eq!(action.press_duration, 0.0);
        assert_eq!(action.priority, 0);
        assert!(!action.triggers_on_release);
    }

    #[test]
    fn malformed_fields_fall_back() {
        let forms = forms();
        let actions = parse(
            &forms,
            r#"{
                "Odd": {
                    "Keys": "30, x, 31",
                    "PairedSearchMode": 1,
                    "PairedSearchDist": -10,
                    "PairedTargetKeywords": "Skyrim.esm|0x1000, Nope.esp|0x1, Skyrim.esm|0x13794",
                    "ActionOrIdle": "Skyrim.esm|0x1000",
                    "ActionAssociatedWithIdle": 99999,
                    "Priority": "high"
                }
            }"#,
        );
        let action = &actions[0].action;
        assert_eq!(action.keys, vec![30, 31]);
        assert_eq!(action.paired_search, PairedSearch::None);
        assert_eq!(action.paired_target_keywords, vec![KeywordRef(FormId(0x13794))]);
        assert_eq!(action.action_assoc_idle, AssociatedIdle::ACTION_IDLE);
        assert_eq!(action.priority, 0);
    }

    #[test]
    fn unusable_form_leaves_action_unexecutable() {
        let forms = forms();
        let actions = parse(
            &forms,
            r#"{
                "A": { "Keys": "1" },
                "B": { "Keys": "2", "ActionOrIdle": "Skyrim.esm|0x3000" },
                "C": { "Keys": "3", "ActionOrIdle": "Missing.esp|0x1" },
                "D": 5
            }"#,
        );
        assert_eq!(actions.len(), 3);
        assert!(actions.iter().all(|named| named.action.action_or_idle.is_none()));
    }

    #[test]
    fn entries_come_back_in_key_order() {
        let forms = forms();
        let actions = parse(
            &forms,
            r#"{ "b": { "Keys": "2" }, "a": { "Keys": "1" }, "c": { "Keys": "3" } }"#,
        );
        let names: Vec<_> = actions.iter().map(|named| named.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn non_object_document_is_an_error() {
        let forms = forms();
        let err = ActionLoader::new(&forms)
            .parse_document("[1, 2]", Path::new("bad.json"))
            .unwrap_err();
        assert!(matches!(err, KeyActionError::ParseError { .. }));
    }

    #[test]
    fn load_into_skips_bad_files_and_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("01_good.json"),
            r#"{
                "Low": { "Keys": "30", "ActionOrIdle": "Skyrim.esm|0x1000", "Priority": 1 },
                "High": { "Keys": "30", "ActionOrIdle": "Skyrim.esm|0x1000", "Priority": 5 },
                "Broken": { "Keys": "31" }
            }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("02_bad.json"), "{ not json").unwrap();
        std::fs::write(
            dir.path().join("03_dupe.json"),
            r#"{ "Again": { "Keys": "30", "ActionOrIdle": "Skyrim.esm|0x1000", "Priority": 5 } }"#,
        )
        .unwrap();

        let forms = forms();
        let mut registry = ActionRegistry::new();
        let report = ActionLoader::new(&forms)
            .load_into(dir.path(), &mut registry)
            .unwrap();

        assert_eq!(
            report,
            LoadReport {
                files: 2,
                entries: 4,
                added: 2,
                rejected: 2,
            }
        );
        let priorities: Vec<_> = registry.iter().map(|a| a.priority).collect();
        assert_eq!(priorities, vec![5, 1]);
    }

    #[test]
    fn missing_directory_loads_nothing() {
        let forms = forms();
        let mut registry = ActionRegistry::new();
        let report = ActionLoader::new(&forms)
            .load_into(Path::new("/no/such/actions"), &mut registry)
            .unwrap();
        assert_eq!(report, LoadReport::default());
        assert!(registry.is_empty());
    }
}
