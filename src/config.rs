//! Configuration: application settings, the form table and the JSON action
//! files.
//!
//! Settings live in a TOML file, by default `<config dir>/keyaction/settings.toml`.
//! Every key is optional.
//!
//! ```toml
//! actions_dir = "Data/SKSE/Plugins/DKAF"
//! forms_file = "forms.toml"
//! tick_interval_ms = 16
//! keyword_policy = "all"
//! action_idle = 104
//! default_object_count = 364
//! ```

pub mod forms;
pub mod loader;
pub mod validation;

pub use forms::{parse_form_key, FormLookup, FormTable};
pub use loader::{ActionLoader, LoadReport, NamedAction};
pub use validation::{list_action_files, validate_actions_dir};

use crate::action::AssociatedIdle;
use crate::engine::KeywordPolicy;
use crate::error::{KeyActionError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned for `*.json` action files.
    pub actions_dir: PathBuf,
    /// Optional TOML form table.
    pub forms_file: Option<PathBuf>,
    /// Interval between held-action evaluations.
    pub tick_interval_ms: u64,
    pub keyword_policy: KeywordPolicy,
    /// Default-object index used when an entry gives none.
    pub action_idle: u32,
    /// Size of the host's default-object table.
    pub default_object_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            actions_dir: PathBuf::from("actions"),
            forms_file: None,
            tick_interval_ms: 16,
            keyword_policy: KeywordPolicy::default(),
            action_idle: AssociatedIdle::ACTION_IDLE.0,
            default_object_count: AssociatedIdle::TABLE_SIZE,
        }
    }
}

impl Settings {
    /// `<config dir>/keyaction/settings.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("keyaction").join("settings.toml"))
    }

    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|e| KeyActionError::parse(origin, e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read a settings file. Relative `actions_dir` and `forms_file` are taken
    /// relative to the directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            KeyActionError::file_error(format!("Cannot read settings {}", path.display()), e)
        })?;
        let mut settings = Self::from_toml_str(&text, path)?;
        if let Some(base) = path.parent() {
            settings.resolve_relative_to(base);
        }
        Ok(settings)
    }

    /// Load `path` if given (it must exist), otherwise the default location if
    /// present, otherwise defaults with paths relative to the working directory.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(KeyActionError::config("tick_interval_ms must be positive"));
        }
        if self.action_idle >= self.default_object_count {
            return Err(KeyActionError::config(format!(
                "action_idle {} is outside the default-object table ({} entries)",
                self.action_idle, self.default_object_count
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn default_idle(&self) -> AssociatedIdle {
        AssociatedIdle(self.action_idle)
    }

    /// Anchor relative paths at `base`. Absolute paths are left alone.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.actions_dir.is_relative() {
            self.actions_dir = base.join(&self.actions_dir);
        }
        if let Some(file) = self.forms_file.as_mut().filter(|file| file.is_relative()) {
            *file = base.join(&*file);
        }
    }

    /// Form table named by `forms_file`, or an empty one.
    pub fn load_forms(&self) -> Result<FormTable> {
        match &self.forms_file {
            Some(file) => FormTable::load(file),
            None => Ok(FormTable::new()),
        }
    }
}
