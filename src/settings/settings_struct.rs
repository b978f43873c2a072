use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a configuration document could not be applied.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_max_concur_threads() -> usize {
    4
}

pub fn default_true() -> bool {
    true
}

/// Settings structure to hold global configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Filter for `env_logger` when `RUST_LOG` is unset
    pub log_level: String,

    /// Worker threads for record parsing, `0` for one per core
    pub max_concur_threads: usize,

    pub parallel_parse: bool,
    pub enable_dedup: bool,

    /// Schemes the dispatcher accepts; empty means every registered scheme
    pub enabled_schemes: Vec<String>,

    /// File the settings were loaded from
    #[serde(skip)]
    pub pref_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_level: default_log_level(),
            max_concur_threads: default_max_concur_threads(),
            parallel_parse: default_true(),
            enable_dedup: default_true(),
            enabled_schemes: Vec::new(),
            pref_path: String::new(),
        }
    }
}

/// Top-level layout of a settings file: everything lives under `common`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsDocument {
    common: Settings,
}

impl Settings {
    /// Create a new settings instance with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the process-wide settings.
    pub fn current() -> Arc<Settings> {
        GLOBAL
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Parses a settings document. Content with a `common:` key is read as
    /// YAML, anything else as TOML.
    pub fn load_from_content(content: &str) -> Result<Self, SettingsError> {
        if content.contains("common:") {
            let document: SettingsDocument = serde_yaml::from_str(content)?;
            return Ok(document.common);
        }
        let document: SettingsDocument = toml::from_str(content)?;
        Ok(document.common)
    }

    /// Loads a settings file; `.yaml`/`.yml` files are always read as YAML.
    pub fn load_from_file(path: &str) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        let is_yaml = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
            });

        let mut settings = if is_yaml {
            let document: SettingsDocument = serde_yaml::from_str(&content)?;
            document.common
        } else {
            Settings::load_from_content(&content)?
        };
        settings.pref_path = path.to_owned();
        Ok(settings)
    }
}

// Global settings instance
pub static GLOBAL: LazyLock<RwLock<Arc<Settings>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Settings::new())));

fn replace_global(settings: Settings) {
    let mut guard = GLOBAL
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Arc::new(settings);
}

/// Replaces the global settings with the parsed `content`. On error the
/// previous settings stay in place.
pub fn update_settings_from_content(content: &str) -> Result<(), SettingsError> {
    let settings = Settings::load_from_content(content)?;
    replace_global(settings);
    Ok(())
}

/// Replaces the global settings with the contents of `path`.
pub fn update_settings_from_file(path: &str) -> Result<(), SettingsError> {
    let settings = Settings::load_from_file(path)?;
    log::debug!("Loaded settings from '{}'", path);
    replace_global(settings);
    Ok(())
}
