//! Settings module
//!
//! Process-wide configuration loaded from a YAML or TOML file. Library code
//! reads it through [`ParseSettings`](crate::ParseSettings) snapshots.

pub mod settings_struct;

pub use settings_struct::{
    update_settings_from_content, update_settings_from_file, Settings, SettingsError, GLOBAL,
};
