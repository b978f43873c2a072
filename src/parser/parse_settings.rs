use std::collections::HashSet;

use crate::Settings;

/// Used for controlling the behavior of parsing functions
///
/// A snapshot of the global [`Settings`] taken when a conversion starts, so a
/// configuration reload never changes the rules halfway through a batch.
#[derive(Debug, Clone)]
pub struct ParseSettings {
    /// Parse records on a worker pool
    pub parallel: bool,

    /// Worker count for the pool; `0` lets rayon size it to the machine
    pub max_concur_threads: usize,

    /// Fold descriptors sharing a fingerprint after parsing
    pub enable_dedup: bool,

    /// Lower-case scheme tags allowed through; `None` allows every scheme
    pub enabled_schemes: Option<HashSet<String>>,
}

impl Default for ParseSettings {
    fn default() -> Self {
        ParseSettings::from(Settings::current().as_ref())
    }
}

impl From<&Settings> for ParseSettings {
    fn from(settings: &Settings) -> Self {
        let enabled_schemes = if settings.enabled_schemes.is_empty() {
            None
        } else {
            Some(
                settings
                    .enabled_schemes
                    .iter()
                    .map(|scheme| scheme.trim().to_lowercase())
                    .collect(),
            )
        };

        ParseSettings {
            parallel: settings.parallel_parse,
            max_concur_threads: settings.max_concur_threads,
            enable_dedup: settings.enable_dedup,
            enabled_schemes,
        }
    }
}

impl ParseSettings {
    /// Single-threaded settings with every scheme enabled, independent of
    /// the global configuration.
    pub fn sequential() -> Self {
        ParseSettings {
            parallel: false,
            max_concur_threads: 1,
            enable_dedup: true,
            enabled_schemes: None,
        }
    }

    pub fn scheme_enabled(&self, scheme: &str) -> bool {
        self.enabled_schemes
            .as_ref()
            .map_or(true, |schemes| schemes.contains(scheme))
    }
}
