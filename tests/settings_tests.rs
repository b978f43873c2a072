use std::io::Write;

use subcheck::settings::{update_settings_from_content, update_settings_from_file, SettingsError};
use subcheck::{ParseSettings, Settings};

fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[cfg(test)]
mod settings_tests {
    use super::*;

    #[test]
    fn test_load_yaml_file() {
        let file = write_config(
            ".yml",
            "common:\n  log_level: warn\n  max_concur_threads: 8\n  enabled_schemes: [Mieru, TROJAN]\n",
        );
        let path = file.path().to_str().unwrap();
        let settings = Settings::load_from_file(path).unwrap();
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.max_concur_threads, 8);
        assert_eq!(settings.pref_path, path);

        let parse = ParseSettings::from(&settings);
        assert!(parse.scheme_enabled("mieru"));
        assert!(parse.scheme_enabled("trojan"));
        assert!(!parse.scheme_enabled("vmess"));
    }

    #[test]
    fn test_load_toml_file() {
        let file = write_config(
            ".toml",
            "[common]\nenable_dedup = false\nparallel_parse = false\n",
        );
        let settings = Settings::load_from_file(file.path().to_str().unwrap()).unwrap();
        assert!(!settings.enable_dedup);

        let parse = ParseSettings::from(&settings);
        assert!(!parse.parallel);
        assert!(!parse.enable_dedup);
        assert!(parse.enabled_schemes.is_none());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            Settings::load_from_file(path.to_str().unwrap()),
            Err(SettingsError::Io(_))
        ));
    }

    // The only test that touches the process-wide settings.
    #[test]
    fn test_global_update_and_snapshot() {
        let file = write_config(".yaml", "common:\n  max_concur_threads: 2\n");
        update_settings_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(Settings::current().max_concur_threads, 2);
        assert_eq!(ParseSettings::default().max_concur_threads, 2);

        update_settings_from_content("[common]\nmax_concur_threads = 6\n").unwrap();
        assert_eq!(Settings::current().max_concur_threads, 6);

        // a failed update leaves the previous settings in place
        assert!(update_settings_from_content("common:\n  parallel_parse: [").is_err());
        assert_eq!(Settings::current().max_concur_threads, 6);
    }
}
