//! Program settings, read from `settings.toml` in the user's config folder.
use crate::input::read_toml;
use crate::log::DEFAULT_LOG_LEVEL;
use anyhow::{Context, Result};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

/// The folder results are saved under if the user doesn't choose one
const DEFAULT_RESULTS_ROOT: &str = "h2sim_results";

/// Get the path to the settings file
pub fn settings_file_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine user config directory")?;

    Ok(config_dir.join("h2sim").join(SETTINGS_FILE_NAME))
}

/// Settings which apply to every run of the program
#[derive(Debug, Clone, DocumentedFields, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// The log level: one of off, error, warn, info, debug or trace.
    /// The H2SIM_LOG_LEVEL environment variable takes precedence over this.
    pub log_level: String,
    /// Whether to log the electricity bought and the hydrogen produced in every simulated hour
    pub log_hourly: bool,
    /// Whether to replace an existing output folder without asking for --overwrite
    pub overwrite: bool,
    /// The folder in which a subfolder of results is created for each model that is run
    pub results_root: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_hourly: false,
            overwrite: false,
            results_root: PathBuf::from(DEFAULT_RESULTS_ROOT),
        }
    }
}

impl Settings {
    /// Read the settings file, using the defaults if there isn't one
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&settings_file_path()?)
    }

    fn load_from_path(file_path: &Path) -> Result<Settings> {
        if file_path.is_file() {
            read_toml(file_path)
        } else {
            Ok(Settings::default())
        }
    }

    /// A settings file in which every setting is documented and commented out
    pub fn template() -> Result<String> {
        let defaults = toml::Table::try_from(Settings::default())
            .context("Could not convert settings to TOML")?;

        let mut out = String::from("# h2sim settings\n# Uncomment a setting to change it\n");
        for (name, docs) in Settings::FIELD_NAMES.iter().zip(Settings::FIELD_DOCS) {
            let value = defaults
                .get(*name)
                .with_context(|| format!("Setting {name} has no default"))?;
            let mut entry = toml::Table::new();
            entry.insert((*name).to_string(), value.clone());

            writeln!(out)?;
            for line in docs.lines() {
                writeln!(out, "## {}", line.trim())?;
            }
            write!(out, "# {}", toml::to_string(&entry)?)?;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_path_no_file() {
        let dir = tempdir().unwrap();
        assert_eq!(
            Settings::load_from_path(&dir.path().join(SETTINGS_FILE_NAME)).unwrap(),
            Settings::default()
        );
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&file_path, "log_hourly = true\nresults_root = \"runs\"\n").unwrap();

        assert_eq!(
            Settings::load_from_path(&file_path).unwrap(),
            Settings {
                log_hourly: true,
                results_root: PathBuf::from("runs"),
                ..Settings::default()
            }
        );
    }

    #[test]
    fn test_load_from_path_unknown_setting() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&file_path, "log_levle = \"warn\"\n").unwrap();
        assert!(Settings::load_from_path(&file_path).is_err());
    }

    #[test]
    fn test_template() {
        let contents = Settings::template().unwrap();
        assert!(contents.contains("# log_level = \"info\"\n"));
        assert!(contents.contains("## The H2SIM_LOG_LEVEL environment variable"));
        assert!(contents.contains("# results_root = \"h2sim_results\"\n"));

        // Every setting is commented out
        let settings: Settings = toml::from_str(&contents).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
