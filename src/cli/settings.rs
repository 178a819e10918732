//! The `settings` command
use crate::log::LOG_LEVEL_ENV_VAR;
use crate::settings::{Settings, settings_file_path};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Subcommands for settings
#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Open the settings file in a text editor, creating it first if needed
    Edit,
    /// Print the path of the settings file
    Path,
    /// Print the settings that runs will use
    Show,
    /// Print a settings file with every setting documented and set to its default
    Template,
}

impl SettingsSubcommands {
    /// Execute the supplied settings subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::Edit => {
                let file_path = settings_file_path()?;
                write_template_if_missing(&file_path)?;
                println!("Opening settings file for editing: {}", file_path.display());
                edit::edit_file(&file_path)?;
            }
            Self::Path => println!("{}", settings_file_path()?.display()),
            Self::Show => print!("{}", describe_settings(&Settings::load()?)?),
            Self::Template => print!("{}", Settings::template()?),
        }

        Ok(())
    }
}

/// Write the settings template to `file_path` unless there is already a file there
fn write_template_if_missing(file_path: &Path) -> Result<()> {
    if let Some(dir_path) = file_path.parent() {
        fs::create_dir_all(dir_path)
            .with_context(|| format!("Failed to create directory: {}", dir_path.display()))?;
    }

    match OpenOptions::new().write(true).create_new(true).open(file_path) {
        Ok(mut file) => file.write_all(Settings::template()?.as_bytes())?,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
        Err(err) => {
            return Err(err).with_context(|| format!("Could not create {}", file_path.display()));
        }
    }

    Ok(())
}

/// The settings as TOML, noting whether the log level is overridden by the environment
fn describe_settings(settings: &Settings) -> Result<String> {
    let mut out = toml::to_string(settings).context("Could not convert settings to TOML")?;
    if let Ok(level) = env::var(LOG_LEVEL_ENV_VAR) {
        out.push_str(&format!(
            "# log_level is overridden by {LOG_LEVEL_ENV_VAR}={level}\n"
        ));
    }

    Ok(out)
}
