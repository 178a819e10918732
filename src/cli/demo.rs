//! The demo model bundled into the program and the `demo` command for using it.
use super::{RunOpts, handle_run_command};
use crate::input::load_model;
use crate::model::Model;
use crate::settings::Settings;
use anyhow::{Context, Result, bail, ensure};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The input files of the demo model
const DEMO_MODEL: Dir = include_dir!("$CARGO_MANIFEST_DIR/demos/gas_plant");

/// The folder name the demo model is extracted to by default
const DEMO_MODEL_NAME: &str = "gas_plant";

/// Subcommands for the demo model
#[derive(Subcommand)]
pub enum DemoSubcommands {
    /// Describe the demo model.
    Info,
    /// Copy the demo model's input files to a new folder, to use as a starting point.
    Extract {
        /// The folder to create
        #[arg(default_value = DEMO_MODEL_NAME)]
        dest: PathBuf,
    },
    /// Run the demo model.
    Run {
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
}

impl DemoSubcommands {
    /// Execute the supplied demo subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::Info => {
                let (_temp_dir, model_path) = extract_demo_to_temp_dir()?;
                let model = load_model(&model_path).context("Failed to load demo model.")?;
                print!("{}", describe_model(&model)?);
            }
            Self::Extract { dest } => extract_demo(&dest)?,
            Self::Run { opts } => handle_demo_run_command(&opts, None)?,
        }

        Ok(())
    }
}

/// Copy the demo model's files into a new folder
fn extract_demo(dest: &Path) -> Result<()> {
    ensure!(
        !dest.exists(),
        "Destination folder {} already exists",
        dest.display()
    );

    fs::create_dir_all(dest)?;
    for entry in DEMO_MODEL.entries() {
        let DirEntry::File(file) = entry else {
            bail!("Unexpected folder in demo model: {}", entry.path().display());
        };
        let file_name = file.path().file_name().context("Invalid file in demo model")?;
        fs::write(dest.join(file_name), file.contents())?;
    }

    Ok(())
}

/// Extract the demo model into a temporary folder, which is deleted when dropped
fn extract_demo_to_temp_dir() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    let model_path = temp_dir.path().join(DEMO_MODEL_NAME);
    extract_demo(&model_path)?;

    Ok((temp_dir, model_path))
}

/// A description of a model's electrolyzer, horizon and plants, preceded by the demo README
fn describe_model(model: &Model) -> Result<String> {
    let mut out = String::new();
    if let Some(readme) = DEMO_MODEL
        .get_file("README.txt")
        .and_then(|file| file.contents_utf8())
    {
        writeln!(out, "{}\n", readme.trim_end())?;
    }

    let params = &model.parameters;
    let electrolyzer = &model.electrolyzer;
    writeln!(
        out,
        "Electrolyzer: {} ({} MW)",
        electrolyzer.id, electrolyzer.capacity
    )?;
    writeln!(
        out,
        "Horizon: {} to {} ({} hours)",
        params.time_range.start,
        params.time_range.end,
        params.time_range.num_periods()
    )?;
    writeln!(
        out,
        "Purchases: {} MWh per hour from each plant, matched {}",
        params.purchasing.amount_mwh, params.purchasing.period_granularity
    )?;
    writeln!(out, "Plants:")?;
    for plant in model.plants.values() {
        writeln!(
            out,
            "  {} ({}, {} generation records)",
            plant.id,
            plant.energy_source,
            plant.generation().len()
        )?;
    }

    Ok(out)
}

/// Handle the `demo run` command.
pub fn handle_demo_run_command(opts: &RunOpts, settings: Option<Settings>) -> Result<()> {
    let (_temp_dir, model_path) = extract_demo_to_temp_dir()?;
    handle_run_command(&model_path, opts, settings)
}
