//! Writing `metadata.toml`, which records what was run and with which build of the program.
use crate::id::{ElectrolyzerID, SimulationID};
use crate::model::Model;
use crate::time::PeriodGranularity;
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output file name for metadata
const METADATA_FILE_NAME: &str = "metadata.toml";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Build information generated by `build.rs`
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    model: ModelMetadata<'a>,
    program: ProgramMetadata,
    platform: PlatformMetadata,
}

#[derive(Serialize)]
struct RunMetadata<'a> {
    simulation_id: SimulationID,
    model_path: &'a Path,
    started: String,
}

/// What was simulated
#[derive(Serialize)]
struct ModelMetadata<'a> {
    electrolyzer_id: &'a ElectrolyzerID,
    capacity_mw: f64,
    start: String,
    end: String,
    num_periods: usize,
    period_granularity: PeriodGranularity,
    plant_ids: Vec<String>,
}

impl<'a> ModelMetadata<'a> {
    fn new(model: &'a Model) -> Self {
        let time_range = &model.parameters.time_range;

        Self {
            electrolyzer_id: &model.electrolyzer.id,
            capacity_mw: model.electrolyzer.capacity.value(),
            start: time_range.start.format(TIMESTAMP_FORMAT).to_string(),
            end: time_range.end.format(TIMESTAMP_FORMAT).to_string(),
            num_periods: time_range.num_periods(),
            period_granularity: model.parameters.purchasing.period_granularity,
            plant_ids: model.plants.keys().map(ToString::to_string).collect(),
        }
    }
}

/// The build of h2sim which produced the results
#[derive(Serialize)]
struct ProgramMetadata {
    version: &'static str,
    target: &'static str,
    debug: bool,
    rustc: &'static str,
    built: &'static str,
    /// Omitted if the program wasn't built from a git checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    git_commit: Option<String>,
}

impl ProgramMetadata {
    fn current() -> Self {
        let git_commit = built_info::GIT_COMMIT_HASH_SHORT.map(|hash| {
            if built_info::GIT_DIRTY == Some(true) {
                format!("{hash}-dirty")
            } else {
                hash.to_string()
            }
        });

        Self {
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            debug: built_info::DEBUG,
            rustc: built_info::RUSTC_VERSION,
            built: built_info::BUILT_TIME_UTC,
            git_commit,
        }
    }
}

#[derive(Serialize)]
struct PlatformMetadata {
    os: String,
    release: String,
    machine: String,
}

impl PlatformMetadata {
    fn current() -> Result<Self> {
        let info = PlatformInfo::new()
            .map_err(|err| anyhow!("{err}"))
            .context("Unable to determine platform info")?;

        Ok(Self {
            os: info.osname().to_string_lossy().into(),
            release: info.release().to_string_lossy().into(),
            machine: info.machine().to_string_lossy().into(),
        })
    }
}

/// Write metadata about a simulation of `model` to the output folder
pub fn write_metadata(
    output_path: &Path,
    model: &Model,
    simulation_id: SimulationID,
) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata {
            simulation_id,
            model_path: &model.model_path,
            started: Local::now().to_rfc3339(),
        },
        model: ModelMetadata::new(model),
        program: ProgramMetadata::current(),
        platform: PlatformMetadata::current()?,
    };

    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)
        .with_context(|| format!("Could not write {}", file_path.display()))?;

    Ok(())
}
