//! The module responsible for writing output data to disk.
use crate::id::{ElectrolyzerID, PlantID, SimulationID};
use crate::plant::EnergySource;
use crate::simulation::SimulationResult;
use crate::tax_credit::TierTable;
use anyhow::{Context, Result, ensure};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The output file name for emissions
const EMISSIONS_FILE_NAME: &str = "emissions.csv";

/// The output file name for hydrogen production
const HYDROGEN_PRODUCTION_FILE_NAME: &str = "hydrogen_production.csv";

/// The output file name for electricity purchases
const TRANSACTIONS_FILE_NAME: &str = "transactions.csv";

/// The output file name for per-period summaries
const PERIODS_FILE_NAME: &str = "periods.csv";

/// The output file name for the credit tier histogram
const CREDIT_TIERS_FILE_NAME: &str = "credit_tiers.csv";

/// The output file name for the run summary
const SUMMARY_FILE_NAME: &str = "summary.toml";

/// Get the default output directory for the model in the specified directory.
///
/// This is a folder named after the model inside `results_root`.
pub fn get_output_dir(results_root: &Path, model_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok(results_root.join(model_name))
}

/// Create a new output directory, optionally replacing a non-empty existing one.
///
/// # Returns
///
/// Whether an existing non-empty directory was removed.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut entries) = fs::read_dir(output_dir) {
        if entries.next().is_none() {
            // Already exists and is empty
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to replace it."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Convert a timestamp to seconds since the Unix epoch
fn epoch_seconds(timestamp: NaiveDateTime) -> i64 {
    timestamp.and_utc().timestamp()
}

/// Represents a row in the emissions CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct EmissionRow {
    simulation_id: SimulationID,
    electrolyzer_id: ElectrolyzerID,
    timestamp: i64,
    amount_emitted_kg: f64,
}

/// Represents a row in the hydrogen production CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct HydrogenProductionRow {
    simulation_id: SimulationID,
    electrolyzer_id: ElectrolyzerID,
    timestamp: i64,
    kg_hydrogen: f64,
}

/// Represents a row in the transactions CSV file
#[derive(Serialize, Debug, PartialEq)]
struct TransactionRow {
    simulation_id: SimulationID,
    electrolyzer_id: ElectrolyzerID,
    plant_id: PlantID,
    timestamp: i64,
    energy_source: EnergySource,
    amount_mwh: f64,
    fuel_consumed_mmbtu: f64,
    price_usd: f64,
}

/// Represents a row in the periods CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct PeriodRow {
    simulation_id: SimulationID,
    timestamp: i64,
    electricity_mwh: f64,
    natural_gas_mmbtu: f64,
    energy_cost_usd: f64,
    emitted_kg: f64,
    produced_kg: f64,
    credit_tier: Option<usize>,
}

/// Represents a row in the credit tiers CSV file.
///
/// The bounds are empty for the row counting periods which earned no credit.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct CreditTierRow {
    min_intensity: Option<f64>,
    max_intensity: Option<f64>,
    credit_fraction: f64,
    hours: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct CostSummary {
    capital: f64,
    operational: f64,
    replacement: f64,
    energy: f64,
    total: f64,
}

/// The contents of the summary file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Summary {
    simulation_id: SimulationID,
    electrolyzer_id: String,
    num_periods: usize,
    total_emitted_kg: f64,
    total_produced_kg: f64,
    average_emitted_kg_per_hour: f64,
    average_produced_kg_per_hour: f64,
    intensity_kg_co2_per_kg_h2: f64,
    credit_usd_per_kg: f64,
    revenue_usd: f64,
    profit_usd: f64,
    lcoh_usd_per_kg: f64,
    costs: CostSummary,
}

impl Summary {
    fn new(result: &SimulationResult) -> Self {
        let costs = &result.costs;
        Self {
            simulation_id: result.simulation_id,
            electrolyzer_id: result.electrolyzer_id.to_string(),
            num_periods: result.periods.len(),
            total_emitted_kg: result.total_emitted().value(),
            total_produced_kg: result.total_produced().value(),
            average_emitted_kg_per_hour: result.average_emitted_per_hour().value(),
            average_produced_kg_per_hour: result.average_produced_per_hour().value(),
            intensity_kg_co2_per_kg_h2: result.tax_credit.intensity.value(),
            credit_usd_per_kg: result.tax_credit.amount_per_kg.value(),
            revenue_usd: result.revenue.value(),
            profit_usd: result.profit().value(),
            lcoh_usd_per_kg: result.lcoh.value(),
            costs: CostSummary {
                capital: costs.capital.value(),
                operational: costs.operational.value(),
                replacement: costs.replacement.value(),
                energy: costs.energy.value(),
                total: costs.total().value(),
            },
        }
    }
}

/// An object for writing simulation results to file
pub struct DataWriter {
    output_path: PathBuf,
    emissions_writer: csv::Writer<File>,
    hydrogen_writer: csv::Writer<File>,
    transactions_writer: csv::Writer<File>,
    periods_writer: csv::Writer<File>,
    credit_tiers_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            output_path: output_path.to_path_buf(),
            emissions_writer: new_writer(EMISSIONS_FILE_NAME)?,
            hydrogen_writer: new_writer(HYDROGEN_PRODUCTION_FILE_NAME)?,
            transactions_writer: new_writer(TRANSACTIONS_FILE_NAME)?,
            periods_writer: new_writer(PERIODS_FILE_NAME)?,
            credit_tiers_writer: new_writer(CREDIT_TIERS_FILE_NAME)?,
        })
    }

    /// Write all results of a run
    pub fn write_result(&mut self, result: &SimulationResult, tiers: &TierTable) -> Result<()> {
        self.write_emissions(result)?;
        self.write_hydrogen_production(result)?;
        self.write_transactions(result)?;
        self.write_periods(result)?;
        self.write_credit_tiers(result, tiers)?;
        self.write_summary(result)
    }

    /// Write emissions to a CSV file
    fn write_emissions(&mut self, result: &SimulationResult) -> Result<()> {
        for event in &result.emissions {
            self.emissions_writer.serialize(EmissionRow {
                simulation_id: result.simulation_id,
                electrolyzer_id: result.electrolyzer_id.clone(),
                timestamp: epoch_seconds(event.timestamp),
                amount_emitted_kg: event.amount_emitted.value(),
            })?;
        }

        Ok(())
    }

    /// Write hydrogen production to a CSV file
    fn write_hydrogen_production(&mut self, result: &SimulationResult) -> Result<()> {
        for production in &result.hydrogen_production {
            self.hydrogen_writer.serialize(HydrogenProductionRow {
                simulation_id: result.simulation_id,
                electrolyzer_id: result.electrolyzer_id.clone(),
                timestamp: epoch_seconds(production.timestamp),
                kg_hydrogen: production.kg_hydrogen.value(),
            })?;
        }

        Ok(())
    }

    /// Write electricity purchases to a CSV file
    fn write_transactions(&mut self, result: &SimulationResult) -> Result<()> {
        for transaction in &result.transactions {
            self.transactions_writer.serialize(TransactionRow {
                simulation_id: transaction.simulation_id,
                electrolyzer_id: transaction.electrolyzer_id.clone(),
                plant_id: transaction.plant_id.clone(),
                timestamp: epoch_seconds(transaction.timestamp),
                energy_source: transaction.energy_source,
                amount_mwh: transaction.amount.value(),
                fuel_consumed_mmbtu: transaction.fuel_consumed.value(),
                price_usd: transaction.price.value(),
            })?;
        }

        Ok(())
    }

    /// Write per-period summaries to a CSV file
    fn write_periods(&mut self, result: &SimulationResult) -> Result<()> {
        for period in &result.periods {
            self.periods_writer.serialize(PeriodRow {
                simulation_id: result.simulation_id,
                timestamp: epoch_seconds(period.timestamp),
                electricity_mwh: period.electricity.value(),
                natural_gas_mmbtu: period.natural_gas.value(),
                energy_cost_usd: period.energy_cost.value(),
                emitted_kg: period.emitted.value(),
                produced_kg: period.produced.value(),
                credit_tier: period.credit_tier,
            })?;
        }

        Ok(())
    }

    /// Write the number of periods falling into each tier to a CSV file
    fn write_credit_tiers(&mut self, result: &SimulationResult, tiers: &TierTable) -> Result<()> {
        let summary = &result.tier_summary;
        for (tier, hours) in tiers.tiers().iter().zip(summary.tier_hours()) {
            self.credit_tiers_writer.serialize(CreditTierRow {
                min_intensity: Some(tier.min_intensity.value()),
                max_intensity: Some(tier.max_intensity.value()),
                credit_fraction: tier.credit_fraction.value(),
                hours: *hours,
            })?;
        }
        self.credit_tiers_writer.serialize(CreditTierRow {
            min_intensity: None,
            max_intensity: None,
            credit_fraction: 0.0,
            hours: summary.no_credit_hours(),
        })?;

        Ok(())
    }

    /// Write the run summary to a TOML file
    fn write_summary(&self, result: &SimulationResult) -> Result<()> {
        let file_path = self.output_path.join(SUMMARY_FILE_NAME);
        fs::write(&file_path, toml::to_string(&Summary::new(result))?)
            .with_context(|| format!("Failed to write {}", file_path.display()))?;

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.emissions_writer.flush()?;
        self.hydrogen_writer.flush()?;
        self.transactions_writer.flush()?;
        self.periods_writer.flush()?;
        self.credit_tiers_writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::model;
    use crate::model::Model;
    use crate::simulation::simulate;
    use itertools::Itertools;
    use rstest::rstest;
    use tempfile::tempdir;

    fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
        csv::Reader::from_path(path)
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap()
    }

    #[rstest]
    fn test_write_result(model: Model) {
        let result = simulate(1, &model).unwrap();
        let dir = tempdir().unwrap();

        {
            let mut writer = DataWriter::create(dir.path()).unwrap();
            writer
                .write_result(&result, &model.parameters.tax_credit.tiers)
                .unwrap();
            writer.flush().unwrap();
        }

        let emissions: Vec<EmissionRow> = read_rows(&dir.path().join(EMISSIONS_FILE_NAME));
        assert_eq!(emissions.len(), 24);
        assert_eq!(emissions[0].timestamp, 1_688_169_600);
        assert_eq!(emissions[1].timestamp - emissions[0].timestamp, 3600);

        let hydrogen: Vec<HydrogenProductionRow> =
            read_rows(&dir.path().join(HYDROGEN_PRODUCTION_FILE_NAME));
        assert_eq!(hydrogen.len(), 24);
        assert_eq!(&*hydrogen[0].electrolyzer_id.0, "demo");

        let periods: Vec<PeriodRow> = read_rows(&dir.path().join(PERIODS_FILE_NAME));
        assert!(periods.iter().all(|p| p.credit_tier.is_none()));

        let tiers: Vec<CreditTierRow> = read_rows(&dir.path().join(CREDIT_TIERS_FILE_NAME));
        assert_eq!(tiers.len(), 5);
        assert_eq!(tiers[4].min_intensity, None);
        assert_eq!(tiers[4].hours, 24);

        let summary: Summary =
            toml::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE_NAME)).unwrap())
                .unwrap();
        assert_eq!(summary, Summary::new(&result));
    }

    #[test]
    fn test_get_output_dir() {
        let dir = tempdir().unwrap();
        let model_dir = dir.path().join("my_model");
        fs::create_dir(&model_dir).unwrap();
        assert_eq!(
            get_output_dir(Path::new("runs"), &model_dir).unwrap(),
            PathBuf::from("runs").join("my_model")
        );

        // The model folder must exist
        assert!(get_output_dir(Path::new("runs"), &dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");

        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());

        // Empty directories are reused
        assert!(!create_output_directory(&output_dir, false).unwrap());
    }

    #[test]
    fn test_create_output_directory_existing_non_empty() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("file.txt"), "contents").unwrap();

        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(create_output_directory(&output_dir, true).unwrap());
        assert!(!output_dir.join("file.txt").exists());
    }
}
