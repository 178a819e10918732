//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::emission::EmissionFactors;
use crate::finance::Discounting;
use crate::input::{input_err_msg, read_toml};
use crate::tax_credit::{CreditTier, TaxCreditPolicy, TierTable};
use crate::time::{CalendarHour, PeriodGranularity, TimeRange};
use crate::transaction::PurchaseRules;
use crate::units::{Co2MassPerFuelEnergy, Dimensionless, Energy, MoneyPerH2Mass};
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

define_unit_param_default!(default_discount_rate, Dimensionless, 0.0575);
define_unit_param_default!(default_natural_gas_emission_factor, Co2MassPerFuelEnergy, 53.0703);
define_unit_param_default!(default_mcf_to_mmbtu, Dimensionless, 1.036);
define_unit_param_default!(default_max_credit, MoneyPerH2Mass, 3.0);

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
struct ModelFile {
    time_range: TimeRangeSection,
    purchasing: PurchasingParameters,
    #[serde(default)]
    finance: FinanceParameters,
    #[serde(default)]
    emissions: EmissionsParameters,
    #[serde(default)]
    tax_credit: TaxCreditSection,
}

/// Represents the `time_range` section of the model file.
#[derive(Debug, Deserialize, PartialEq)]
struct TimeRangeSection {
    start: CalendarHour,
    end: CalendarHour,
}

/// Represents the `tax_credit` section of the model file.
#[derive(Debug, Deserialize, PartialEq)]
struct TaxCreditSection {
    #[serde(default = "default_max_credit")]
    max_credit_usd_per_kg: MoneyPerH2Mass,
    tiers: Option<Vec<CreditTier>>,
}

impl Default for TaxCreditSection {
    fn default() -> Self {
        Self {
            max_credit_usd_per_kg: default_max_credit(),
            tiers: None,
        }
    }
}

/// How electricity is bought from the plants
#[derive(Debug, Deserialize, PartialEq)]
pub struct PurchasingParameters {
    /// How closely a generation record must match a period
    #[serde(default)]
    pub period_granularity: PeriodGranularity,
    /// Electricity bought from each plant in each period
    pub amount_mwh: Energy,
    /// Whether purchases may not exceed the matched period's generation
    #[serde(default)]
    pub enforce_generation_limit: bool,
}

impl PurchasingParameters {
    /// The rules for matching purchases to generation
    pub fn rules(&self) -> PurchaseRules {
        PurchaseRules {
            granularity: self.period_granularity,
            enforce_generation_limit: self.enforce_generation_limit,
        }
    }
}

/// How costs and hydrogen output are discounted
#[derive(Debug, Deserialize, PartialEq)]
pub struct FinanceParameters {
    /// The discount rate per period
    #[serde(default = "default_discount_rate")]
    pub discount_rate: Dimensionless,
    /// The form of discounting
    #[serde(default)]
    pub discounting: Discounting,
}

impl Default for FinanceParameters {
    fn default() -> Self {
        Self {
            discount_rate: default_discount_rate(),
            discounting: Discounting::default(),
        }
    }
}

/// Physical constants for emissions accounting
#[derive(Debug, Deserialize, PartialEq)]
pub struct EmissionsParameters {
    /// kg of CO2 emitted per MMBtu of natural gas burned
    #[serde(default = "default_natural_gas_emission_factor")]
    pub natural_gas_kg_co2_per_mmbtu: Co2MassPerFuelEnergy,
    /// MMBtu of energy per thousand cubic feet of natural gas
    #[serde(default = "default_mcf_to_mmbtu")]
    pub mcf_to_mmbtu: Dimensionless,
}

impl Default for EmissionsParameters {
    fn default() -> Self {
        Self {
            natural_gas_kg_co2_per_mmbtu: default_natural_gas_emission_factor(),
            mcf_to_mmbtu: default_mcf_to_mmbtu(),
        }
    }
}

impl EmissionsParameters {
    /// The emission factors to use when calculating emissions
    pub fn factors(&self) -> EmissionFactors {
        EmissionFactors {
            natural_gas: self.natural_gas_kg_co2_per_mmbtu,
        }
    }
}

/// Model parameters, validated and converted to the types used by the simulation
#[derive(Debug, PartialEq)]
pub struct ModelParameters {
    /// The simulation horizon
    pub time_range: TimeRange,
    /// How electricity is bought
    pub purchasing: PurchasingParameters,
    /// How costs are discounted
    pub finance: FinanceParameters,
    /// Emissions accounting constants
    pub emissions: EmissionsParameters,
    /// The tax credit schedule
    pub tax_credit: TaxCreditPolicy,
}

/// Check that the `amount_mwh` parameter is valid
fn check_amount_mwh(value: Energy) -> Result<()> {
    ensure!(
        value.is_finite() && value > Energy(0.0),
        "amount_mwh must be a finite number greater than zero"
    );

    Ok(())
}

/// Check that the `discount_rate` parameter is valid
fn check_discount_rate(value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && value >= Dimensionless(0.0),
        "discount_rate must be a finite number greater than or equal to zero"
    );

    if value > Dimensionless(1.0) {
        warn!("discount_rate is greater than 1");
    }

    Ok(())
}

/// Check that a conversion factor is a finite number greater than zero
fn check_factor(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "{name} must be a finite number greater than zero"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_file: ModelFile = read_toml(&file_path)?;

        Self::from_file(model_file).with_context(|| input_err_msg(file_path))
    }

    /// Validate the contents of a model file and convert them
    fn from_file(file: ModelFile) -> Result<ModelParameters> {
        let start = file.time_range.start.to_datetime()?;
        let end = file.time_range.end.to_datetime()?;
        let time_range = TimeRange::new(start, end)?;

        check_amount_mwh(file.purchasing.amount_mwh)?;
        check_discount_rate(file.finance.discount_rate)?;
        check_factor(
            "natural_gas_kg_co2_per_mmbtu",
            file.emissions.natural_gas_kg_co2_per_mmbtu.value(),
        )?;
        check_factor("mcf_to_mmbtu", file.emissions.mcf_to_mmbtu.value())?;
        check_factor(
            "max_credit_usd_per_kg",
            file.tax_credit.max_credit_usd_per_kg.value(),
        )?;

        let tiers = match file.tax_credit.tiers {
            Some(tiers) => TierTable::new(tiers).context("Invalid tax credit tiers")?,
            None => TierTable::statutory(),
        };

        Ok(ModelParameters {
            time_range,
            purchasing: file.purchasing,
            finance: file.finance,
            emissions: file.emissions,
            tax_credit: TaxCreditPolicy {
                max_credit: file.tax_credit.max_credit_usd_per_kg,
                tiers,
            },
        })
    }
}
