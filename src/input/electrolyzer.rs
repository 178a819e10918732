//! Code for reading the electrolyzer file.
use super::{deserialise_proportion_nonzero, input_err_msg, read_toml};
use crate::electrolyzer::{Electrolyzer, ProductionParameters};
use crate::id::ElectrolyzerID;
use crate::units::{Capacity, Dimensionless, Money, PerYear};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const ELECTROLYZER_FILE_NAME: &str = "electrolyzer.toml";

#[derive(Debug, Deserialize)]
struct ElectrolyzerRaw {
    id: ElectrolyzerID,
    capacity_mw: Capacity,
    degradation_rate: PerYear,
    #[serde(deserialize_with = "deserialise_proportion_nonzero")]
    replacement_threshold: Dimensionless,
    capital_expenditure: Money,
    operational_expenditure: Money,
    replacement_cost: Dimensionless,
    production: ProductionParameters,
}

impl ElectrolyzerRaw {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.capacity_mw.is_finite() && self.capacity_mw > Capacity(0.0),
            "capacity_mw must be a finite number greater than zero"
        );
        ensure!(
            self.degradation_rate >= PerYear(0.0) && self.degradation_rate <= PerYear(1.0),
            "degradation_rate must be between 0 and 1"
        );
        for (name, value) in [
            ("capital_expenditure", self.capital_expenditure),
            ("operational_expenditure", self.operational_expenditure),
        ] {
            ensure!(
                value.is_finite() && value >= Money(0.0),
                "{name} must be a finite number greater than or equal to zero"
            );
        }
        ensure!(
            self.replacement_cost.is_finite() && self.replacement_cost >= Dimensionless(0.0),
            "replacement_cost must be a finite number greater than or equal to zero"
        );

        let ProductionParameters::Constant {
            conversion_rate, ..
        } = self.production;
        ensure!(
            conversion_rate.is_finite() && conversion_rate > 0.0,
            "conversion_rate must be a finite number greater than zero"
        );

        Ok(())
    }

    fn into_electrolyzer(self) -> Result<Electrolyzer> {
        self.validate()?;

        Ok(Electrolyzer {
            id: self.id,
            capacity: self.capacity_mw,
            degradation_rate: self.degradation_rate,
            replacement_threshold: self.replacement_threshold,
            capital_expenditure: self.capital_expenditure,
            operational_expenditure: self.operational_expenditure,
            replacement_cost: self.replacement_cost,
            production: self.production.into_strategy(),
        })
    }
}

/// Read the electrolyzer from the specified model directory
pub fn read_electrolyzer(model_dir: &Path) -> Result<Electrolyzer> {
    let file_path = model_dir.join(ELECTROLYZER_FILE_NAME);
    let raw: ElectrolyzerRaw = read_toml(&file_path)?;
    raw.into_electrolyzer()
        .with_context(|| input_err_msg(&file_path))
}
