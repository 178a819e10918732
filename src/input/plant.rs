//! Code for reading power plants and their ledgers from CSV files.
use super::{deserialise_timestamp, input_err_msg, read_csv, read_csv_optional};
use crate::id::{PlantID, index_by_id};
use crate::plant::{ConsumptionUnit, EnergySource, PowerPlant, PowerPlantMap};
use crate::units::{Dimensionless, Energy, FuelEnergyPerEnergy, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::Path;

const POWER_PLANTS_FILE_NAME: &str = "power_plants.csv";
const PLANT_GENERATION_FILE_NAME: &str = "plant_generation.csv";
const PLANT_CONSUMPTION_FILE_NAME: &str = "plant_consumption.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct PowerPlantRaw {
    plant_id: PlantID,
    energy_source: EnergySource,
    heat_rate: Option<FuelEnergyPerEnergy>,
}

#[derive(PartialEq, Debug, Deserialize)]
struct PlantGenerationRaw {
    plant_id: String,
    #[serde(deserialize_with = "deserialise_timestamp")]
    timestamp: NaiveDateTime,
    amount_mwh: Energy,
    sale_price_usd_per_mwh: MoneyPerEnergy,
}

#[derive(PartialEq, Debug, Deserialize)]
struct PlantConsumptionRaw {
    plant_id: String,
    #[serde(deserialize_with = "deserialise_timestamp")]
    timestamp: NaiveDateTime,
    amount: f64,
    unit: ConsumptionUnit,
}

impl PowerPlantRaw {
    fn into_plant(self) -> Result<PowerPlant> {
        if let Some(heat_rate) = self.heat_rate {
            ensure!(
                heat_rate.is_finite() && heat_rate > FuelEnergyPerEnergy(0.0),
                "Heat rate for plant {} must be a finite number greater than zero",
                self.plant_id
            );
        }

        Ok(PowerPlant::new(
            self.plant_id,
            self.energy_source,
            self.heat_rate,
        ))
    }
}

/// Read power plants and their ledgers from the specified model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `mcf_to_mmbtu` - Conversion factor for consumption given in MCF
///
/// # Returns
///
/// A map of plants, in the order they appear in the file
pub fn read_power_plants(model_dir: &Path, mcf_to_mmbtu: Dimensionless) -> Result<PowerPlantMap> {
    let file_path = model_dir.join(POWER_PLANTS_FILE_NAME);
    let iter = read_csv::<PowerPlantRaw>(&file_path)?;
    let mut plants = read_power_plants_from_iter(iter).with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(PLANT_GENERATION_FILE_NAME);
    let iter = read_csv::<PlantGenerationRaw>(&file_path)?;
    read_generation_from_iter(iter, &mut plants).with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(PLANT_CONSUMPTION_FILE_NAME);
    let iter = read_csv_optional::<PlantConsumptionRaw>(&file_path)?;
    read_consumption_from_iter(iter, &mut plants, mcf_to_mmbtu)
        .with_context(|| input_err_msg(&file_path))?;

    Ok(plants)
}

fn read_power_plants_from_iter<I>(iter: I) -> Result<PowerPlantMap>
where
    I: Iterator<Item = PowerPlantRaw>,
{
    let plants: Vec<_> = iter.map(PowerPlantRaw::into_plant).collect::<Result<_>>()?;
    index_by_id(plants)
}

fn get_plant<'a>(plants: &'a mut PowerPlantMap, plant_id: &str) -> Result<&'a mut PowerPlant> {
    plants
        .get_mut(plant_id)
        .with_context(|| format!("Unknown plant ID {plant_id} found"))
}

fn read_generation_from_iter<I>(iter: I, plants: &mut PowerPlantMap) -> Result<()>
where
    I: Iterator<Item = PlantGenerationRaw>,
{
    for record in iter {
        ensure!(
            record.amount_mwh.is_finite() && record.amount_mwh >= Energy(0.0),
            "Generation for plant {} at {} must be a finite number greater than or equal to zero",
            record.plant_id,
            record.timestamp
        );
        ensure!(
            record.sale_price_usd_per_mwh.is_finite(),
            "Sale price for plant {} at {} must be a finite number",
            record.plant_id,
            record.timestamp
        );

        let plant = get_plant(plants, &record.plant_id)?;
        plant.generate(
            record.timestamp,
            record.amount_mwh,
            record.sale_price_usd_per_mwh,
        )?;
    }

    for plant in plants.values() {
        ensure!(
            !plant.generation().is_empty(),
            "Plant {} has no generation records",
            plant.id
        );
    }

    Ok(())
}

fn read_consumption_from_iter<I>(
    iter: I,
    plants: &mut PowerPlantMap,
    mcf_to_mmbtu: Dimensionless,
) -> Result<()>
where
    I: Iterator<Item = PlantConsumptionRaw>,
{
    for record in iter {
        ensure!(
            record.amount.is_finite() && record.amount >= 0.0,
            "Consumption for plant {} at {} must be a finite number greater than or equal to zero",
            record.plant_id,
            record.timestamp
        );

        let plant = get_plant(plants, &record.plant_id)?;
        plant.consume(record.timestamp, record.amount, record.unit, mcf_to_mmbtu)?;
    }

    Ok(())
}
