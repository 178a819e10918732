//! Power plants and the ledger of fuel they consume and electricity they generate.
use crate::id::{PlantID, define_id_getter};
use crate::time::PeriodGranularity;
use crate::units::{Dimensionless, Energy, FuelEnergy, FuelEnergyPerEnergy, MoneyPerEnergy};
use anyhow::{Result, ensure};
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// A map of power plants, keyed by plant ID
pub type PowerPlantMap = IndexMap<PlantID, PowerPlant>;

/// The category of primary energy a plant generates electricity from
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
    strum::EnumIter,
)]
pub enum EnergySource {
    /// Petroleum liquids
    #[string = "petroleum"]
    Petroleum,
    /// Other hydrocarbon gases
    #[string = "hydrocarbons"]
    Hydrocarbons,
    /// Natural gas
    #[string = "natural_gas"]
    NaturalGas,
    /// Coal
    #[string = "coal"]
    Coal,
    /// Nuclear fission
    #[string = "nuclear"]
    Nuclear,
    /// Solar photovoltaic or thermal
    #[string = "solar"]
    Solar,
    /// Geothermal
    #[string = "geothermal"]
    Geothermal,
    /// Onshore or offshore wind
    #[string = "wind"]
    Wind,
    /// Wood and other biomass
    #[string = "biomass"]
    Biomass,
    /// Conventional hydroelectric
    #[string = "hydropower"]
    Hydropower,
}

/// The unit in which a plant's fuel consumption is reported
#[derive(Debug, Clone, Copy, PartialEq, DeserializeLabeledStringEnum)]
pub enum ConsumptionUnit {
    /// Thousand cubic feet of natural gas
    #[string = "mcf"]
    Mcf,
    /// Million British thermal units
    #[string = "mmbtu"]
    MMBtu,
}

impl ConsumptionUnit {
    /// Convert an amount in this unit to fuel energy
    pub fn to_fuel_energy(self, amount: f64, mcf_to_mmbtu: Dimensionless) -> FuelEnergy {
        match self {
            Self::Mcf => FuelEnergy(amount) * mcf_to_mmbtu,
            Self::MMBtu => FuelEnergy(amount),
        }
    }
}

/// Fuel consumed by a plant in one ledger period
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionMetric {
    /// The consuming plant
    pub plant_id: PlantID,
    /// The start of the ledger period
    pub timestamp: NaiveDateTime,
    /// Fuel consumed
    pub amount: FuelEnergy,
}

/// Electricity generated by a plant in one ledger period
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationMetric {
    /// The generating plant
    pub plant_id: PlantID,
    /// The start of the ledger period
    pub timestamp: NaiveDateTime,
    /// Electricity generated
    pub amount: Energy,
    /// The price at which the plant sells its electricity
    pub sale_price: MoneyPerEnergy,
}

/// A power plant from which an electrolyzer can buy electricity.
///
/// The plant owns append-only ledgers of its fuel consumption and electricity generation. Each
/// ledger holds at most one record per timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerPlant {
    /// Unique identifier for the plant
    pub id: PlantID,
    /// The kind of energy the plant uses
    pub energy_source: EnergySource,
    /// Fuel needed per unit of electricity, if the plant has a fixed heat rate
    pub heat_rate: Option<FuelEnergyPerEnergy>,
    consumption: Vec<ConsumptionMetric>,
    generation: Vec<GenerationMetric>,
}
define_id_getter! {PowerPlant, PlantID}

impl PowerPlant {
    /// Create a new plant with empty ledgers
    pub fn new(
        id: PlantID,
        energy_source: EnergySource,
        heat_rate: Option<FuelEnergyPerEnergy>,
    ) -> Self {
        Self {
            id,
            energy_source,
            heat_rate,
            consumption: Vec::new(),
            generation: Vec::new(),
        }
    }

    /// Record fuel consumption for the period starting at `timestamp`.
    ///
    /// The amount is converted to MMBtu using `mcf_to_mmbtu` if necessary.
    pub fn consume(
        &mut self,
        timestamp: NaiveDateTime,
        amount: f64,
        unit: ConsumptionUnit,
        mcf_to_mmbtu: Dimensionless,
    ) -> Result<()> {
        ensure!(
            !self.consumption.iter().any(|c| c.timestamp == timestamp),
            "Plant {} already has a consumption record for {timestamp}",
            self.id
        );

        self.consumption.push(ConsumptionMetric {
            plant_id: self.id.clone(),
            timestamp,
            amount: unit.to_fuel_energy(amount, mcf_to_mmbtu),
        });

        Ok(())
    }

    /// Record electricity generation for the period starting at `timestamp`
    pub fn generate(
        &mut self,
        timestamp: NaiveDateTime,
        amount: Energy,
        sale_price: MoneyPerEnergy,
    ) -> Result<()> {
        ensure!(
            !self.generation.iter().any(|g| g.timestamp == timestamp),
            "Plant {} already has a generation record for {timestamp}",
            self.id
        );

        self.generation.push(GenerationMetric {
            plant_id: self.id.clone(),
            timestamp,
            amount,
            sale_price,
        });

        Ok(())
    }

    /// The consumption ledger, in insertion order
    pub fn consumption(&self) -> &[ConsumptionMetric] {
        &self.consumption
    }

    /// The generation ledger, in insertion order
    pub fn generation(&self) -> &[GenerationMetric] {
        &self.generation
    }

    /// Find the first generation record applying to `period`
    pub fn find_generation(
        &self,
        period: &NaiveDateTime,
        granularity: PeriodGranularity,
    ) -> Option<&GenerationMetric> {
        self.generation
            .iter()
            .find(|g| granularity.matches(&g.timestamp, period))
    }

    /// Total fuel consumed in the ledger period of the given generation record
    fn fuel_for(
        &self,
        generation: &GenerationMetric,
        granularity: PeriodGranularity,
    ) -> FuelEnergy {
        self.consumption
            .iter()
            .filter(|c| granularity.matches(&c.timestamp, &generation.timestamp))
            .map(|c| c.amount)
            .sum()
    }

    /// Total electricity generated in the ledger period of the given generation record
    fn generated_for(
        &self,
        generation: &GenerationMetric,
        granularity: PeriodGranularity,
    ) -> Energy {
        self.generation
            .iter()
            .filter(|g| granularity.matches(&g.timestamp, &generation.timestamp))
            .map(|g| g.amount)
            .sum()
    }

    /// The heat rate to attribute fuel to electricity generated in a ledger period.
    ///
    /// This is the plant's declared heat rate if it has one. Otherwise it is the ratio of all fuel
    /// consumed to all electricity generated in that period, which is zero if no fuel was recorded.
    pub fn heat_rate_for(
        &self,
        generation: &GenerationMetric,
        granularity: PeriodGranularity,
    ) -> FuelEnergyPerEnergy {
        if let Some(heat_rate) = self.heat_rate {
            return heat_rate;
        }

        let fuel = self.fuel_for(generation, granularity);
        let generated = self.generated_for(generation, granularity);
        if fuel == FuelEnergy(0.0) || !generated.is_normal() {
            return FuelEnergyPerEnergy(0.0);
        }

        fuel / generated
    }
}
