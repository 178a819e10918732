//! Matching an electrolyzer's electricity purchases to plant generation.
use crate::electrolyzer::Electrolyzer;
use crate::error::SimulationError;
use crate::id::{ElectrolyzerID, PlantID, SimulationID};
use crate::log::HOURLY_TARGET;
use crate::plant::{EnergySource, PowerPlant};
use crate::time::PeriodGranularity;
use crate::units::{Energy, FuelEnergy, Money};
use chrono::NaiveDateTime;
use log::trace;

/// Rules governing how purchases are matched to generation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PurchaseRules {
    /// How closely a generation record must match the period
    pub granularity: PeriodGranularity,
    /// Whether a purchase may not exceed the matched record's generation
    pub enforce_generation_limit: bool,
}

/// A purchase of electricity from one plant for one period
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyTransaction {
    /// The run this transaction belongs to
    pub simulation_id: SimulationID,
    /// The purchasing electrolyzer
    pub electrolyzer_id: ElectrolyzerID,
    /// The selling plant
    pub plant_id: PlantID,
    /// The period of the purchase
    pub timestamp: NaiveDateTime,
    /// Electricity purchased
    pub amount: Energy,
    /// Fuel burned to generate the purchased electricity
    pub fuel_consumed: FuelEnergy,
    /// Price paid
    pub price: Money,
    /// The kind of energy the plant uses
    pub energy_source: EnergySource,
}

/// Buy `amount` of electricity from `plant` for `period`.
///
/// Fuel is attributed to the purchase in proportion to the plant's heat rate for the matched
/// ledger period.
///
/// # Returns
///
/// The resulting transaction, or [`SimulationError::NoMatchingPeriod`] if the plant has no
/// generation record for the period.
pub fn purchase(
    simulation_id: SimulationID,
    electrolyzer: &Electrolyzer,
    plant: &PowerPlant,
    amount: Energy,
    period: NaiveDateTime,
    rules: &PurchaseRules,
) -> Result<EnergyTransaction, SimulationError> {
    let generation = plant.find_generation(&period, rules.granularity).ok_or_else(|| {
        SimulationError::NoMatchingPeriod {
            plant_id: plant.id.to_string(),
            timestamp: period,
        }
    })?;

    if rules.enforce_generation_limit && amount > generation.amount {
        return Err(SimulationError::InsufficientGeneration {
            plant_id: plant.id.to_string(),
            timestamp: period,
            requested: amount,
            available: generation.amount,
        });
    }

    let fuel_consumed = plant.heat_rate_for(generation, rules.granularity) * amount;
    let price = generation.sale_price * amount;
    trace!(
        target: HOURLY_TARGET,
        "{period}: {} bought {amount} MWh from plant {} for ${price}",
        electrolyzer.id, plant.id
    );

    Ok(EnergyTransaction {
        simulation_id,
        electrolyzer_id: electrolyzer.id.clone(),
        plant_id: plant.id.clone(),
        timestamp: period,
        amount,
        fuel_consumed,
        price,
        energy_source: plant.energy_source,
    })
}
