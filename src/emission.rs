//! Emissions attributable to the electricity in a portfolio.
use crate::portfolio::EnergySourcePortfolio;
use crate::units::{Co2Mass, Co2MassPerFuelEnergy};
use chrono::NaiveDateTime;

/// Emission factors used to convert fuel burned into CO2 emitted.
///
/// Only natural gas combustion is currently counted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionFactors {
    /// CO2 emitted per MMBtu of natural gas burned
    pub natural_gas: Co2MassPerFuelEnergy,
}

/// CO2 emitted in one period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionEvent {
    /// The period
    pub timestamp: NaiveDateTime,
    /// CO2 emitted
    pub amount_emitted: Co2Mass,
}

/// Calculate the emissions for a period's portfolio
pub fn emit(portfolio: &EnergySourcePortfolio, factors: &EmissionFactors) -> EmissionEvent {
    EmissionEvent {
        timestamp: portfolio.timestamp,
        amount_emitted: factors.natural_gas * portfolio.natural_gas,
    }
}
