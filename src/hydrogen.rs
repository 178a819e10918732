//! Hydrogen produced from the electricity in a portfolio.
use crate::electrolyzer::Electrolyzer;
use crate::portfolio::EnergySourcePortfolio;
use crate::time::PERIOD_LENGTH;
use crate::units::H2Mass;
use chrono::NaiveDateTime;

/// Hydrogen produced in one period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydrogenProduction {
    /// The period
    pub timestamp: NaiveDateTime,
    /// Hydrogen produced
    pub kg_hydrogen: H2Mass,
}

/// Calculate the hydrogen produced from a period's portfolio.
///
/// Electricity beyond what the electrolyzer can use at full capacity for one period is wasted.
pub fn produce(electrolyzer: &Electrolyzer, portfolio: &EnergySourcePortfolio) -> HydrogenProduction {
    let max_input = electrolyzer.capacity * PERIOD_LENGTH;
    let effective_input = portfolio.total_electricity.min(max_input);
    let rate = electrolyzer
        .production
        .hydrogen_per_unit(portfolio.total_electricity);

    HydrogenProduction {
        timestamp: portfolio.timestamp,
        kg_hydrogen: rate * effective_input,
    }
}
