//! Errors which abort a simulation run.
use crate::units::Energy;
use chrono::NaiveDateTime;

/// A failure of one of the simulation components.
///
/// Each of these reflects a problem with the model inputs rather than a transient fault, so none
/// of them are retried.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SimulationError {
    /// A purchase was requested for a period in which the plant has no generation record
    #[display("Plant {plant_id} has no generation record for the period {timestamp}")]
    NoMatchingPeriod {
        /// The plant the purchase was requested from
        plant_id: String,
        /// The requested period
        timestamp: NaiveDateTime,
    },
    /// Portfolios for different periods were merged
    #[display("Cannot merge portfolio for {found} into portfolio for {expected}")]
    TimestampMismatch {
        /// The period of the portfolio being merged into
        expected: NaiveDateTime,
        /// The period of the portfolio being merged
        found: NaiveDateTime,
    },
    /// No hydrogen was produced over the horizon, so emissions intensity is undefined
    #[display("Emissions intensity is undefined because no hydrogen was produced")]
    UndefinedIntensity,
    /// A purchase exceeded the electricity the plant generated in that period
    #[display(
        "Cannot purchase {requested} MWh from plant {plant_id} for the period {timestamp}: only \
        {available} MWh were generated"
    )]
    InsufficientGeneration {
        /// The plant the purchase was requested from
        plant_id: String,
        /// The requested period
        timestamp: NaiveDateTime,
        /// The amount requested
        requested: Energy,
        /// The amount generated in the matched period
        available: Energy,
    },
    /// No discounted hydrogen was produced over the horizon, so LCOH is undefined
    #[display("LCOH is undefined because no hydrogen was produced")]
    UndefinedLcoh,
}
