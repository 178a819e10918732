//! The 45V clean hydrogen production tax credit.
//!
//! The credit earned per kg of hydrogen is a fraction of a maximum rate. The fraction is chosen
//! from a table of tiers according to the emissions intensity of the hydrogen, i.e. the kg of CO2
//! emitted per kg of hydrogen produced.
use crate::error::SimulationError;
use crate::units::{Co2Mass, Co2MassPerH2Mass, Dimensionless, H2Mass, Money, MoneyPerH2Mass};
use anyhow::{Result, ensure};
use log::warn;
use serde::Deserialize;
use std::fmt;

/// One row of the tier table.
///
/// A tier applies to intensities in the half-open range `[min_intensity, max_intensity)`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CreditTier {
    /// Lowest intensity in the tier (inclusive)
    pub min_intensity: Co2MassPerH2Mass,
    /// Highest intensity in the tier (exclusive)
    pub max_intensity: Co2MassPerH2Mass,
    /// Fraction of the maximum credit earned in this tier
    pub credit_fraction: Dimensionless,
}

impl CreditTier {
    const fn new(min_intensity: f64, max_intensity: f64, credit_fraction: f64) -> Self {
        Self {
            min_intensity: Co2MassPerH2Mass(min_intensity),
            max_intensity: Co2MassPerH2Mass(max_intensity),
            credit_fraction: Dimensionless(credit_fraction),
        }
    }

    /// Whether `intensity` falls in this tier
    pub fn contains(&self, intensity: Co2MassPerH2Mass) -> bool {
        self.min_intensity <= intensity && intensity < self.max_intensity
    }
}

impl fmt::Display for CreditTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.min_intensity, self.max_intensity)
    }
}

/// The credit schedule of IRC section 45V(b)(2)
const STATUTORY_TIERS: [CreditTier; 4] = [
    CreditTier::new(2.5, 4.0, 0.2),
    CreditTier::new(1.5, 2.5, 0.25),
    CreditTier::new(0.45, 1.5, 0.334),
    CreditTier::new(0.0, 0.45, 1.0),
];

/// A set of non-overlapping credit tiers
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable(Vec<CreditTier>);

impl TierTable {
    /// Create a tier table, checking that the tiers are valid and don't overlap
    pub fn new(tiers: Vec<CreditTier>) -> Result<Self> {
        ensure!(!tiers.is_empty(), "Tier table must contain at least one tier");

        for tier in &tiers {
            ensure!(
                tier.min_intensity.is_finite()
                    && tier.min_intensity >= Co2MassPerH2Mass(0.0)
                    && tier.min_intensity < tier.max_intensity,
                "Invalid intensity range for tier {tier}"
            );
            ensure!(
                tier.credit_fraction >= Dimensionless(0.0)
                    && tier.credit_fraction <= Dimensionless(1.0),
                "Credit fraction for tier {tier} must be between 0 and 1"
            );
        }

        let mut sorted: Vec<_> = tiers.iter().collect();
        sorted.sort_by(|a, b| a.min_intensity.value().total_cmp(&b.min_intensity.value()));
        for pair in sorted.windows(2) {
            ensure!(
                pair[0].max_intensity <= pair[1].min_intensity,
                "Tiers {} and {} overlap",
                pair[0],
                pair[1]
            );
        }

        Ok(Self(tiers))
    }

    /// The statutory 45V tier table
    pub fn statutory() -> Self {
        Self(STATUTORY_TIERS.to_vec())
    }

    /// The tiers, in the order they were given
    pub fn tiers(&self) -> &[CreditTier] {
        &self.0
    }

    /// Find the index of the tier containing `intensity`, if any
    pub fn select_index(&self, intensity: Co2MassPerH2Mass) -> Option<usize> {
        self.0.iter().position(|tier| tier.contains(intensity))
    }

    /// Find the tier containing `intensity`, if any
    pub fn select(&self, intensity: Co2MassPerH2Mass) -> Option<&CreditTier> {
        self.select_index(intensity).map(|idx| &self.0[idx])
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::statutory()
    }
}

/// The parameters of the tax credit
#[derive(Debug, Clone, PartialEq)]
pub struct TaxCreditPolicy {
    /// The credit per kg of hydrogen in the most generous tier
    pub max_credit: MoneyPerH2Mass,
    /// The tier table
    pub tiers: TierTable,
}

/// The tax credit earned over a simulation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxCredit45V {
    /// Credit earned per kg of hydrogen
    pub amount_per_kg: MoneyPerH2Mass,
    /// Total credit earned
    pub total: Money,
    /// The emissions intensity of all hydrogen produced
    pub intensity: Co2MassPerH2Mass,
    /// The tier the intensity fell into, if any
    pub tier: Option<CreditTier>,
}

/// Calculate the emissions intensity of hydrogen production.
///
/// # Returns
///
/// [`SimulationError::UndefinedIntensity`] if no hydrogen was produced.
pub fn intensity(
    emitted: Co2Mass,
    produced: H2Mass,
) -> Result<Co2MassPerH2Mass, SimulationError> {
    if produced <= H2Mass(0.0) || !produced.is_finite() {
        return Err(SimulationError::UndefinedIntensity);
    }

    Ok(emitted / produced)
}

/// Calculate the tax credit for the total emissions and hydrogen production over a run.
///
/// Intensities outside every tier earn no credit.
pub fn evaluate(
    total_emitted: Co2Mass,
    total_produced: H2Mass,
    policy: &TaxCreditPolicy,
) -> Result<TaxCredit45V, SimulationError> {
    let intensity = intensity(total_emitted, total_produced)?;
    let tier = policy.tiers.select(intensity).copied();
    let amount_per_kg = match tier {
        Some(tier) => tier.credit_fraction * policy.max_credit,
        None => {
            warn!("Emissions intensity of {intensity} kg CO2/kg H2 is not in any credit tier");
            MoneyPerH2Mass(0.0)
        }
    };

    Ok(TaxCredit45V {
        amount_per_kg,
        total: amount_per_kg * total_produced,
        intensity,
        tier,
    })
}

/// The number of periods whose own emissions intensity fell into each tier
#[derive(Debug, Clone, PartialEq)]
pub struct TaxCreditSummary {
    tier_hours: Vec<u32>,
    no_credit_hours: u32,
}

impl TaxCreditSummary {
    /// An empty summary for the given tier table
    pub fn new(tiers: &TierTable) -> Self {
        Self {
            tier_hours: vec![0; tiers.tiers().len()],
            no_credit_hours: 0,
        }
    }

    /// Classify a period, returning the index of its tier, if any.
    ///
    /// Periods in which no hydrogen was produced earn no credit.
    pub fn record_period(
        &mut self,
        tiers: &TierTable,
        emitted: Co2Mass,
        produced: H2Mass,
    ) -> Option<usize> {
        let tier = intensity(emitted, produced)
            .ok()
            .and_then(|intensity| tiers.select_index(intensity));
        match tier {
            Some(idx) => self.tier_hours[idx] += 1,
            None => self.no_credit_hours += 1,
        }

        tier
    }

    /// Number of periods in each tier, in tier table order
    pub fn tier_hours(&self) -> &[u32] {
        &self.tier_hours
    }

    /// Number of periods which earned no credit
    pub fn no_credit_hours(&self) -> u32 {
        self.no_credit_hours
    }
}
