//! General functions related to finance.
use crate::error::SimulationError;
use crate::units::{Dimensionless, H2Mass, Money, MoneyPerH2Mass, PerYear, Year};
use serde_string_enum::DeserializeLabeledStringEnum;
use std::iter::{self, Sum};
use std::ops::Div;

/// How values in later periods are discounted
#[derive(DeserializeLabeledStringEnum, Debug, Clone, Copy, PartialEq, Default)]
pub enum Discounting {
    /// Period `i` is divided by `1 + r^i`
    #[default]
    #[string = "additive"]
    Additive,
    /// Period `i` is divided by `(1 + r)^i`
    #[string = "compound"]
    Compound,
}

impl Discounting {
    /// The factor by which a value in period `period` is divided
    pub fn factor(self, rate: Dimensionless, period: usize) -> Dimensionless {
        let period = period as f64;
        match self {
            Self::Additive => Dimensionless(1.0 + rate.value().powf(period)),
            Self::Compound => Dimensionless((1.0 + rate.value()).powf(period)),
        }
    }
}

/// Sum a sequence of per-period values, discounting each by its period index
pub fn discounted_sum<T, I>(values: I, rate: Dimensionless, discounting: Discounting) -> T
where
    T: Div<Dimensionless, Output = T> + Sum,
    I: IntoIterator<Item = T>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(period, value)| value / discounting.factor(rate, period))
        .sum()
}

/// Total discounted operating expenditure over `num_periods` periods
pub fn opex_total(
    opex_per_period: Money,
    num_periods: usize,
    rate: Dimensionless,
    discounting: Discounting,
) -> Money {
    discounted_sum(iter::repeat_n(opex_per_period, num_periods), rate, discounting)
}

/// The number of stack replacements needed over the horizon.
///
/// A replacement is due each time the capacity lost to degradation reaches the threshold.
pub fn replacement_count(
    horizon: Year,
    replacement_threshold: Dimensionless,
    degradation_rate: PerYear,
) -> Dimensionless {
    if degradation_rate <= PerYear(0.0) {
        return Dimensionless(0.0);
    }

    let years_per_replacement = replacement_threshold / degradation_rate;
    (horizon / years_per_replacement).floor()
}

/// The costs of a simulation run, broken down by kind
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostBreakdown {
    /// Up-front capital expenditure
    pub capital: Money,
    /// Discounted operating expenditure
    pub operational: Money,
    /// Stack replacements
    pub replacement: Money,
    /// Electricity purchases
    pub energy: Money,
}

impl CostBreakdown {
    /// The sum of all costs
    pub fn total(&self) -> Money {
        self.capital + self.operational + self.replacement + self.energy
    }
}

/// Calculates the levelised cost of hydrogen.
///
/// This is capital plus discounted operating expenditure, divided by discounted hydrogen output.
pub fn lcoh(
    capital: Money,
    operational: Money,
    discounted_hydrogen: H2Mass,
) -> Result<MoneyPerH2Mass, SimulationError> {
    if !discounted_hydrogen.is_normal() || discounted_hydrogen < H2Mass(0.0) {
        return Err(SimulationError::UndefinedLcoh);
    }

    Ok((capital + operational) / discounted_hydrogen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Discounting::Additive, 0.0575, 0, 2.0)] // r^0 == 1
    #[case(Discounting::Additive, 0.0575, 2, 1.003_306_25)]
    #[case(Discounting::Compound, 0.0575, 0, 1.0)]
    #[case(Discounting::Compound, 0.0575, 2, 1.118_306_25)]
    #[case(Discounting::Additive, 0.0, 0, 2.0)]
    #[case(Discounting::Additive, 0.0, 3, 1.0)]
    fn test_discount_factor(
        #[case] discounting: Discounting,
        #[case] rate: f64,
        #[case] period: usize,
        #[case] expected: f64,
    ) {
        assert_approx_eq!(
            Dimensionless,
            discounting.factor(Dimensionless(rate), period),
            Dimensionless(expected),
            epsilon = 1e-12
        );
    }

    #[rstest]
    #[case(Discounting::Additive, 2.442_331_122_807_958_7)]
    #[case(Discounting::Compound, 2.839_835_912_568_672)]
    fn test_opex_total(#[case] discounting: Discounting, #[case] expected: f64) {
        let result = opex_total(Money(1.0), 3, Dimensionless(0.0575), discounting);
        assert_approx_eq!(Money, result, Money(expected), epsilon = 1e-10);
    }

    #[test]
    fn test_opex_total_no_periods() {
        let result = opex_total(Money(1.0), 0, Dimensionless(0.0575), Discounting::Additive);
        assert_eq!(result, Money(0.0));
    }

    #[rstest]
    #[case(1.0, 0.8, 0.02, 0.0)] // Replacement due every 40 years
    #[case(40.0, 0.8, 0.02, 1.0)]
    #[case(100.0, 0.8, 0.02, 2.0)]
    #[case(100.0, 0.8, 0.0, 0.0)] // No degradation
    fn test_replacement_count(
        #[case] horizon: f64,
        #[case] threshold: f64,
        #[case] degradation_rate: f64,
        #[case] expected: f64,
    ) {
        let count = replacement_count(
            Year(horizon),
            Dimensionless(threshold),
            PerYear(degradation_rate),
        );
        assert_approx_eq!(Dimensionless, count, Dimensionless(expected));
    }

    #[test]
    fn test_cost_breakdown_total() {
        let costs = CostBreakdown {
            capital: Money(1150.0),
            operational: Money(10.0),
            replacement: Money(575.0),
            energy: Money(200.0),
        };
        assert_eq!(costs.total(), Money(1935.0));
    }

    #[test]
    fn test_lcoh() {
        let hydrogen = discounted_sum(
            [H2Mass(10.0), H2Mass(10.0), H2Mass(10.0)],
            Dimensionless(0.0575),
            Discounting::Additive,
        );
        let opex = opex_total(Money(1.0), 3, Dimensionless(0.0575), Discounting::Additive);
        let result = lcoh(Money(1150.0), opex, hydrogen).unwrap();
        assert_approx_eq!(
            MoneyPerH2Mass,
            result,
            MoneyPerH2Mass(1152.442_331_122_808 / 24.423_311_228_079_584),
            epsilon = 1e-9
        );
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn test_lcoh_undefined(#[case] hydrogen: f64) {
        assert_eq!(
            lcoh(Money(1150.0), Money(1.0), H2Mass(hydrogen)),
            Err(SimulationError::UndefinedLcoh)
        );
    }
}
