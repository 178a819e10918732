#![allow(missing_docs)]

//! This module defines various unit types and their conversions.
//!
//! Electricity is always measured in MWh and electrolyzer capacity in MW. Fuel is always measured
//! in MMBtu and masses in kg. Conversions between other units (e.g. kWh or MCF) happen once, when
//! input data is loaded.
use float_cmp::{ApproxEq, F64Margin};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// Represents a dimensionless quantity.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::AddAssign,
)]
pub struct Dimensionless(pub f64);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl Dimensionless {
    pub fn new(val: f64) -> Self {
        Self(val)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn floor(self) -> Self {
        Dimensionless(self.0.floor())
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

impl fmt::Display for Dimensionless {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ApproxEq for Dimensionless {
    type Margin = F64Margin;

    fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
        self.0.approx_eq(other.0, margin)
    }
}

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Default,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is neither infinite nor NaN
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Whether the underlying value is neither zero, infinite, subnormal nor NaN
            pub fn is_normal(self) -> bool {
                self.0.is_normal()
            }

            /// The smaller of two quantities
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ApproxEq for $name {
            type Margin = F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                self.0.approx_eq(other.0, margin)
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self(0.0), |acc, x| acc + x)
            }
        }

        impl<'a> Sum<&'a $name> for $name {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                iter.copied().sum()
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl std::ops::Div<$name> for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 / rhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Money);
unit_struct!(Energy);
unit_struct!(Capacity);
unit_struct!(Hours);
unit_struct!(Year);
unit_struct!(FuelEnergy);
unit_struct!(Co2Mass);
unit_struct!(H2Mass);

// Derived quantities
unit_struct!(PerYear);
unit_struct!(MoneyPerEnergy);
unit_struct!(MoneyPerH2Mass);
unit_struct!(FuelEnergyPerEnergy);
unit_struct!(Co2MassPerFuelEnergy);
unit_struct!(Co2MassPerH2Mass);
unit_struct!(H2MassPerEnergy);
unit_struct!(EnergyPerH2Mass);

// Division rules
impl_div!(FuelEnergy, Energy, FuelEnergyPerEnergy);
impl_div!(Co2Mass, H2Mass, Co2MassPerH2Mass);
impl_div!(Money, H2Mass, MoneyPerH2Mass);
impl_div!(Dimensionless, PerYear, Year);
impl_div!(Dimensionless, EnergyPerH2Mass, H2MassPerEnergy);

// Multiplication rules
impl_mul!(Capacity, Hours, Energy);
impl_mul!(MoneyPerEnergy, Energy, Money);
impl_mul!(FuelEnergyPerEnergy, Energy, FuelEnergy);
impl_mul!(Co2MassPerFuelEnergy, FuelEnergy, Co2Mass);
impl_mul!(H2MassPerEnergy, Energy, H2Mass);
impl_mul!(MoneyPerH2Mass, H2Mass, Money);

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_capacity_times_hours() {
        assert_eq!(Capacity(2.0) * Hours(1.0), Energy(2.0));
        assert_eq!(Hours(3.0) * Capacity(2.0), Energy(6.0));
    }

    #[test]
    fn test_same_unit_division_is_dimensionless() {
        assert_eq!(Year(3.0) / Year(2.0), Dimensionless(1.5));
    }

    #[test]
    fn test_heat_rate_round_trip() {
        let heat_rate = FuelEnergy(15_706.68) / Energy(1000.0);
        assert_approx_eq!(
            FuelEnergy,
            heat_rate * Energy(100.0),
            FuelEnergy(1570.668),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money(1.0), Money(2.5), Money(0.5)].iter().sum();
        assert_eq!(total, Money(4.0));

        let empty: Vec<H2Mass> = Vec::new();
        assert_eq!(empty.into_iter().sum::<H2Mass>(), H2Mass(0.0));
    }

    #[test]
    fn test_reciprocal_rate() {
        let rate = Dimensionless(1.0) / EnergyPerH2Mass(0.05);
        assert_approx_eq!(H2MassPerEnergy, rate, H2MassPerEnergy(20.0));
    }
}
