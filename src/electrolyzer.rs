//! The electrolyzer and the strategies which determine how much hydrogen it produces.
use crate::id::{ElectrolyzerID, define_id_getter};
use crate::units::{
    Capacity, Dimensionless, Energy, EnergyPerH2Mass, H2MassPerEnergy, Money, PerYear,
};
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::fmt::Debug;

/// Determines the hydrogen yield of an electrolyzer for a given electricity input.
///
/// Implementations may make the yield depend on the input, e.g. to model efficiency losses.
pub trait ProductionStrategy: Debug {
    /// Hydrogen produced per unit of electricity, when `input` electricity is supplied
    fn hydrogen_per_unit(&self, input: Energy) -> H2MassPerEnergy;
}

/// A production strategy with a fixed conversion rate between electricity and hydrogen
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantProduction {
    /// Electricity needed to produce one kg of hydrogen
    pub conversion_rate: EnergyPerH2Mass,
}

impl ProductionStrategy for ConstantProduction {
    fn hydrogen_per_unit(&self, _input: Energy) -> H2MassPerEnergy {
        Dimensionless(1.0) / self.conversion_rate
    }
}

/// The unit in which a conversion rate is expressed
#[derive(Debug, Clone, Copy, PartialEq, Default, DeserializeLabeledStringEnum)]
pub enum ConversionUnit {
    /// kWh of electricity per kg of hydrogen
    #[default]
    #[string = "kwh_per_kg"]
    KwhPerKg,
    /// MWh of electricity per kg of hydrogen
    #[string = "mwh_per_kg"]
    MwhPerKg,
}

impl ConversionUnit {
    /// Convert a conversion rate in this unit to MWh per kg
    pub fn to_energy_per_h2_mass(self, rate: f64) -> EnergyPerH2Mass {
        match self {
            Self::KwhPerKg => EnergyPerH2Mass(rate / 1000.0),
            Self::MwhPerKg => EnergyPerH2Mass(rate),
        }
    }
}

/// The parameters of a production strategy, as given in the electrolyzer file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductionParameters {
    /// Parameters for [`ConstantProduction`]
    Constant {
        /// Electricity needed to produce one kg of hydrogen
        conversion_rate: f64,
        /// The unit of `conversion_rate`
        #[serde(default)]
        conversion_unit: ConversionUnit,
    },
}

impl ProductionParameters {
    /// Build the production strategy these parameters describe
    pub fn into_strategy(self) -> Box<dyn ProductionStrategy> {
        match self {
            Self::Constant {
                conversion_rate,
                conversion_unit,
            } => Box::new(ConstantProduction {
                conversion_rate: conversion_unit.to_energy_per_h2_mass(conversion_rate),
            }),
        }
    }
}

/// An electrolyzer which converts purchased electricity into hydrogen
#[derive(Debug)]
pub struct Electrolyzer {
    /// Unique identifier for the electrolyzer
    pub id: ElectrolyzerID,
    /// Nameplate capacity
    pub capacity: Capacity,
    /// Fraction of capacity lost per year
    pub degradation_rate: PerYear,
    /// Fraction of capacity lost at which the stack is replaced
    pub replacement_threshold: Dimensionless,
    /// Up-front capital cost
    pub capital_expenditure: Money,
    /// Operating cost per period
    pub operational_expenditure: Money,
    /// Cost of a stack replacement as a fraction of capital expenditure
    pub replacement_cost: Dimensionless,
    /// How electricity is converted into hydrogen
    pub production: Box<dyn ProductionStrategy>,
}
define_id_getter! {Electrolyzer, ElectrolyzerID}
