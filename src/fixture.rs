//! Fixtures for tests
use crate::electrolyzer::{ConstantProduction, Electrolyzer};
use crate::emission::EmissionFactors;
use crate::finance::Discounting;
use crate::model::{
    EmissionsParameters, FinanceParameters, Model, ModelParameters, PurchasingParameters,
};
use crate::plant::{ConsumptionUnit, EnergySource, PowerPlant};
use crate::tax_credit::{TaxCreditPolicy, TierTable};
use crate::time::{CalendarHour, PeriodGranularity, TimeRange};
use crate::transaction::EnergyTransaction;
use crate::units::{
    Capacity, Co2MassPerFuelEnergy, Dimensionless, Energy, EnergyPerH2Mass, FuelEnergy, Money,
    MoneyPerEnergy, MoneyPerH2Mass, PerYear,
};
use chrono::NaiveDateTime;
use indexmap::indexmap;
use rstest::fixture;
use std::path::PathBuf;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Create a timestamp on the hour
pub fn datetime(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    CalendarHour {
        year,
        month,
        day,
        hour,
    }
    .to_datetime()
    .unwrap()
}

/// A natural gas plant with monthly ledgers for July and August 2023.
///
/// The plant has no declared heat rate, so its implied heat rate is 15.70668 MMBtu/MWh.
#[fixture]
pub fn gas_plant() -> PowerPlant {
    let mut plant = PowerPlant::new("50098".into(), EnergySource::NaturalGas, None);
    for (month, sale_price) in [(7, 2.0), (8, 3.0)] {
        let timestamp = datetime(2023, month, 1, 0);
        plant
            .consume(
                timestamp,
                15_706.68,
                ConsumptionUnit::MMBtu,
                Dimensionless(1.036),
            )
            .unwrap();
        plant
            .generate(timestamp, Energy(1000.0), MoneyPerEnergy(sale_price))
            .unwrap();
    }

    plant
}

/// A 1 MW electrolyzer needing 50 kWh per kg of hydrogen
#[fixture]
pub fn electrolyzer() -> Electrolyzer {
    Electrolyzer {
        id: "demo".into(),
        capacity: Capacity(1.0),
        degradation_rate: PerYear(0.02),
        replacement_threshold: Dimensionless(0.8),
        capital_expenditure: Money(1150.0),
        operational_expenditure: Money(0.5),
        replacement_cost: Dimensionless(0.5),
        production: Box::new(ConstantProduction {
            conversion_rate: EnergyPerH2Mass(0.05),
        }),
    }
}

/// A purchase of 100 MWh from the gas plant
#[fixture]
pub fn transaction() -> EnergyTransaction {
    EnergyTransaction {
        simulation_id: 1,
        electrolyzer_id: "demo".into(),
        plant_id: "50098".into(),
        timestamp: datetime(2023, 7, 1, 0),
        amount: Energy(100.0),
        fuel_consumed: FuelEnergy(1570.668),
        price: Money(200.0),
        energy_source: EnergySource::NaturalGas,
    }
}

#[fixture]
pub fn emission_factors() -> EmissionFactors {
    EmissionFactors {
        natural_gas: Co2MassPerFuelEnergy(53.0703),
    }
}

#[fixture]
pub fn tax_credit_policy() -> TaxCreditPolicy {
    TaxCreditPolicy {
        max_credit: MoneyPerH2Mass(3.0),
        tiers: TierTable::statutory(),
    }
}

/// A model buying 1 MWh per hour from the gas plant over the first day of July 2023
#[fixture]
pub fn model(
    gas_plant: PowerPlant,
    electrolyzer: Electrolyzer,
    tax_credit_policy: TaxCreditPolicy,
) -> Model {
    Model {
        model_path: PathBuf::from("model"),
        parameters: ModelParameters {
            time_range: TimeRange::new(datetime(2023, 7, 1, 0), datetime(2023, 7, 2, 0)).unwrap(),
            purchasing: PurchasingParameters {
                period_granularity: PeriodGranularity::Monthly,
                amount_mwh: Energy(1.0),
                enforce_generation_limit: false,
            },
            finance: FinanceParameters {
                discount_rate: Dimensionless(0.0575),
                discounting: Discounting::Additive,
            },
            emissions: EmissionsParameters::default(),
            tax_credit: tax_credit_policy,
        },
        electrolyzer,
        plants: indexmap! { gas_plant.id.clone() => gas_plant },
    }
}
