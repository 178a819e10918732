//! Aggregation of one period's transactions into a portfolio of energy sources.
use crate::error::SimulationError;
use crate::plant::EnergySource;
use crate::transaction::EnergyTransaction;
use crate::units::{Energy, FuelEnergy, Money};
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use indexmap::map::Entry;

/// The electricity purchased in one period and the fuel burned to generate it, by source
#[derive(Debug, Clone, PartialEq)]
pub struct EnergySourcePortfolio {
    /// The period the portfolio covers
    pub timestamp: NaiveDateTime,
    /// Electricity purchased from all plants
    pub total_electricity: Energy,
    /// Price paid for all purchases
    pub total_cost: Money,
    /// Fuel burned by petroleum plants
    pub petroleum: FuelEnergy,
    /// Fuel burned by other hydrocarbon plants
    pub hydrocarbons: FuelEnergy,
    /// Fuel burned by natural gas plants
    pub natural_gas: FuelEnergy,
    /// Fuel burned by coal plants
    pub coal: FuelEnergy,
    /// Fuel burned by nuclear plants
    pub nuclear: FuelEnergy,
    /// Fuel burned by solar plants
    pub solar: FuelEnergy,
    /// Fuel burned by geothermal plants
    pub geothermal: FuelEnergy,
    /// Fuel burned by wind plants
    pub wind: FuelEnergy,
    /// Fuel burned by biomass plants
    pub biomass: FuelEnergy,
    /// Fuel burned by hydropower plants
    pub hydropower: FuelEnergy,
}

impl EnergySourcePortfolio {
    /// An empty portfolio for the given period
    pub fn empty(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            total_electricity: Energy(0.0),
            total_cost: Money(0.0),
            petroleum: FuelEnergy(0.0),
            hydrocarbons: FuelEnergy(0.0),
            natural_gas: FuelEnergy(0.0),
            coal: FuelEnergy(0.0),
            nuclear: FuelEnergy(0.0),
            solar: FuelEnergy(0.0),
            geothermal: FuelEnergy(0.0),
            wind: FuelEnergy(0.0),
            biomass: FuelEnergy(0.0),
            hydropower: FuelEnergy(0.0),
        }
    }

    /// A portfolio containing a single transaction
    pub fn from_transaction(transaction: &EnergyTransaction) -> Self {
        let mut portfolio = Self::empty(transaction.timestamp);
        portfolio.total_electricity = transaction.amount;
        portfolio.total_cost = transaction.price;
        *portfolio.fuel_mut(transaction.energy_source) = transaction.fuel_consumed;

        portfolio
    }

    /// Fuel burned by plants using the given energy source
    pub fn fuel(&self, source: EnergySource) -> FuelEnergy {
        match source {
            EnergySource::Petroleum => self.petroleum,
            EnergySource::Hydrocarbons => self.hydrocarbons,
            EnergySource::NaturalGas => self.natural_gas,
            EnergySource::Coal => self.coal,
            EnergySource::Nuclear => self.nuclear,
            EnergySource::Solar => self.solar,
            EnergySource::Geothermal => self.geothermal,
            EnergySource::Wind => self.wind,
            EnergySource::Biomass => self.biomass,
            EnergySource::Hydropower => self.hydropower,
        }
    }

    fn fuel_mut(&mut self, source: EnergySource) -> &mut FuelEnergy {
        match source {
            EnergySource::Petroleum => &mut self.petroleum,
            EnergySource::Hydrocarbons => &mut self.hydrocarbons,
            EnergySource::NaturalGas => &mut self.natural_gas,
            EnergySource::Coal => &mut self.coal,
            EnergySource::Nuclear => &mut self.nuclear,
            EnergySource::Solar => &mut self.solar,
            EnergySource::Geothermal => &mut self.geothermal,
            EnergySource::Wind => &mut self.wind,
            EnergySource::Biomass => &mut self.biomass,
            EnergySource::Hydropower => &mut self.hydropower,
        }
    }

    /// Add the contents of another portfolio for the same period to this one.
    ///
    /// # Returns
    ///
    /// [`SimulationError::TimestampMismatch`] if the portfolios are for different periods.
    pub fn merge(&mut self, other: &Self) -> Result<(), SimulationError> {
        if self.timestamp != other.timestamp {
            return Err(SimulationError::TimestampMismatch {
                expected: self.timestamp,
                found: other.timestamp,
            });
        }

        self.total_electricity += other.total_electricity;
        self.total_cost += other.total_cost;
        self.petroleum += other.petroleum;
        self.hydrocarbons += other.hydrocarbons;
        self.natural_gas += other.natural_gas;
        self.coal += other.coal;
        self.nuclear += other.nuclear;
        self.solar += other.solar;
        self.geothermal += other.geothermal;
        self.wind += other.wind;
        self.biomass += other.biomass;
        self.hydropower += other.hydropower;

        Ok(())
    }
}

/// Group transactions by period into portfolios.
///
/// Portfolios are returned in the order in which their periods first appear.
pub fn get_portfolios<'a, I>(transactions: I) -> Result<Vec<EnergySourcePortfolio>, SimulationError>
where
    I: IntoIterator<Item = &'a EnergyTransaction>,
{
    let mut portfolios: IndexMap<NaiveDateTime, EnergySourcePortfolio> = IndexMap::new();
    for transaction in transactions {
        let portfolio = EnergySourcePortfolio::from_transaction(transaction);
        match portfolios.entry(transaction.timestamp) {
            Entry::Occupied(mut entry) => entry.get_mut().merge(&portfolio)?,
            Entry::Vacant(entry) => {
                entry.insert(portfolio);
            }
        }
    }

    Ok(portfolios.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{datetime, transaction};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    fn transaction_with(
        template: &EnergyTransaction,
        energy_source: EnergySource,
        amount: f64,
        fuel: f64,
    ) -> EnergyTransaction {
        EnergyTransaction {
            energy_source,
            amount: Energy(amount),
            fuel_consumed: FuelEnergy(fuel),
            price: Money(amount * 2.0),
            ..template.clone()
        }
    }

    #[rstest]
    fn test_from_transaction(transaction: EnergyTransaction) {
        let portfolio = EnergySourcePortfolio::from_transaction(&transaction);
        assert_eq!(portfolio.timestamp, transaction.timestamp);
        assert_eq!(portfolio.total_electricity, transaction.amount);
        assert_eq!(portfolio.natural_gas, transaction.fuel_consumed);
        for source in EnergySource::iter().filter(|s| *s != EnergySource::NaturalGas) {
            assert_eq!(portfolio.fuel(source), FuelEnergy(0.0));
        }
    }

    #[rstest]
    fn test_merge_timestamp_mismatch(transaction: EnergyTransaction) {
        let mut portfolio = EnergySourcePortfolio::from_transaction(&transaction);
        let other = EnergySourcePortfolio::empty(datetime(2023, 7, 1, 5));
        assert_eq!(
            portfolio.merge(&other),
            Err(SimulationError::TimestampMismatch {
                expected: transaction.timestamp,
                found: datetime(2023, 7, 1, 5)
            })
        );
    }

    #[rstest]
    fn test_merge_is_order_independent(transaction: EnergyTransaction) {
        let parts = [
            transaction_with(&transaction, EnergySource::NaturalGas, 10.0, 100.0),
            transaction_with(&transaction, EnergySource::Coal, 20.0, 250.0),
            transaction_with(&transaction, EnergySource::NaturalGas, 5.0, 40.0),
        ];

        let forward = get_portfolios(&parts).unwrap();
        let backward = get_portfolios(parts.iter().rev()).unwrap();
        assert_eq!(forward.len(), 1);
        assert_eq!(backward.len(), 1);

        for portfolio in [&forward[0], &backward[0]] {
            assert_approx_eq!(Energy, portfolio.total_electricity, Energy(35.0));
            assert_approx_eq!(Money, portfolio.total_cost, Money(70.0));
            assert_approx_eq!(FuelEnergy, portfolio.natural_gas, FuelEnergy(140.0));
            assert_approx_eq!(FuelEnergy, portfolio.coal, FuelEnergy(250.0));
        }
    }

    #[rstest]
    fn test_get_portfolios_first_seen_order(transaction: EnergyTransaction) {
        let later = EnergyTransaction {
            timestamp: datetime(2023, 7, 1, 1),
            ..transaction.clone()
        };
        let transactions = [later.clone(), transaction.clone(), later];
        let portfolios = get_portfolios(&transactions).unwrap();

        itertools::assert_equal(
            portfolios.iter().map(|p| p.timestamp),
            [datetime(2023, 7, 1, 1), transaction.timestamp],
        );
        assert_eq!(
            portfolios[0].total_electricity,
            transaction.amount + transaction.amount
        );
    }

    #[test]
    fn test_get_portfolios_empty() {
        assert!(get_portfolios(&Vec::new()).unwrap().is_empty());
    }
}
