//! Functionality for running the hydrogen production simulation.
use crate::emission::{EmissionEvent, emit};
use crate::error::SimulationError;
use crate::finance::{self, CostBreakdown, discounted_sum, opex_total, replacement_count};
use crate::hydrogen::{HydrogenProduction, produce};
use crate::id::{ElectrolyzerID, SimulationID};
use crate::log::HOURLY_TARGET;
use crate::model::Model;
use crate::output::DataWriter;
use crate::output::metadata::write_metadata;
use crate::portfolio::{EnergySourcePortfolio, get_portfolios};
use crate::tax_credit::{TaxCredit45V, TaxCreditSummary, TierTable, evaluate};
use crate::transaction::{EnergyTransaction, purchase};
use crate::units::{Co2Mass, Dimensionless, Energy, FuelEnergy, H2Mass, Money, MoneyPerH2Mass};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{info, trace};
use std::path::Path;

/// The ID given to the run performed by the `run` command
pub const DEFAULT_SIMULATION_ID: SimulationID = 1;

/// A summary of one period of the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodRecord {
    /// The period
    pub timestamp: NaiveDateTime,
    /// Electricity purchased
    pub electricity: Energy,
    /// Natural gas burned to generate the electricity
    pub natural_gas: FuelEnergy,
    /// Price paid for the electricity
    pub energy_cost: Money,
    /// CO2 emitted
    pub emitted: Co2Mass,
    /// Hydrogen produced
    pub produced: H2Mass,
    /// Index of the credit tier this period alone would fall into
    pub credit_tier: Option<usize>,
}

/// The results accumulated over the periods of a run
#[derive(Debug)]
struct SimulationState {
    emissions: Vec<EmissionEvent>,
    hydrogen_production: Vec<HydrogenProduction>,
    transactions: Vec<EnergyTransaction>,
    periods: Vec<PeriodRecord>,
    tier_summary: TaxCreditSummary,
}

impl SimulationState {
    fn new(tiers: &TierTable, num_periods: usize) -> Self {
        Self {
            emissions: Vec::with_capacity(num_periods),
            hydrogen_production: Vec::with_capacity(num_periods),
            transactions: Vec::new(),
            periods: Vec::with_capacity(num_periods),
            tier_summary: TaxCreditSummary::new(tiers),
        }
    }

    /// Record the outcome of one period
    fn record_period(
        &mut self,
        tiers: &TierTable,
        portfolio: &EnergySourcePortfolio,
        transactions: Vec<EnergyTransaction>,
        emission: EmissionEvent,
        production: HydrogenProduction,
    ) {
        let credit_tier = self.tier_summary.record_period(
            tiers,
            emission.amount_emitted,
            production.kg_hydrogen,
        );

        self.periods.push(PeriodRecord {
            timestamp: portfolio.timestamp,
            electricity: portfolio.total_electricity,
            natural_gas: portfolio.natural_gas,
            energy_cost: portfolio.total_cost,
            emitted: emission.amount_emitted,
            produced: production.kg_hydrogen,
            credit_tier,
        });
        self.emissions.push(emission);
        self.hydrogen_production.push(production);
        self.transactions.extend(transactions);
    }
}

/// The outcome of a simulation run
#[derive(Debug)]
pub struct SimulationResult {
    /// The ID of the run
    pub simulation_id: SimulationID,
    /// The electrolyzer simulated
    pub electrolyzer_id: ElectrolyzerID,
    /// The tax credit earned over the horizon
    pub tax_credit: TaxCredit45V,
    /// Emissions in each period
    pub emissions: Vec<EmissionEvent>,
    /// Hydrogen produced in each period
    pub hydrogen_production: Vec<HydrogenProduction>,
    /// All electricity purchases
    pub transactions: Vec<EnergyTransaction>,
    /// Summaries of each period
    pub periods: Vec<PeriodRecord>,
    /// Number of periods falling into each credit tier
    pub tier_summary: TaxCreditSummary,
    /// Revenue earned (the tax credit)
    pub revenue: Money,
    /// Costs incurred
    pub costs: CostBreakdown,
    /// Levelised cost of hydrogen
    pub lcoh: MoneyPerH2Mass,
}

impl SimulationResult {
    /// Total CO2 emitted over the horizon
    pub fn total_emitted(&self) -> Co2Mass {
        self.emissions.iter().map(|e| e.amount_emitted).sum()
    }

    /// Total hydrogen produced over the horizon
    pub fn total_produced(&self) -> H2Mass {
        self.hydrogen_production.iter().map(|h| h.kg_hydrogen).sum()
    }

    /// Total cost of the run
    pub fn cost(&self) -> Money {
        self.costs.total()
    }

    /// Revenue less costs
    pub fn profit(&self) -> Money {
        self.revenue - self.cost()
    }

    fn num_periods(&self) -> Dimensionless {
        Dimensionless(self.periods.len() as f64)
    }

    /// Mean CO2 emitted per period
    pub fn average_emitted_per_hour(&self) -> Co2Mass {
        self.total_emitted() / self.num_periods()
    }

    /// Mean hydrogen produced per period
    pub fn average_produced_per_hour(&self) -> H2Mass {
        self.total_produced() / self.num_periods()
    }
}

/// Buy electricity from every plant for one period and aggregate the purchases
fn simulate_period(
    simulation_id: SimulationID,
    model: &Model,
    period: NaiveDateTime,
) -> Result<(Vec<EnergyTransaction>, EnergySourcePortfolio), SimulationError> {
    let rules = model.parameters.purchasing.rules();
    let transactions = model
        .plants
        .values()
        .map(|plant| {
            purchase(
                simulation_id,
                &model.electrolyzer,
                plant,
                model.parameters.purchasing.amount_mwh,
                period,
                &rules,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    // All transactions share the period, so there is at most one portfolio
    let portfolio = get_portfolios(&transactions)?
        .pop()
        .unwrap_or_else(|| EnergySourcePortfolio::empty(period));

    Ok((transactions, portfolio))
}

/// Simulate the model's electrolyzer over the whole horizon.
///
/// Periods are processed in order. The first failure aborts the run.
pub fn simulate(
    simulation_id: SimulationID,
    model: &Model,
) -> Result<SimulationResult, SimulationError> {
    let params = &model.parameters;
    let electrolyzer = &model.electrolyzer;
    let tiers = &params.tax_credit.tiers;
    let factors = params.emissions.factors();
    let num_periods = params.time_range.num_periods();

    info!(
        "Simulation {simulation_id}: electrolyzer {} buying from {} plant(s) over {num_periods} \
        hours",
        electrolyzer.id,
        model.plants.len()
    );

    let mut state = SimulationState::new(tiers, num_periods);
    for period in params.time_range.iter_periods() {
        let (transactions, portfolio) = simulate_period(simulation_id, model, period)?;
        let emission = emit(&portfolio, &factors);
        let production = produce(electrolyzer, &portfolio);
        trace!(
            target: HOURLY_TARGET,
            "{period}: {} MWh, {} kg CO2, {} kg H2",
            portfolio.total_electricity, emission.amount_emitted, production.kg_hydrogen
        );

        state.record_period(tiers, &portfolio, transactions, emission, production);
    }

    let total_emitted: Co2Mass = state.emissions.iter().map(|e| e.amount_emitted).sum();
    let total_produced: H2Mass = state
        .hydrogen_production
        .iter()
        .map(|h| h.kg_hydrogen)
        .sum();
    let tax_credit = evaluate(total_emitted, total_produced, &params.tax_credit)?;

    let rate = params.finance.discount_rate;
    let discounting = params.finance.discounting;
    let replacements = replacement_count(
        params.time_range.duration_years(),
        electrolyzer.replacement_threshold,
        electrolyzer.degradation_rate,
    );
    let costs = CostBreakdown {
        capital: electrolyzer.capital_expenditure,
        operational: opex_total(
            electrolyzer.operational_expenditure,
            num_periods,
            rate,
            discounting,
        ),
        replacement: replacements * electrolyzer.replacement_cost * electrolyzer.capital_expenditure,
        energy: state.transactions.iter().map(|t| t.price).sum(),
    };
    let discounted_hydrogen = discounted_sum(
        state.hydrogen_production.iter().map(|h| h.kg_hydrogen),
        rate,
        discounting,
    );
    let lcoh = finance::lcoh(costs.capital, costs.operational, discounted_hydrogen)?;

    info!(
        "Simulation {simulation_id} complete: {total_produced} kg H2 at an intensity of {} kg \
        CO2/kg H2, earning ${} in tax credits",
        tax_credit.intensity, tax_credit.total
    );

    Ok(SimulationResult {
        simulation_id,
        electrolyzer_id: electrolyzer.id.clone(),
        tax_credit,
        emissions: state.emissions,
        hydrogen_production: state.hydrogen_production,
        transactions: state.transactions,
        periods: state.periods,
        tier_summary: state.tier_summary,
        revenue: tax_credit.total,
        costs,
        lcoh,
    })
}

/// Run the simulation and write its results.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
pub fn run(model: &Model, output_path: &Path) -> Result<SimulationResult> {
    write_metadata(output_path, model, DEFAULT_SIMULATION_ID).context("Failed to save metadata")?;

    let result = simulate(DEFAULT_SIMULATION_ID, model).context("Simulation failed")?;

    let mut writer = DataWriter::create(output_path)?;
    writer.write_result(&result, &model.parameters.tax_credit.tiers)?;
    writer.flush()?;

    Ok(result)
}
