//! Scenario tests for whole simulation runs.
use float_cmp::assert_approx_eq;
use h2sim::error::SimulationError;
use h2sim::input::load_model;
use h2sim::model::Model;
use h2sim::simulation::simulate;
use h2sim::units::{Co2Mass, H2Mass, Money, MoneyPerH2Mass};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

const ELECTROLYZER: &str = r#"
id = "pem1"
capacity_mw = 1.0
degradation_rate = 0.02
replacement_threshold = 0.8
capital_expenditure = 1150.0
operational_expenditure = 0.5
replacement_cost = 0.5

[production]
type = "constant"
conversion_rate = 50.0
"#;

/// Get the path to the bundled demo model.
fn get_model_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("gas_plant")
}

/// Write a model covering the first day of July 2023 to a temporary folder
fn write_model(
    amount_mwh: f64,
    end_day: u32,
    plants: &str,
    generation: &str,
) -> TempDir {
    let dir = tempdir().unwrap();
    let write = |name: &str, contents: &str| fs::write(dir.path().join(name), contents).unwrap();

    write(
        "model.toml",
        &format!(
            "[time_range]
start = {{ year = 2023, month = 7, day = 1 }}
end = {{ year = 2023, month = 7, day = {end_day} }}

[purchasing]
period_granularity = \"monthly\"
amount_mwh = {amount_mwh:?}
"
        ),
    );
    write("electrolyzer.toml", ELECTROLYZER);
    write("power_plants.csv", plants);
    write("plant_generation.csv", generation);

    dir
}

fn load(dir: &TempDir) -> Model {
    load_model(dir.path()).unwrap()
}

#[test]
fn test_demo_model() {
    let model = load_model(get_model_dir()).unwrap();
    let result = simulate(1, &model).unwrap();

    // July and August 2023
    assert_eq!(result.periods.len(), 1488);
    assert_eq!(result.transactions.len(), 1488);

    // 20 kg of hydrogen from each MWh
    assert_approx_eq!(
        H2Mass,
        result.total_produced(),
        H2Mass(29_760.0),
        epsilon = 1e-6
    );

    // $2/MWh in July and $3/MWh in August
    assert_approx_eq!(Money, result.costs.energy, Money(3720.0), epsilon = 1e-6);

    // August fuel use is given in MCF
    let july = 744.0 * 15.706_68 * 53.0703;
    let august = 744.0 * (15_161.0 * 1.036 / 1000.0) * 53.0703;
    assert_approx_eq!(
        Co2Mass,
        result.total_emitted(),
        Co2Mass(july + august),
        epsilon = 1e-4
    );

    // Gas-fired hydrogen is far too dirty for any credit
    assert!(result.tax_credit.tier.is_none());
    assert_eq!(result.revenue, Money(0.0));
    assert_eq!(result.tier_summary.no_credit_hours(), 1488);
    assert!(result.lcoh > MoneyPerH2Mass(0.0));
}

#[test]
fn test_clean_plant_earns_maximum_credit() {
    let dir = write_model(
        1.0,
        2,
        "plant_id,energy_source,heat_rate\nwind1,wind,",
        "plant_id,timestamp,amount_mwh,sale_price_usd_per_mwh\nwind1,2023-07-01,500.0,1.0",
    );
    let result = simulate(1, &load(&dir)).unwrap();

    assert_eq!(result.total_emitted(), Co2Mass(0.0));
    assert_eq!(result.tier_summary.tier_hours(), [0, 0, 0, 24]);
    assert_approx_eq!(
        MoneyPerH2Mass,
        result.tax_credit.amount_per_kg,
        MoneyPerH2Mass(3.0)
    );
    assert_approx_eq!(Money, result.revenue, Money(3.0 * 480.0), epsilon = 1e-9);
}

#[test]
fn test_hydrogen_output_is_capped_by_capacity() {
    let dir = write_model(
        5.0,
        2,
        "plant_id,energy_source,heat_rate\nwind1,wind,",
        "plant_id,timestamp,amount_mwh,sale_price_usd_per_mwh\nwind1,2023-07-01,500.0,1.0",
    );
    let result = simulate(1, &load(&dir)).unwrap();

    // 5 MWh bought each hour, but only 1 MWh can be used
    assert_approx_eq!(
        H2Mass,
        result.average_produced_per_hour(),
        H2Mass(20.0),
        epsilon = 1e-9
    );
    assert_approx_eq!(Money, result.costs.energy, Money(120.0), epsilon = 1e-9);
}

#[test]
fn test_mixed_plants_share_one_portfolio() {
    let dir = write_model(
        1.0,
        2,
        "plant_id,energy_source,heat_rate\nwind1,wind,\ngas1,natural_gas,7.5",
        "plant_id,timestamp,amount_mwh,sale_price_usd_per_mwh\n\
        wind1,2023-07-01,500.0,1.0\n\
        gas1,2023-07-01,500.0,2.0",
    );
    let result = simulate(1, &load(&dir)).unwrap();

    assert_eq!(result.transactions.len(), 48);
    assert_eq!(result.periods.len(), 24);

    // 2 MWh each hour, but the electrolyzer can only use 1 MWh
    assert_approx_eq!(
        H2Mass,
        result.total_produced(),
        H2Mass(480.0),
        epsilon = 1e-9
    );

    // 7.5 MMBtu per hour from the gas plant
    let per_hour = 7.5 * 53.0703;
    assert_approx_eq!(
        Co2Mass,
        result.average_emitted_per_hour(),
        Co2Mass(per_hour),
        epsilon = 1e-9
    );
    assert_approx_eq!(Money, result.costs.energy, Money(72.0), epsilon = 1e-9);
}

#[test]
fn test_no_generation_aborts_run() {
    // Plant only reports generation for July but the run extends into August
    let dir = write_model(
        1.0,
        2,
        "plant_id,energy_source,heat_rate\nwind1,wind,",
        "plant_id,timestamp,amount_mwh,sale_price_usd_per_mwh\nwind1,2023-07-01,500.0,1.0",
    );
    let mut model = load(&dir);
    let time_range = &mut model.parameters.time_range;
    time_range.end = time_range.start + chrono::TimeDelta::days(40);

    assert!(matches!(
        simulate(1, &model),
        Err(SimulationError::NoMatchingPeriod { .. })
    ));
}

#[test]
fn test_enforced_generation_limit() {
    let dir = write_model(
        10.0,
        2,
        "plant_id,energy_source,heat_rate\nwind1,wind,",
        "plant_id,timestamp,amount_mwh,sale_price_usd_per_mwh\nwind1,2023-07-01,5.0,1.0",
    );
    let mut model = load(&dir);
    assert!(simulate(1, &model).is_ok());

    model.parameters.purchasing.enforce_generation_limit = true;
    assert!(matches!(
        simulate(1, &model),
        Err(SimulationError::InsufficientGeneration { .. })
    ));
}
