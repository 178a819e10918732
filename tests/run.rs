//! Integration tests for the `run` command.
use h2sim::cli::{RunOpts, handle_run_command};
use h2sim::settings::Settings;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the demo model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/gas_plant")
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("H2SIM_LOG_LEVEL", "off") };

    // Save results to non-existent directory to check that directory creation works
    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
    };
    handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).unwrap();

    for file_name in [
        "emissions.csv",
        "hydrogen_production.csv",
        "transactions.csv",
        "periods.csv",
        "credit_tiers.csv",
        "summary.toml",
        "metadata.toml",
        "h2sim.log",
    ] {
        assert!(output_dir.join(file_name).is_file(), "Missing {file_name}");
    }

    // Second time will fail because the output folder is no longer empty
    assert!(handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).is_err());

    // Overwriting gets past the output folder, but logging is already initialised
    let opts = RunOpts {
        overwrite: true,
        ..opts
    };
    assert_eq!(
        handle_run_command(&get_model_dir(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}
