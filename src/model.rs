//! The model represents the static input data provided by the user.
use crate::electrolyzer::Electrolyzer;
use crate::plant::PowerPlantMap;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::{
    EmissionsParameters, FinanceParameters, ModelParameters, PurchasingParameters,
};

/// Model definition
#[derive(Debug)]
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// The electrolyzer being simulated
    pub electrolyzer: Electrolyzer,
    /// The plants the electrolyzer buys electricity from
    pub plants: PowerPlantMap,
}
