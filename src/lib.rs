//! Simulation of grid-powered hydrogen electrolysis and its 45V tax credit.
#![warn(missing_docs)]
pub mod cli;
pub mod electrolyzer;
pub mod emission;
pub mod error;
pub mod finance;
pub mod hydrogen;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod plant;
pub mod portfolio;
pub mod settings;
pub mod simulation;
pub mod tax_credit;
pub mod time;
pub mod transaction;
pub mod units;

#[cfg(test)]
mod fixture;
