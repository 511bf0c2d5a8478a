//! Seven-reservoir carbon cycle simulator
//!
//! The numerical model lives in [`carbon_cycle_core`] and is re-exported here as
//! [`model`]. This crate adds the headless [`simulation::Simulation`] driver and
//! TOML configuration.

pub mod config;
pub mod simulation;

pub use carbon_cycle_core as model;
pub use carbon_cycle_core::errors::{CarbonCycleError, CarbonCycleResult};
pub use config::SimulationConfig;
pub use simulation::Simulation;
