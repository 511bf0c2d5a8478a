//! Simulation configuration
//!
//! Configuration is read from TOML. Every field has a default, so an empty
//! document is a valid configuration:
//!
//! ```toml
//! interval_ms = 200
//! max_substep = 0.2
//! max_history_len = 2000
//! initial_speed = 1.0
//!
//! [scenario.controls]
//! "Photosynthesis" = -0.5
//!
//! [scenario.direct_inputs]
//! "Fossil Fuel Combustion" = 10.0
//! ```
//!
//! Unlike live user input, a configuration file is a trusted boundary: unknown
//! process names are reported as errors rather than skipped.

use crate::simulation::MAX_SPEED;
use carbon_cycle_core::constants::{DEFAULT_MAX_SUBSTEP, MAX_HISTORY_LEN};
use carbon_cycle_core::errors::{CarbonCycleError, CarbonCycleResult};
use carbon_cycle_core::inputs::{ControlParameters, DirectInputFlows};
use carbon_cycle_core::integrator::IntegratorOptions;
use carbon_cycle_core::process::Process;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Wall-clock period between ticks unless configured otherwise
pub const DEFAULT_INTERVAL_MS: u64 = 200;

/// Initial control parameters and direct inputs, keyed by process display name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub controls: BTreeMap<String, f64>,
    pub direct_inputs: BTreeMap<String, f64>,
}

fn resolve_all(values: &BTreeMap<String, f64>) -> CarbonCycleResult<Vec<(Process, f64)>> {
    values
        .iter()
        .map(|(name, value)| Ok((Process::from_name(name)?, *value)))
        .collect()
}

impl Scenario {
    pub fn control_parameters(&self) -> CarbonCycleResult<ControlParameters> {
        Ok(resolve_all(&self.controls)?
            .into_iter()
            .fold(ControlParameters::new(), |c, (p, v)| c.with(p, v)))
    }

    pub fn direct_input_flows(&self) -> CarbonCycleResult<DirectInputFlows> {
        Ok(resolve_all(&self.direct_inputs)?
            .into_iter()
            .fold(DirectInputFlows::new(), |c, (p, v)| c.with(p, v)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wall-clock period of a tick
    /// unit: ms
    pub interval_ms: u64,
    /// Largest RK4 sub-step
    /// unit: yr
    pub max_substep: f64,
    /// Number of samples kept in the history
    pub max_history_len: usize,
    /// Simulated years per wall-clock second
    pub initial_speed: f64,
    pub scenario: Scenario,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            max_substep: DEFAULT_MAX_SUBSTEP,
            max_history_len: MAX_HISTORY_LEN,
            initial_speed: 1.0,
            scenario: Scenario::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml(text: &str) -> CarbonCycleResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CarbonCycleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> CarbonCycleResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> CarbonCycleResult<String> {
        toml::to_string(self).map_err(|e| CarbonCycleError::Config(e.to_string()))
    }

    /// Check that the configuration can drive a simulation.
    pub fn validate(&self) -> CarbonCycleResult<()> {
        if self.interval_ms == 0 {
            return Err(CarbonCycleError::InvalidConfig(
                "interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_history_len == 0 {
            return Err(CarbonCycleError::InvalidConfig(
                "max_history_len must be greater than zero".to_string(),
            ));
        }
        if !(self.initial_speed.is_finite()
            && (0.0..=MAX_SPEED).contains(&self.initial_speed))
        {
            return Err(CarbonCycleError::InvalidConfig(format!(
                "initial_speed must be between 0 and {}, got {}",
                MAX_SPEED, self.initial_speed
            )));
        }
        self.integrator_options()
            .map_err(|e| CarbonCycleError::InvalidConfig(e.to_string()))?;
        self.scenario.control_parameters()?;
        self.scenario.direct_input_flows()?;
        Ok(())
    }

    pub fn integrator_options(&self) -> CarbonCycleResult<IntegratorOptions> {
        IntegratorOptions::new(self.max_substep)
    }

    /// Simulated years covered by one tick at the given speed
    pub fn years_per_tick(&self, speed: f64) -> f64 {
        speed * (self.interval_ms as f64 / 1000.0)
    }
}
