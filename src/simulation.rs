//! Headless simulation driver
//!
//! [`Simulation`] owns the authoritative state and threads it through the pure
//! numerical core once per tick. A front end calls [`Simulation::tick`] from a
//! fixed-period timer and renders [`Simulation::state`], [`Simulation::history`]
//! and [`Simulation::flows`]. Playback speed scales the simulated years per tick
//! rather than the tick frequency.

use crate::config::SimulationConfig;
use carbon_cycle_core::errors::CarbonCycleResult;
use carbon_cycle_core::flux::{compute_flows, ProcessFlows};
use carbon_cycle_core::history::History;
use carbon_cycle_core::inputs::{ControlParameters, DirectInputFlows};
use carbon_cycle_core::integrator::{Integrator, Time};
use carbon_cycle_core::process::Process;
use carbon_cycle_core::reservoir::Reservoir;
use carbon_cycle_core::state::CarbonState;
use log::{debug, warn};

/// Fastest playback speed, in simulated years per wall-clock second
pub const MAX_SPEED: f64 = 50.0;

/// Most ticks a single [`Simulation::run_for`] call will take
pub const MAX_RUN_TICKS: usize = 100_000;

/// Playback speed used when none is given or the given value is unusable
pub const DEFAULT_SPEED: f64 = 1.0;

/// Clamp a speed to `[0, MAX_SPEED]`. Non-finite values become [`DEFAULT_SPEED`].
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.clamp(0.0, MAX_SPEED)
    } else {
        DEFAULT_SPEED
    }
}

/// Parse a speed entered as text, falling back to [`DEFAULT_SPEED`].
pub fn parse_speed(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(speed) => clamp_speed(speed),
        Err(_) => {
            warn!("Could not parse speed '{}'; using {}", raw, DEFAULT_SPEED);
            DEFAULT_SPEED
        }
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    integrator: Integrator,
    state: CarbonState,
    time: Time,
    history: History,
    controls: ControlParameters,
    direct_inputs: DirectInputFlows,
    speed: f64,
    running: bool,
}

impl Simulation {
    /// Create a simulation at the initial state using a validated configuration.
    pub fn new(config: SimulationConfig) -> CarbonCycleResult<Self> {
        config.validate()?;
        let integrator = Integrator::new(config.integrator_options()?);
        let controls = config.scenario.control_parameters()?;
        let direct_inputs = config.scenario.direct_input_flows()?;
        let state = CarbonState::initial();

        Ok(Self {
            history: History::with_capacity_limit(config.max_history_len).push(0.0, &state),
            speed: clamp_speed(config.initial_speed),
            config,
            integrator,
            state,
            time: 0.0,
            controls,
            direct_inputs,
            running: true,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &CarbonState {
        &self.state
    }

    /// Simulated time since the start or last reset
    /// unit: yr
    pub fn time(&self) -> Time {
        self.time
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn controls(&self) -> &ControlParameters {
        &self.controls
    }

    pub fn direct_inputs(&self) -> &DirectInputFlows {
        &self.direct_inputs
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = clamp_speed(speed);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn set_control(&mut self, process: Process, p: f64) {
        self.controls.set(process, p);
    }

    pub fn set_direct_input(&mut self, process: Process, flow: f64) {
        if !process.is_human_controlled() {
            debug!(
                "Direct input for '{}' stored but has no effect; it is not human-controlled",
                process
            );
        }
        self.direct_inputs.set(process, flow);
    }

    /// Simulated years covered by one tick at the current speed
    pub fn years_per_tick(&self) -> Time {
        self.config.years_per_tick(self.speed)
    }

    /// Advance the simulation by one tick.
    ///
    /// Returns `false` without doing anything if paused or at zero speed.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.speed == 0.0 {
            return false;
        }

        let elapsed = self.years_per_tick();
        self.state = self
            .integrator
            .advance(&self.state, &self.controls, &self.direct_inputs, elapsed);
        self.time += elapsed;
        self.history = self.history.push(self.time, &self.state);

        debug!(
            "t={:.2} yr: atmosphere={:.1} GtC, fossil fuels={:.1} GtC",
            self.time,
            self.state[Reservoir::Atmosphere],
            self.state[Reservoir::FossilFuels]
        );
        true
    }

    /// Number of ticks needed to cover `years` at the current speed.
    ///
    /// Zero when paused or at zero speed, and never more than [`MAX_RUN_TICKS`].
    pub fn ticks_for(&self, years: Time) -> usize {
        let per_tick = self.years_per_tick();
        if !self.running || per_tick <= 0.0 || years <= 0.0 || !years.is_finite() {
            return 0;
        }

        let n = (years / per_tick).ceil();
        if n > MAX_RUN_TICKS as f64 {
            warn!(
                "Running {} yr would take {} ticks; capped at {}",
                years, n, MAX_RUN_TICKS
            );
            MAX_RUN_TICKS
        } else {
            n as usize
        }
    }

    /// Tick until at least `years` of simulated time have passed.
    ///
    /// Returns the number of ticks taken, see [`Self::ticks_for`].
    pub fn run_for(&mut self, years: Time) -> usize {
        let n = self.ticks_for(years);
        for _ in 0..n {
            self.tick();
        }
        n
    }

    /// Flows acting on the current state, for display
    ///
    /// unit: GtC / yr
    pub fn flows(&self) -> ProcessFlows {
        compute_flows(&self.controls, &self.state, &self.direct_inputs)
    }

    /// Return to the initial state with all controls and inputs zeroed.
    pub fn reset(&mut self) {
        self.state = CarbonState::initial();
        self.time = 0.0;
        self.history = History::with_capacity_limit(self.config.max_history_len)
            .push(0.0, &self.state);
        self.speed = DEFAULT_SPEED;
        self.running = true;
        self.controls = ControlParameters::default();
        self.direct_inputs = DirectInputFlows::default();
        debug!("Simulation reset");
    }
}

impl Default for Simulation {
    fn default() -> Self {
        let config = SimulationConfig::default();
        Self {
            integrator: Integrator::default(),
            state: CarbonState::initial(),
            time: 0.0,
            history: History::with_capacity_limit(config.max_history_len)
                .push(0.0, &CarbonState::initial()),
            controls: ControlParameters::default(),
            direct_inputs: DirectInputFlows::default(),
            speed: DEFAULT_SPEED,
            running: true,
            config,
        }
    }
}
