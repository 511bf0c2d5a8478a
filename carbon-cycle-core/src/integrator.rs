//! Integrator
//!
//! Advances the reservoir state with fixed-size fourth-order Runge-Kutta
//! sub-steps. After every sub-step, negative stocks are clamped to zero and the
//! state is rescaled so that it sums to [`TOTAL_CARBON`].
//!
//! The right-hand side is exposed to `ode_solvers` through [`CarbonCycleSystem`],
//! which recomputes rate coefficients at every stage because the coefficients of
//! zero-reference processes depend on the live stock of their source.
//!
//! `advance` never fails. Anomalies are logged and the state is carried forward
//! so that a real-time driver is never interrupted.

use crate::balance::derivatives;
use crate::constants::{DEFAULT_MAX_SUBSTEP, TOTAL_CARBON};
use crate::errors::{CarbonCycleError, CarbonCycleResult};
use crate::flux::compute_flows;
use crate::inputs::{ControlParameters, DirectInputFlows};
use crate::state::{CarbonState, StateVector};
use log::warn;
use ode_solvers::dop_shared::SolverResult;
use ode_solvers::{Rk4, System};
use serde::{Deserialize, Serialize};

/// Time in years
pub type Time = f64;

/// The carbon cycle ODE system under fixed inputs
///
/// $$\frac{dY}{dt} = \text{derivatives}(\text{flows}(a(p, Y), Y, F_{direct}))$$
pub struct CarbonCycleSystem<'a> {
    controls: &'a ControlParameters,
    direct_inputs: &'a DirectInputFlows,
}

impl<'a> CarbonCycleSystem<'a> {
    pub fn new(controls: &'a ControlParameters, direct_inputs: &'a DirectInputFlows) -> Self {
        Self {
            controls,
            direct_inputs,
        }
    }

    /// Instantaneous rate of change of every reservoir
    pub fn dy_dt(&self, state: &CarbonState) -> CarbonState {
        derivatives(&compute_flows(self.controls, state, self.direct_inputs))
    }
}

impl System<Time, StateVector> for CarbonCycleSystem<'_> {
    fn system(&self, _t: Time, y: &StateVector, dy: &mut StateVector) {
        let rates = self.dy_dt(&CarbonState::from_vector(y));
        dy.copy_from_slice(rates.stocks());
    }
}

/// Last value in a solver result
fn get_last_step(results: &SolverResult<Time, StateVector>) -> Option<&StateVector> {
    let (_, y) = results.get();
    y.last()
}

/// Clamp negative stocks to zero and rescale to conserve total carbon.
///
/// If the clamped total is not positive the rescale is skipped.
pub fn conserve_mass(state: CarbonState) -> CarbonState {
    let mut stocks = *state.stocks();
    for stock in stocks.iter_mut() {
        if *stock < 0.0 {
            *stock = 0.0;
        }
    }

    let total: f64 = stocks.iter().sum();
    if total > 0.0 {
        let correction = TOTAL_CARBON / total;
        for stock in stocks.iter_mut() {
            *stock *= correction;
        }
    }
    CarbonState::from_stocks(stocks)
}

/// A single RK4 step of size `dt` followed by clamping and mass renormalisation.
pub fn rk4_step(
    state: &CarbonState,
    controls: &ControlParameters,
    dt: Time,
    direct_inputs: &DirectInputFlows,
) -> CarbonState {
    let system = CarbonCycleSystem::new(controls, direct_inputs);
    let mut solver = Rk4::new(system, 0.0, state.to_vector(), dt, dt);

    if let Err(e) = solver.integrate() {
        warn!("RK4 step of {} yr failed ({:?}); state carried forward", dt, e);
        return *state;
    }

    match get_last_step(solver.results()) {
        Some(y) => conserve_mass(CarbonState::from_vector(y)),
        None => {
            warn!("RK4 step of {} yr produced no output; state carried forward", dt);
            *state
        }
    }
}

/// Options controlling the integration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegratorOptions {
    /// Largest sub-step taken
    /// unit: yr
    pub max_substep: Time,
}

impl IntegratorOptions {
    pub fn new(max_substep: Time) -> CarbonCycleResult<Self> {
        if max_substep.is_finite() && max_substep > 0.0 {
            Ok(Self { max_substep })
        } else {
            Err(CarbonCycleError::InvalidSubstep(max_substep))
        }
    }
}

impl Default for IntegratorOptions {
    fn default() -> Self {
        Self {
            max_substep: DEFAULT_MAX_SUBSTEP,
        }
    }
}

/// Fixed-step sub-stepped RK4 integrator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Integrator {
    options: IntegratorOptions,
}

impl Integrator {
    pub fn new(options: IntegratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IntegratorOptions {
        &self.options
    }

    /// Number of sub-steps and their size for a span of `elapsed_years`.
    ///
    /// `n = ceil(elapsed / max_substep)` equal steps, so each step is no larger
    /// than `max_substep`.
    pub fn substeps(&self, elapsed_years: Time) -> (usize, Time) {
        let n = ((elapsed_years / self.options.max_substep).ceil() as usize).max(1);
        (n, elapsed_years / n as Time)
    }

    /// Advance `state` by `elapsed_years`.
    ///
    /// A non-positive span returns the state unchanged.
    pub fn advance(
        &self,
        state: &CarbonState,
        controls: &ControlParameters,
        direct_inputs: &DirectInputFlows,
        elapsed_years: Time,
    ) -> CarbonState {
        if elapsed_years <= 0.0 {
            return *state;
        }
        if !elapsed_years.is_finite() {
            warn!("Cannot advance by {} yr; state left unchanged", elapsed_years);
            return *state;
        }

        let (n, dt) = self.substeps(elapsed_years);
        (0..n).fold(*state, |current, _| {
            rk4_step(&current, controls, dt, direct_inputs)
        })
    }
}

/// Advance `state` by `elapsed_years` using sub-steps no larger than `max_substep`.
///
/// An invalid `max_substep` falls back to [`DEFAULT_MAX_SUBSTEP`].
pub fn advance(
    state: &CarbonState,
    controls: &ControlParameters,
    direct_inputs: &DirectInputFlows,
    elapsed_years: Time,
    max_substep: Time,
) -> CarbonState {
    let options = IntegratorOptions::new(max_substep).unwrap_or_else(|e| {
        warn!("{}; using {} yr", e, DEFAULT_MAX_SUBSTEP);
        IntegratorOptions::default()
    });
    Integrator::new(options).advance(state, controls, direct_inputs, elapsed_years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Process;
    use crate::reservoir::Reservoir;
    use approx::assert_relative_eq;

    fn no_inputs() -> (ControlParameters, DirectInputFlows) {
        (ControlParameters::default(), DirectInputFlows::default())
    }

    #[test]
    fn zero_elapsed_is_identity() {
        let (controls, inputs) = no_inputs();
        let state = CarbonState::initial().with(Reservoir::Soil, 1234.5);
        let next = advance(&state, &controls, &inputs, 0.0, DEFAULT_MAX_SUBSTEP);
        assert_eq!(next, state);

        let next = advance(&state, &controls, &inputs, -1.0, DEFAULT_MAX_SUBSTEP);
        assert_eq!(next, state);
    }

    #[test]
    fn substep_count() {
        let integrator = Integrator::default();
        let (n, dt) = integrator.substeps(1.0);
        assert_eq!(n, 5);
        assert_relative_eq!(dt, 0.2);

        let (n, dt) = integrator.substeps(0.05);
        assert_eq!(n, 1);
        assert_eq!(dt, 0.05);

        let (n, dt) = integrator.substeps(0.5);
        assert_eq!(n, 3);
        assert!(dt <= 0.2);
    }

    #[test]
    fn invalid_substep_is_rejected() {
        assert!(matches!(
            IntegratorOptions::new(0.0),
            Err(CarbonCycleError::InvalidSubstep(_))
        ));
        assert!(IntegratorOptions::new(f64::NAN).is_err());
        assert!(IntegratorOptions::new(-0.1).is_err());
        assert!(IntegratorOptions::new(0.1).is_ok());
    }

    #[test]
    fn invalid_substep_falls_back_to_default() {
        let (controls, inputs) = no_inputs();
        let state = CarbonState::initial();
        let fallback = advance(&state, &controls, &inputs, 1.0, -3.0);
        let expected = advance(&state, &controls, &inputs, 1.0, DEFAULT_MAX_SUBSTEP);
        assert_eq!(fallback, expected);
    }

    #[test]
    fn infinite_elapsed_is_ignored() {
        let (controls, inputs) = no_inputs();
        let state = CarbonState::initial();
        assert_eq!(advance(&state, &controls, &inputs, f64::INFINITY, 0.2), state);
    }

    #[test]
    fn conserve_mass_clamps_and_rescales() {
        let state = CarbonState::initial()
            .with(Reservoir::Vegetation, -10.0)
            .with(Reservoir::Rock, 1.0e8 + 100.0);
        let fixed = conserve_mass(state);
        assert!(fixed[Reservoir::Vegetation] >= 0.0);
        assert_eq!(fixed[Reservoir::Vegetation], 0.0);
        assert_relative_eq!(fixed.total(), TOTAL_CARBON, max_relative = 1e-12);
    }

    #[test]
    fn conserve_mass_skips_degenerate_total() {
        let state = CarbonState::from_stocks([-1.0, 0.0, 0.0, 0.0, 0.0, -5.0, 0.0]);
        let fixed = conserve_mass(state);
        assert_eq!(fixed.total(), 0.0);
        for (_, stock) in fixed.iter() {
            assert_eq!(stock, 0.0);
        }
    }

    #[test]
    fn rk4_step_matches_hand_rolled_stages() {
        let controls = ControlParameters::new().with(Process::FossilFuelFormation, 1.5);
        let inputs = DirectInputFlows::new().with(Process::FossilFuelCombustion, 10.0);
        let state = CarbonState::initial();
        let dt = 0.2;

        let system = CarbonCycleSystem::new(&controls, &inputs);
        let y = state.to_vector();
        let f = |v: &StateVector| system.dy_dt(&CarbonState::from_vector(v)).to_vector();
        let k1 = f(&y);
        let k2 = f(&(y + k1 * (dt / 2.0)));
        let k3 = f(&(y + k2 * (dt / 2.0)));
        let k4 = f(&(y + k3 * dt));
        let expected = conserve_mass(CarbonState::from_vector(
            &(y + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)),
        ));

        let actual = rk4_step(&state, &controls, dt, &inputs);
        for reservoir in Reservoir::ALL {
            assert_relative_eq!(
                actual[reservoir],
                expected[reservoir],
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn fossil_combustion_moves_carbon_to_atmosphere() {
        let controls = ControlParameters::default();
        let inputs = DirectInputFlows::new().with(Process::FossilFuelCombustion, 10.0);
        let state = CarbonState::initial();

        let next = advance(&state, &controls, &inputs, 1.0, DEFAULT_MAX_SUBSTEP);
        assert!(next[Reservoir::FossilFuels] < state[Reservoir::FossilFuels]);
        assert!(next[Reservoir::Atmosphere] > state[Reservoir::Atmosphere] - 3.5);
        assert_relative_eq!(next.total(), TOTAL_CARBON, max_relative = 1e-9);
    }
}
