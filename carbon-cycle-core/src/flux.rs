//! Flux calculator
//!
//! Converts control parameters and the current reservoir state into rate
//! coefficients and then into absolute flows.
//!
//! Two response curves are used, depending on the reference flow $F_0$ of the
//! process:
//!
//! - **Natural processes** ($F_0 > 0$): $a = a_0 e^{\theta p}$ where
//!   $a_0 = F_0 / Y_0[\text{source}]$ and $\theta = \ln 2$. The rate doubles for
//!   every unit of control and equals the baseline at $p = 0$.
//! - **Zero-reference processes** ($F_0 = 0$): $a = a_{seed} \max(0, e^{\theta p} - 1)$
//!   where $a_{seed} = F_{seed} / Y[\text{source}]$ uses the *current* stock. The
//!   process is inert until a positive control is applied.
//!
//! Human-controlled processes ignore the coefficient entirely; their flow is the
//! direct input clamped to be non-negative.

use crate::constants::THETA;
use crate::inputs::{ControlParameters, DirectInputFlows};
use crate::process::Process;
use crate::process_values::ProcessValues;
use crate::state::CarbonState;

/// Effective rate coefficient of every process
///
/// unit: 1 / yr
pub type RateCoefficients = ProcessValues;

/// Absolute flow of every process
///
/// unit: GtC / yr
pub type ProcessFlows = ProcessValues;

/// Exponential response to a control parameter, $e^{\theta p}$.
fn response(p: f64) -> f64 {
    (THETA * p).exp()
}

/// Effective rate coefficient of a single process.
pub fn effective_rate_coefficient(process: Process, p: f64, state: &CarbonState) -> f64 {
    if process.reference_flow() > 0.0 {
        process.baseline_coefficient() * response(p)
    } else {
        let source_stock = state[process.source()];
        let seed_coefficient = if source_stock > 0.0 {
            process.seed_flow() / source_stock
        } else {
            0.0
        };
        seed_coefficient * (response(p) - 1.0).max(0.0)
    }
}

/// Effective rate coefficients for every process given the current state.
pub fn effective_rate_coefficients(
    controls: &ControlParameters,
    state: &CarbonState,
) -> RateCoefficients {
    RateCoefficients::from_fn(|process| {
        effective_rate_coefficient(process, controls.get(process), state)
    })
}

/// Absolute flows for every process.
///
/// Human-controlled processes take `max(0, direct input)`; all others are
/// `coefficient * stock[source]`.
pub fn flows(
    coefficients: &RateCoefficients,
    state: &CarbonState,
    direct_inputs: &DirectInputFlows,
) -> ProcessFlows {
    ProcessFlows::from_fn(|process| {
        if process.is_human_controlled() {
            direct_inputs.get(process).max(0.0)
        } else {
            coefficients[process] * state[process.source()]
        }
    })
}

/// Convenience wrapper computing coefficients and flows in one call.
///
/// This is the diagnostic operation used by displays: the flows that would
/// act on `state` under the given inputs.
pub fn compute_flows(
    controls: &ControlParameters,
    state: &CarbonState,
    direct_inputs: &DirectInputFlows,
) -> ProcessFlows {
    flows(
        &effective_rate_coefficients(controls, state),
        state,
        direct_inputs,
    )
}
