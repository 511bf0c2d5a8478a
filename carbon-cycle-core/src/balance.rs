//! Balance accumulator
//!
//! Turns per-process flows into the net rate of change of every reservoir:
//!
//! $$\frac{dY_r}{dt} = \sum_{sink = r} F - \sum_{source = r} F$$

use crate::flux::ProcessFlows;
use crate::reservoir::{Reservoir, N_RESERVOIRS};
use crate::state::CarbonState;
use std::collections::BTreeMap;

/// Sum of flows per `(sink, source)` pair.
///
/// Several processes may connect the same pair of reservoirs; their flows are
/// added together.
pub fn pair_flows(flows: &ProcessFlows) -> BTreeMap<(Reservoir, Reservoir), f64> {
    let mut pairs = BTreeMap::new();
    for (process, flow) in flows.iter() {
        *pairs.entry((process.sink(), process.source())).or_insert(0.0) += flow;
    }
    pairs
}

/// Net time derivative of every reservoir.
///
/// Reservoirs with no incident flows have a derivative of zero. The result is
/// returned as a [`CarbonState`] holding rates rather than stocks.
///
/// unit: GtC / yr
pub fn derivatives(flows: &ProcessFlows) -> CarbonState {
    let mut inflow = CarbonState::from_stocks([0.0; N_RESERVOIRS]);
    let mut outflow = inflow;

    for ((sink, source), flow) in pair_flows(flows) {
        inflow[sink] += flow;
        outflow[source] += flow;
    }

    let mut dy_dt = inflow;
    for reservoir in Reservoir::ALL {
        dy_dt[reservoir] = inflow[reservoir] - outflow[reservoir];
    }
    dy_dt
}
