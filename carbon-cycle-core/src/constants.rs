//! Model constants
//!
//! Initial stocks are in GtC and flows in GtC/yr.

use crate::reservoir::N_RESERVOIRS;

/// Initial stock of each reservoir, in [`Reservoir::ALL`](crate::reservoir::Reservoir::ALL) order.
///
/// unit: GtC
pub const INITIAL_STOCKS: [f64; N_RESERVOIRS] = [
    750.0,         // Atmosphere
    610.0,         // Vegetation
    1580.0,        // Soil
    1020.0,        // Ocean surface
    38100.0,       // Deep ocean
    4000.0,        // Fossil fuels
    100_000_000.0, // Sedimentary rock
];

/// Total carbon in the system. Every state returned by the integrator sums to this value.
///
/// unit: GtC
pub const TOTAL_CARBON: f64 = INITIAL_STOCKS[0]
    + INITIAL_STOCKS[1]
    + INITIAL_STOCKS[2]
    + INITIAL_STOCKS[3]
    + INITIAL_STOCKS[4]
    + INITIAL_STOCKS[5]
    + INITIAL_STOCKS[6];

/// Exponential response constant: `p = +1` doubles a rate, `p = -1` halves it.
pub const THETA: f64 = std::f64::consts::LN_2;

/// Seed flow used by zero-reference processes without an explicit seed.
///
/// unit: GtC / yr
pub const DEFAULT_SEED_FLOW: f64 = 0.1;

/// Largest RK4 sub-step taken by the integrator unless configured otherwise.
///
/// unit: yr
pub const DEFAULT_MAX_SUBSTEP: f64 = 0.2;

/// Number of samples retained by a [`History`](crate::history::History) by default.
pub const MAX_HISTORY_LEN: usize = 2000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_carbon_is_sum_of_initial_stocks() {
        let total: f64 = INITIAL_STOCKS.iter().sum();
        assert_eq!(TOTAL_CARBON, total);
        assert_eq!(TOTAL_CARBON, 100_046_060.0);
    }

    #[test]
    fn theta_doubles() {
        assert!((THETA.exp() - 2.0).abs() < 1e-12);
    }
}
