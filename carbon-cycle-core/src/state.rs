//! Reservoir state
//!
//! A [`CarbonState`] always holds a stock for every reservoir. It is replaced
//! wholesale by the integrator and never partially updated.

use crate::constants::INITIAL_STOCKS;
use crate::errors::CarbonCycleError;
use crate::reservoir::{Reservoir, N_RESERVOIRS};
use nalgebra::SVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

/// Vector representation of a state used by the ODE solver
pub type StateVector = SVector<f64, N_RESERVOIRS>;

/// Stock of carbon in every reservoir
///
/// unit: GtC
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Reservoir, f64>",
    into = "BTreeMap<Reservoir, f64>"
)]
pub struct CarbonState {
    stocks: [f64; N_RESERVOIRS],
}

impl CarbonState {
    /// Create a state from stocks given in [`Reservoir::ALL`] order.
    pub const fn from_stocks(stocks: [f64; N_RESERVOIRS]) -> Self {
        Self { stocks }
    }

    /// The initial, near-equilibrium state of the model
    pub const fn initial() -> Self {
        Self::from_stocks(INITIAL_STOCKS)
    }

    pub fn get(&self, reservoir: Reservoir) -> f64 {
        self.stocks[reservoir.index()]
    }

    /// Return a copy of this state with one reservoir replaced.
    pub fn with(mut self, reservoir: Reservoir, stock: f64) -> Self {
        self.stocks[reservoir.index()] = stock;
        self
    }

    /// Sum of all stocks
    pub fn total(&self) -> f64 {
        self.stocks.iter().sum()
    }

    pub fn stocks(&self) -> &[f64; N_RESERVOIRS] {
        &self.stocks
    }

    /// Iterate over `(reservoir, stock)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Reservoir, f64)> + '_ {
        Reservoir::ALL.iter().map(move |r| (*r, self.stocks[r.index()]))
    }

    pub fn to_vector(&self) -> StateVector {
        StateVector::from_row_slice(&self.stocks)
    }

    pub fn from_vector(vector: &StateVector) -> Self {
        let mut stocks = [0.0; N_RESERVOIRS];
        stocks.copy_from_slice(vector.as_slice());
        Self { stocks }
    }
}

impl Default for CarbonState {
    fn default() -> Self {
        Self::initial()
    }
}

impl Index<Reservoir> for CarbonState {
    type Output = f64;

    fn index(&self, reservoir: Reservoir) -> &Self::Output {
        &self.stocks[reservoir.index()]
    }
}

impl IndexMut<Reservoir> for CarbonState {
    fn index_mut(&mut self, reservoir: Reservoir) -> &mut Self::Output {
        &mut self.stocks[reservoir.index()]
    }
}

impl From<CarbonState> for BTreeMap<Reservoir, f64> {
    fn from(state: CarbonState) -> Self {
        state.iter().collect()
    }
}

impl TryFrom<BTreeMap<Reservoir, f64>> for CarbonState {
    type Error = CarbonCycleError;

    fn try_from(values: BTreeMap<Reservoir, f64>) -> Result<Self, Self::Error> {
        let mut stocks = [0.0; N_RESERVOIRS];
        for reservoir in Reservoir::ALL {
            stocks[reservoir.index()] = *values.get(&reservoir).ok_or_else(|| {
                CarbonCycleError::Error(format!("Missing stock for reservoir {}", reservoir))
            })?;
        }
        Ok(Self { stocks })
    }
}
