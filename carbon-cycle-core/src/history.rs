//! History buffer
//!
//! A bounded, time-ordered log of reservoir states held as parallel series, one
//! for time and one per reservoir. Pushing returns a new buffer; once the buffer
//! is full the oldest samples are dropped.

use crate::constants::MAX_HISTORY_LEN;
use crate::errors::CarbonCycleError;
use crate::integrator::Time;
use crate::reservoir::{Reservoir, N_RESERVOIRS};
use crate::state::CarbonState;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHistory")]
pub struct History {
    max_len: usize,
    times: Vec<Time>,
    series: [Vec<f64>; N_RESERVOIRS],
}

/// Unvalidated serialised form of a [`History`]
#[derive(Deserialize)]
struct RawHistory {
    max_len: usize,
    times: Vec<Time>,
    series: [Vec<f64>; N_RESERVOIRS],
}

impl TryFrom<RawHistory> for History {
    type Error = CarbonCycleError;

    /// Every series must match the time axis and the bound must be positive.
    /// Samples beyond the bound are dropped, oldest first.
    fn try_from(raw: RawHistory) -> Result<Self, Self::Error> {
        if raw.max_len == 0 {
            return Err(CarbonCycleError::Error(
                "History max_len must be greater than zero".to_string(),
            ));
        }
        for (reservoir, values) in Reservoir::ALL.iter().zip(raw.series.iter()) {
            if values.len() != raw.times.len() {
                return Err(CarbonCycleError::Error(format!(
                    "History series for {} has {} samples but there are {} times",
                    reservoir,
                    values.len(),
                    raw.times.len()
                )));
            }
        }

        let mut history = Self {
            max_len: raw.max_len,
            times: raw.times,
            series: raw.series,
        };
        history.truncate();
        Ok(history)
    }
}

impl History {
    /// Create a history seeded with a single sample and the default bound.
    pub fn new(time: Time, state: &CarbonState) -> Self {
        Self::with_capacity_limit(MAX_HISTORY_LEN).push(time, state)
    }

    /// Create an empty history retaining at most `max_len` samples.
    ///
    /// A bound of zero is treated as one.
    pub fn with_capacity_limit(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
            times: Vec::new(),
            series: Default::default(),
        }
    }

    /// Append a sample, returning the new buffer.
    ///
    /// `self` is left untouched.
    pub fn push(&self, time: Time, state: &CarbonState) -> Self {
        let mut next = self.clone();
        next.times.push(time);
        for (reservoir, stock) in state.iter() {
            next.series[reservoir.index()].push(stock);
        }
        next.truncate();
        next
    }

    fn truncate(&mut self) {
        let excess = self.times.len().saturating_sub(self.max_len);
        if excess > 0 {
            self.times = self.times.split_off(excess);
            for values in self.series.iter_mut() {
                *values = values.split_off(excess);
            }
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Stock of one reservoir over time
    pub fn series(&self, reservoir: Reservoir) -> &[f64] {
        &self.series[reservoir.index()]
    }

    /// The sample at position `i`, oldest first
    pub fn sample(&self, i: usize) -> Option<(Time, CarbonState)> {
        let time = *self.times.get(i)?;
        let mut stocks = [0.0; N_RESERVOIRS];
        for (stock, values) in stocks.iter_mut().zip(self.series.iter()) {
            *stock = values[i];
        }
        Some((time, CarbonState::from_stocks(stocks)))
    }

    /// The most recent sample
    pub fn latest(&self) -> Option<(Time, CarbonState)> {
        self.len().checked_sub(1).and_then(|i| self.sample(i))
    }

    /// Samples as a `(len, 1 + N_RESERVOIRS)` array.
    ///
    /// Column 0 is time; the remaining columns follow [`Reservoir::ALL`].
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.len(), 1 + N_RESERVOIRS), |(i, j)| {
            if j == 0 {
                self.times[i]
            } else {
                self.series[j - 1][i]
            }
        })
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(0.0, &CarbonState::initial())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_initial_sample() {
        let history = History::default();
        assert_eq!(history.len(), 1);
        assert_eq!(history.times(), &[0.0]);
        assert_eq!(history.series(Reservoir::Atmosphere), &[750.0]);
        assert_eq!(history.max_len(), MAX_HISTORY_LEN);
    }

    #[test]
    fn push_does_not_mutate() {
        let history = History::default();
        let state = CarbonState::initial().with(Reservoir::Atmosphere, 800.0);
        let next = history.push(0.2, &state);

        assert_eq!(history.len(), 1);
        assert_eq!(next.len(), 2);
        assert_eq!(next.latest(), Some((0.2, state)));
    }

    #[test]
    fn truncates_to_most_recent() {
        let mut history = History::with_capacity_limit(5);
        for i in 0..12 {
            let state = CarbonState::initial().with(Reservoir::Soil, i as f64);
            history = history.push(i as f64, &state);
        }

        assert_eq!(history.len(), 5);
        assert_eq!(history.times(), &[7.0, 8.0, 9.0, 10.0, 11.0]);
        assert_eq!(history.series(Reservoir::Soil), &[7.0, 8.0, 9.0, 10.0, 11.0]);
        for reservoir in Reservoir::ALL {
            assert_eq!(history.series(reservoir).len(), 5);
        }
    }

    #[test]
    fn default_bound_is_enforced() {
        let mut history = History::default();
        let state = CarbonState::initial();
        for i in 1..=(MAX_HISTORY_LEN + 10) {
            history = history.push(i as f64, &state);
        }
        assert_eq!(history.len(), MAX_HISTORY_LEN);
        assert_eq!(history.times()[0], 11.0);
        assert_eq!(
            history.times()[MAX_HISTORY_LEN - 1],
            (MAX_HISTORY_LEN + 10) as f64
        );
    }

    #[test]
    fn to_array_layout() {
        let history = History::default().push(1.0, &CarbonState::initial());
        let array = history.to_array();
        assert_eq!(array.shape(), &[2, 8]);
        assert_eq!(array[[1, 0]], 1.0);
        assert_eq!(array[[0, 1 + Reservoir::OceanDeep.index()]], 38100.0);
    }

    #[test]
    fn deserialize_round_trip() {
        let history = History::default().push(0.2, &CarbonState::initial());
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(serde_json::from_str::<History>(&json).unwrap(), history);
    }

    #[test]
    fn deserialize_rejects_mismatched_series() {
        let json = r#"{"max_len":3,"times":[0.0,1.0],
            "series":[[1.0],[1.0],[1.0],[1.0],[1.0],[1.0],[1.0]]}"#;
        assert!(serde_json::from_str::<History>(json).is_err());
    }

    #[test]
    fn deserialize_rejects_zero_bound() {
        let json = r#"{"max_len":0,"times":[],"series":[[],[],[],[],[],[],[]]}"#;
        assert!(serde_json::from_str::<History>(json).is_err());
    }

    #[test]
    fn deserialize_truncates_to_bound() {
        let json = r#"{"max_len":2,"times":[0.0,1.0,2.0],
            "series":[[1,2,3],[1,2,3],[1,2,3],[1,2,3],[1,2,3],[1,2,3],[4,5,6]]}"#;
        let history: History = serde_json::from_str(json).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.times(), &[1.0, 2.0]);
        assert_eq!(history.series(Reservoir::Rock), &[5.0, 6.0]);
        let (t, state) = history.latest().unwrap();
        assert_eq!(t, 2.0);
        assert_eq!(state[Reservoir::Atmosphere], 3.0);
        assert_eq!(history.to_array().shape(), &[2, 8]);
    }

    #[test]
    fn empty_history() {
        let history = History::with_capacity_limit(0);
        assert!(history.is_empty());
        assert_eq!(history.max_len(), 1);
        assert_eq!(history.latest(), None);
        assert_eq!(history.to_array().shape(), &[0, 8]);
    }
}
