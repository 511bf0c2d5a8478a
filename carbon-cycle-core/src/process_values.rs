use crate::process::{Process, N_PROCESSES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Index;

/// A value for every process, stored densely in [`Process::ALL`] order.
///
/// Serialised as a map keyed by process display name. Entries missing from a
/// serialised map default to 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Process, f64>", into = "BTreeMap<Process, f64>")]
pub struct ProcessValues {
    values: [f64; N_PROCESSES],
}

impl ProcessValues {
    pub const fn zeros() -> Self {
        Self {
            values: [0.0; N_PROCESSES],
        }
    }

    /// Build a table by evaluating `f` for every process.
    pub fn from_fn(mut f: impl FnMut(Process) -> f64) -> Self {
        let mut values = [0.0; N_PROCESSES];
        for process in Process::ALL {
            values[process.index()] = f(process);
        }
        Self { values }
    }

    pub fn get(&self, process: Process) -> f64 {
        self.values[process.index()]
    }

    pub fn set(&mut self, process: Process, value: f64) {
        self.values[process.index()] = value;
    }

    /// Iterate over `(process, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Process, f64)> + '_ {
        Process::ALL.iter().map(move |p| (*p, self.values[p.index()]))
    }

    /// Values keyed by display name, for labels and diagnostics.
    pub fn by_name(&self) -> BTreeMap<&'static str, f64> {
        self.iter().map(|(p, v)| (p.name(), v)).collect()
    }
}

impl Default for ProcessValues {
    fn default() -> Self {
        Self::zeros()
    }
}

impl Index<Process> for ProcessValues {
    type Output = f64;

    fn index(&self, process: Process) -> &Self::Output {
        &self.values[process.index()]
    }
}

impl From<BTreeMap<Process, f64>> for ProcessValues {
    fn from(map: BTreeMap<Process, f64>) -> Self {
        Self::from_fn(|p| map.get(&p).copied().unwrap_or(0.0))
    }
}

impl From<ProcessValues> for BTreeMap<Process, f64> {
    fn from(values: ProcessValues) -> Self {
        values.iter().collect()
    }
}
