//! External inputs to the model
//!
//! Control parameters and direct-input flows are owned by whoever drives the
//! simulation. Values entering through this module are sanitised: anything that
//! is not a finite number becomes 0.0, and unknown process names are skipped.
//! The numerical core can therefore assume every value it reads is finite.

use crate::process::Process;
use crate::process_values::ProcessValues;
use log::warn;
use serde::{Deserialize, Serialize};

fn sanitise(process: Process, value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        warn!("Non-finite value {} for process '{}' treated as 0", value, process);
        0.0
    }
}

fn parse_or_zero(process: Process, raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) => sanitise(process, value),
        Err(_) => {
            warn!("Could not parse '{}' for process '{}'; treated as 0", raw, process);
            0.0
        }
    }
}

fn resolve(name: &str) -> Option<Process> {
    match Process::from_name(name) {
        Ok(process) => Some(process),
        Err(_) => {
            warn!("Ignoring value for unknown process '{}'", name);
            None
        }
    }
}

macro_rules! sanitised_inputs {
    ($name:ident) => {
        impl $name {
            pub fn new() -> Self {
                Self(ProcessValues::zeros())
            }

            pub fn get(&self, process: Process) -> f64 {
                self.0.get(process)
            }

            /// Set the value for a process. Non-finite values are stored as 0.0.
            pub fn set(&mut self, process: Process, value: f64) {
                self.0.set(process, sanitise(process, value));
            }

            /// Builder-style variant of [`Self::set`]
            pub fn with(mut self, process: Process, value: f64) -> Self {
                self.set(process, value);
                self
            }

            /// Build from values keyed by display name.
            ///
            /// Unknown names are skipped and missing processes default to 0.0.
            pub fn from_named<'a>(values: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
                let mut out = Self::new();
                for (name, value) in values {
                    if let Some(process) = resolve(name) {
                        out.set(process, value);
                    }
                }
                out
            }

            /// Build from untyped text keyed by display name.
            ///
            /// Text that does not parse as a number is treated as 0.0.
            pub fn from_raw<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
                let mut out = Self::new();
                for (name, raw) in values {
                    if let Some(process) = resolve(name) {
                        out.0.set(process, parse_or_zero(process, raw));
                    }
                }
                out
            }

            pub fn iter(&self) -> impl Iterator<Item = (Process, f64)> + '_ {
                self.0.iter()
            }

            pub fn values(&self) -> &ProcessValues {
                &self.0
            }
        }

        impl From<ProcessValues> for $name {
            fn from(values: ProcessValues) -> Self {
                let mut out = Self::new();
                for (process, value) in values.iter() {
                    out.set(process, value);
                }
                out
            }
        }
    };
}

/// Per-process intensity `p`, typically in `[-2, 2]`.
///
/// A natural process runs at `2^p` times its baseline rate. A zero-reference
/// process is inert for `p <= 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProcessValues", into = "ProcessValues")]
pub struct ControlParameters(ProcessValues);

sanitised_inputs!(ControlParameters);

/// Absolute flows entered directly for human-controlled processes.
///
/// Values for other processes may be stored but are never read by the flux
/// calculator. Negative values are kept as entered and clamped to zero when
/// flows are computed.
///
/// unit: GtC / yr
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProcessValues", into = "ProcessValues")]
pub struct DirectInputFlows(ProcessValues);

sanitised_inputs!(DirectInputFlows);

impl From<ControlParameters> for ProcessValues {
    fn from(controls: ControlParameters) -> Self {
        controls.0
    }
}

impl From<DirectInputFlows> for ProcessValues {
    fn from(inputs: DirectInputFlows) -> Self {
        inputs.0
    }
}
