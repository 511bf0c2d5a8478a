//! Process table
//!
//! Thirteen directed carbon flows between reservoirs. Each process moves carbon
//! out of its `source` and into its `sink`. The reference flow `F0` is the flow
//! at the initial state; processes with `F0 == 0` are inert until activated by a
//! positive control or, for human-controlled processes, a direct input.

use crate::constants::{DEFAULT_SEED_FLOW, INITIAL_STOCKS};
use crate::errors::{CarbonCycleError, CarbonCycleResult};
use crate::reservoir::Reservoir;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of processes in the model.
pub const N_PROCESSES: usize = 13;

/// Static definition of a single process
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessDefinition {
    /// Unique display name, also used as the lookup key
    pub name: &'static str,
    /// Reservoir the flow is taken from
    pub source: Reservoir,
    /// Reservoir the flow is added to
    pub sink: Reservoir,
    /// Flow at the initial state
    /// unit: GtC / yr
    pub reference_flow: f64,
    /// Flow used to derive the activation coefficient of zero-reference processes
    /// unit: GtC / yr
    pub seed_flow: Option<f64>,
    /// Whether the flow is set directly by the user rather than from a rate coefficient
    pub human_controlled: bool,
}

const fn natural(
    name: &'static str,
    source: Reservoir,
    sink: Reservoir,
    reference_flow: f64,
) -> ProcessDefinition {
    ProcessDefinition {
        name,
        source,
        sink,
        reference_flow,
        seed_flow: None,
        human_controlled: false,
    }
}

/// The process table, in [`Process::ALL`] order.
pub static PROCESS_TABLE: [ProcessDefinition; N_PROCESSES] = {
    use Reservoir::*;
    [
        natural("Photosynthesis", Atmosphere, Vegetation, 121.5),
        natural("Autotrophic Respiration", Vegetation, Atmosphere, 60.0),
        ProcessDefinition {
            name: "Deforestation",
            source: Vegetation,
            sink: Atmosphere,
            reference_flow: 0.0,
            seed_flow: Some(50.0),
            human_controlled: true,
        },
        natural("Decomposition", Vegetation, Soil, 61.0),
        natural("Heterotrophic Respiration", Soil, Atmosphere, 60.0),
        natural("Atmosphere-Ocean Diffusion", Atmosphere, OceanSurface, 92.0),
        natural("Ocean-Atmosphere Diffusion", OceanSurface, Atmosphere, 90.0),
        natural("Downwelling", OceanSurface, OceanDeep, 102.0),
        natural("Upwelling", OceanDeep, OceanSurface, 100.0),
        ProcessDefinition {
            name: "Fossil Fuel Combustion",
            source: FossilFuels,
            sink: Atmosphere,
            reference_flow: 0.0,
            seed_flow: Some(50.0),
            human_controlled: true,
        },
        ProcessDefinition {
            name: "Fossil Fuel Formation",
            source: OceanDeep,
            sink: FossilFuels,
            reference_flow: 0.0,
            seed_flow: Some(10.0),
            human_controlled: false,
        },
        natural("Sedimentation", OceanDeep, Rock, 0.05),
        natural("Erosion", Rock, Soil, 0.05),
    ]
};

/// A directed carbon flow between two reservoirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Process {
    Photosynthesis,
    AutotrophicRespiration,
    Deforestation,
    Decomposition,
    HeterotrophicRespiration,
    AtmosphereOceanDiffusion,
    OceanAtmosphereDiffusion,
    Downwelling,
    Upwelling,
    FossilFuelCombustion,
    FossilFuelFormation,
    Sedimentation,
    Erosion,
}

impl Process {
    /// All processes in table order
    pub const ALL: [Process; N_PROCESSES] = [
        Process::Photosynthesis,
        Process::AutotrophicRespiration,
        Process::Deforestation,
        Process::Decomposition,
        Process::HeterotrophicRespiration,
        Process::AtmosphereOceanDiffusion,
        Process::OceanAtmosphereDiffusion,
        Process::Downwelling,
        Process::Upwelling,
        Process::FossilFuelCombustion,
        Process::FossilFuelFormation,
        Process::Sedimentation,
        Process::Erosion,
    ];

    /// Processes whose flow is entered directly in GtC/yr.
    pub const HUMAN_CONTROLLED: [Process; 2] =
        [Process::Deforestation, Process::FossilFuelCombustion];

    /// Natural processes exposed to users as intensity sliders.
    pub const SLIDER_PROCESSES: [Process; 4] = [
        Process::Photosynthesis,
        Process::AutotrophicRespiration,
        Process::Decomposition,
        Process::HeterotrophicRespiration,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn definition(self) -> &'static ProcessDefinition {
        &PROCESS_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.definition().name
    }

    pub fn source(self) -> Reservoir {
        self.definition().source
    }

    pub fn sink(self) -> Reservoir {
        self.definition().sink
    }

    pub fn reference_flow(self) -> f64 {
        self.definition().reference_flow
    }

    pub fn is_human_controlled(self) -> bool {
        self.definition().human_controlled
    }

    /// Seed flow for zero-reference processes, falling back to [`DEFAULT_SEED_FLOW`].
    ///
    /// unit: GtC / yr
    pub fn seed_flow(self) -> f64 {
        self.definition().seed_flow.unwrap_or(DEFAULT_SEED_FLOW)
    }

    /// Baseline rate coefficient `a0 = F0 / Y0[source]` evaluated at the initial stocks.
    ///
    /// Zero if the source reservoir starts empty.
    ///
    /// unit: 1 / yr
    pub fn baseline_coefficient(self) -> f64 {
        let y0 = INITIAL_STOCKS[self.source().index()];
        if y0 > 0.0 {
            self.reference_flow() / y0
        } else {
            0.0
        }
    }

    /// Look up a process by its display name.
    pub fn from_name(name: &str) -> CarbonCycleResult<Self> {
        Process::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| CarbonCycleError::UnknownProcess(name.to_string()))
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Process {
    type Err = CarbonCycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Process::from_name(s)
    }
}

impl TryFrom<String> for Process {
    type Error = CarbonCycleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Process::from_name(&value)
    }
}

impl From<Process> for &'static str {
    fn from(process: Process) -> Self {
        process.name()
    }
}
