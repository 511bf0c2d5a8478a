//! Carbon reservoirs
//!
//! The model is zero-dimensional: each reservoir is a single well-mixed box
//! identified by a stable short key.

use crate::errors::CarbonCycleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of reservoirs in the model.
pub const N_RESERVOIRS: usize = 7;

/// A single carbon pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Reservoir {
    #[serde(rename = "A")]
    Atmosphere,
    #[serde(rename = "V")]
    Vegetation,
    #[serde(rename = "S")]
    Soil,
    #[serde(rename = "Os")]
    OceanSurface,
    #[serde(rename = "Od")]
    OceanDeep,
    #[serde(rename = "F")]
    FossilFuels,
    #[serde(rename = "R")]
    Rock,
}

impl Reservoir {
    /// All reservoirs in their canonical order.
    ///
    /// The position of a reservoir in this array is its [`Reservoir::index`].
    pub const ALL: [Reservoir; N_RESERVOIRS] = [
        Reservoir::Atmosphere,
        Reservoir::Vegetation,
        Reservoir::Soil,
        Reservoir::OceanSurface,
        Reservoir::OceanDeep,
        Reservoir::FossilFuels,
        Reservoir::Rock,
    ];

    /// Dense index used for array-backed storage.
    pub const fn index(self) -> usize {
        match self {
            Reservoir::Atmosphere => 0,
            Reservoir::Vegetation => 1,
            Reservoir::Soil => 2,
            Reservoir::OceanSurface => 3,
            Reservoir::OceanDeep => 4,
            Reservoir::FossilFuels => 5,
            Reservoir::Rock => 6,
        }
    }

    /// Stable short key
    pub const fn key(self) -> &'static str {
        match self {
            Reservoir::Atmosphere => "A",
            Reservoir::Vegetation => "V",
            Reservoir::Soil => "S",
            Reservoir::OceanSurface => "Os",
            Reservoir::OceanDeep => "Od",
            Reservoir::FossilFuels => "F",
            Reservoir::Rock => "R",
        }
    }

    /// Human-readable name for labels and chart legends.
    pub const fn pretty_name(self) -> &'static str {
        match self {
            Reservoir::Atmosphere => "Atmosphere",
            Reservoir::Vegetation => "Vegetation",
            Reservoir::Soil => "Soils and Detritivores",
            Reservoir::OceanSurface => "Ocean Surface and Marine Biota",
            Reservoir::OceanDeep => "Deep Ocean",
            Reservoir::FossilFuels => "Fossil Fuels",
            Reservoir::Rock => "Sedimentary Rock",
        }
    }
}

impl fmt::Display for Reservoir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Reservoir {
    type Err = CarbonCycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reservoir::ALL
            .into_iter()
            .find(|r| r.key() == s)
            .ok_or_else(|| CarbonCycleError::UnknownReservoir(s.to_string()))
    }
}
