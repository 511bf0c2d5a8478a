//! Numerical core of a seven-reservoir carbon cycle model.
//!
//! Carbon moves between the atmosphere, vegetation, soil, surface and deep
//! ocean, fossil fuels and sedimentary rock through thirteen directed
//! processes. The state is advanced with sub-stepped RK4 integration and total
//! carbon is conserved exactly at every step boundary.
//!
//! All functions here are pure: they take state and inputs by reference and
//! return freshly computed values.

pub mod balance;
pub mod constants;
pub mod errors;
pub mod flux;
pub mod history;
pub mod inputs;
pub mod integrator;
pub mod process;
mod process_values;
pub mod reservoir;
pub mod state;

pub use process_values::ProcessValues;
