//! End-to-end tests driving the simulation the way a front end would.

use approx::assert_relative_eq;
use carbon_cycle::model::constants::{INITIAL_STOCKS, TOTAL_CARBON};
use carbon_cycle::model::process::Process;
use carbon_cycle::model::reservoir::Reservoir;
use carbon_cycle::{CarbonCycleError, Simulation, SimulationConfig};
use is_close::is_close;

const SCENARIO: &str = r#"
interval_ms = 200
max_substep = 0.2
max_history_len = 50
initial_speed = 5.0

[scenario.controls]
"Photosynthesis" = -1.0
"Fossil Fuel Formation" = 0.5

[scenario.direct_inputs]
"Fossil Fuel Combustion" = 10.0
"Deforestation" = 1.5
"#;

#[test]
fn test_scenario_from_toml() {
    let config = SimulationConfig::from_toml(SCENARIO).unwrap();
    let sim = Simulation::new(config).unwrap();

    assert_eq!(sim.speed(), 5.0);
    assert!(is_close!(sim.years_per_tick(), 1.0));
    assert_eq!(sim.controls().get(Process::Photosynthesis), -1.0);
    assert_eq!(sim.direct_inputs().get(Process::Deforestation), 1.5);

    let flows = sim.flows();
    assert_relative_eq!(flows[Process::Photosynthesis], 121.5 / 2.0, epsilon = 1e-9);
    assert_eq!(flows[Process::FossilFuelCombustion], 10.0);
}

#[test]
fn test_long_run_conserves_carbon_and_bounds_history() {
    let config = SimulationConfig::from_toml(SCENARIO).unwrap();
    let mut sim = Simulation::new(config).unwrap();

    let ticks = sim.run_for(200.0);
    assert_eq!(ticks, 200);
    assert_eq!(sim.history().len(), 50);
    assert!(is_close!(sim.time(), 200.0));

    for i in 0..sim.history().len() {
        let (_, state) = sim.history().sample(i).unwrap();
        assert_relative_eq!(state.total(), TOTAL_CARBON, max_relative = 1e-6);
        for (reservoir, stock) in state.iter() {
            assert!(stock >= 0.0, "{} negative at sample {}", reservoir, i);
        }
    }

    let times = sim.history().times();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
    assert!(is_close!(times[times.len() - 1], 200.0));
}

#[test]
fn test_reduced_photosynthesis_raises_atmosphere() {
    let mut baseline = Simulation::default();
    let mut reduced = Simulation::default();
    reduced.set_control(Process::Photosynthesis, -1.0);

    baseline.run_for(10.0);
    reduced.run_for(10.0);

    assert!(reduced.state()[Reservoir::Atmosphere] > baseline.state()[Reservoir::Atmosphere]);
    assert!(reduced.state()[Reservoir::Vegetation] < baseline.state()[Reservoir::Vegetation]);
}

#[test]
fn test_default_run_stays_near_initial_state() {
    let mut sim = Simulation::default();
    sim.run_for(1.0);
    for reservoir in Reservoir::ALL {
        assert_relative_eq!(
            sim.state()[reservoir],
            INITIAL_STOCKS[reservoir.index()],
            max_relative = 1e-2
        );
    }
}

#[test]
fn test_invalid_configuration() {
    let result = Simulation::new(SimulationConfig {
        max_substep: 0.0,
        ..SimulationConfig::default()
    });
    assert!(matches!(result, Err(CarbonCycleError::InvalidConfig(_))));
}

#[test]
fn test_history_export_for_charts() {
    let mut sim = Simulation::default();
    sim.run_for(2.0);
    let array = sim.history().to_array();
    assert_eq!(array.shape(), &[11, 8]);
    assert_eq!(array[[0, 0]], 0.0);
    assert_eq!(array[[0, 1]], 750.0);
}
