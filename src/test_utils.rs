//! Test utilities for plugin testing

use bevy::prelude::*;

use crate::config::SimulationConfig;
use crate::physics::particle::Particle;
use crate::physics::simulation::Simulation;

/// Creates a minimal test app with core Bevy plugins needed for testing
pub fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app
}

/// Default configuration shrunk to a box of `size` holding up to
/// `capacity` particles, with unit time step
pub fn small_config(capacity: usize, size: f64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.physics.capacity = capacity;
    config.physics.time_step = 1.0;
    config.container.size = [size; 3];
    config.initial.particle_count = capacity;
    config
}

/// Builds an empty simulation from `config` and adds `particles` to it
pub fn simulation_with(config: &SimulationConfig, particles: &[Particle]) -> Simulation {
    let mut simulation = Simulation::new(config).expect("test configuration should be valid");
    for &particle in particles {
        simulation.add_particle(particle);
    }
    simulation
}
