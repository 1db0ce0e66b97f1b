//! Gasbox library
//!
//! Molecular gas in a box: a Barnes-Hut octree, hard-sphere collisions and
//! Lennard-Jones attraction, wall reflection and energy drift correction,
//! plus the headless bevy plugin that drives it.

pub mod cli;
pub mod config;
pub mod error;
pub mod physics;
pub mod plugins;
pub mod prelude;
pub mod resources;

// Test utilities are public for integration tests
pub mod test_utils;

// Re-export commonly used items
pub use config::SimulationConfig;
pub use physics::math::{Scalar, Vector};
pub use physics::simulation::Simulation;
pub use plugins::simulation::SimulationPlugin;
