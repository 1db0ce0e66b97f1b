//! Gasbox prelude module
//!
//! This module re-exports the most commonly used types, traits, and functions
//! across the crate to reduce import boilerplate.

// External crate re-exports
pub use bevy::prelude::*;
pub use rand::Rng;

// Internal re-exports - Config
pub use crate::config::SimulationConfig;

// Internal re-exports - Resources
pub use crate::resources::{GasSimulation, RunSchedule, SharedRng};

// Internal re-exports - Physics
pub use crate::physics::interactions::InteractionLaw;
pub use crate::physics::math::{Scalar, Vector};
pub use crate::physics::observables::Observables;
pub use crate::physics::particle::Particle;
pub use crate::physics::simulation::Simulation;
pub use crate::physics::species::Species;
