//! Simulation plugin - Self-contained plugin pattern
//!
//! Owns the gas and drives it headlessly: one step per app update, energy
//! corrections and observable reports at their configured cadences, and an
//! `AppExit` once the requested number of steps has run.

use crate::prelude::*;

mod physics;

use physics::{
    PhysicsSet, advance_simulation, correct_energy, drive_piston, exit_when_finished,
    exit_without_simulation, report_concentration, report_initial_state, report_observables,
};

use crate::physics::initializer::SpawnLayout;
use crate::resources::{DiffusionTracker, GasPiston};

pub use physics::setup_simulation;

pub struct SimulationPlugin {
    config: Option<SimulationConfig>,
}

impl SimulationPlugin {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = self
            .config
            .clone()
            .unwrap_or_else(SimulationConfig::load_from_user_config);

        match toml::to_string_pretty(&config) {
            Ok(toml_string) => {
                debug!("=== Current Configuration (TOML) ===\n{}", toml_string);
                debug!("=== End Configuration ===");
            }
            Err(e) => {
                error!("Failed to serialize configuration to TOML: {}", e);
            }
        }

        let mut rng = SharedRng::from_optional_seed(config.initial.seed);
        match setup_simulation(&config, &mut rng) {
            Ok(simulation) => {
                if config.initial.layout == SpawnLayout::Diffusion {
                    app.insert_resource(DiffusionTracker::new(
                        &simulation,
                        config.run.concentration_slabs,
                    ));
                }
                app.insert_resource(GasSimulation::new(simulation));
            }
            Err(e) => {
                error!("Failed to set up simulation: {e}");
            }
        }

        match config.piston() {
            Ok(Some(piston)) => {
                app.insert_resource(GasPiston(piston));
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to set up piston: {e}");
            }
        }

        app.insert_resource(RunSchedule::from_config(&config));
        app.insert_resource(rng);
        app.insert_resource(config);

        app.configure_sets(
            Update,
            (
                PhysicsSet::Advance,
                PhysicsSet::CorrectEnergy,
                PhysicsSet::Report,
                PhysicsSet::Finish,
            )
                .chain(),
        );

        app.add_systems(
            Startup,
            (
                exit_without_simulation,
                report_initial_state.run_if(resource_exists::<GasSimulation>),
            ),
        );

        app.add_systems(
            Update,
            (
                (
                    drive_piston.run_if(resource_exists::<GasPiston>),
                    advance_simulation,
                )
                    .chain()
                    .in_set(PhysicsSet::Advance),
                correct_energy.in_set(PhysicsSet::CorrectEnergy),
                (
                    report_observables,
                    report_concentration.run_if(resource_exists::<DiffusionTracker>),
                )
                    .in_set(PhysicsSet::Report),
                exit_when_finished.in_set(PhysicsSet::Finish),
            )
                .run_if(resource_exists::<GasSimulation>),
        );
    }
}
