use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::physics::energy::EnergyCorrection;
use crate::physics::initializer::{InitialConditions, Initializer};
use crate::physics::observables::Observables;
use crate::physics::simulation::Simulation;
use crate::physics::species::Species;
use crate::resources::{DiffusionTracker, GasPiston, GasSimulation, RunSchedule, SharedRng};
use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    Advance,
    CorrectEnergy,
    Report,
    Finish,
}

/// Allocates the simulation and fills it from the initial conditions
pub fn setup_simulation(
    config: &SimulationConfig,
    rng: &mut SharedRng,
) -> Result<Simulation, SimulationError> {
    let mut simulation = Simulation::new(config)?;
    Initializer::new(InitialConditions::from(&config.initial))
        .populate(&mut simulation, &mut **rng)?;
    Ok(simulation)
}

/// Advance the gas by one step until the run is over
pub fn advance_simulation(mut simulation: ResMut<GasSimulation>, schedule: Res<RunSchedule>) {
    if schedule.is_finished(simulation.step_count()) {
        return;
    }

    simulation.step();
}

/// Moves the far x wall to where the piston puts it for the coming step
pub fn drive_piston(
    mut simulation: ResMut<GasSimulation>,
    piston: Res<GasPiston>,
    schedule: Res<RunSchedule>,
) {
    let step = simulation.step_count();
    if schedule.is_finished(step) {
        return;
    }

    let size = piston.size_at(step);
    if let Err(e) = simulation.resize_container(size) {
        warn!("Step {step}: piston left the box unchanged: {e}");
    }
}

pub fn correct_energy(
    mut simulation: ResMut<GasSimulation>,
    schedule: Res<RunSchedule>,
    mut handled_step: Local<u64>,
) {
    let step = simulation.step_count();
    if step == *handled_step || !schedule.fixes_energy_at(step) {
        return;
    }
    *handled_step = step;

    match simulation.fix_energy() {
        EnergyCorrection::Baseline { total } => {
            info!("Step {step}: recorded energy baseline {total:.6}");
        }
        EnergyCorrection::Rescaled { factor } => {
            debug!("Step {step}: rescaled velocities by {factor:.9}");
        }
        EnergyCorrection::Skipped => {}
    }
}

pub fn report_initial_state(simulation: Res<GasSimulation>) {
    info!(
        "Starting {:?} run with {} of {} particles",
        simulation.law(),
        simulation.len(),
        simulation.capacity()
    );
    info!("{}", Observables::measure(&simulation));
}

pub fn report_observables(
    simulation: Res<GasSimulation>,
    schedule: Res<RunSchedule>,
    mut handled_step: Local<u64>,
) {
    let step = simulation.step_count();
    if step == *handled_step || !schedule.reports_at(step) {
        return;
    }
    *handled_step = step;

    info!("{}", Observables::measure(&simulation));
}

pub fn report_concentration(
    simulation: Res<GasSimulation>,
    schedule: Res<RunSchedule>,
    mut tracker: ResMut<DiffusionTracker>,
    mut handled_step: Local<u64>,
) {
    let step = simulation.step_count();
    if step == *handled_step || !schedule.reports_at(step) {
        return;
    }
    *handled_step = step;

    tracker.update(&simulation);
    for species in Species::ALL {
        let counts: Vec<usize> = (0..tracker.profile.slabs())
            .map(|slab| tracker.profile.count(slab, species))
            .collect();
        info!(
            "step {step}: {} per slab {:?}, flux {:?}, since start {:?}",
            species.name(),
            counts,
            tracker.flux[species.index()],
            tracker.total_flux[species.index()]
        );
    }
}

pub fn exit_when_finished(
    simulation: Res<GasSimulation>,
    schedule: Res<RunSchedule>,
    mut exit: EventWriter<AppExit>,
) {
    if schedule.is_finished(simulation.step_count()) {
        info!("Finished after {} steps", simulation.step_count());
        exit.write(AppExit::Success);
    }
}

/// Setup failures are logged while the plugin builds; stop the app before
/// the first step.
pub fn exit_without_simulation(
    simulation: Option<Res<GasSimulation>>,
    mut exit: EventWriter<AppExit>,
) {
    if simulation.is_none() {
        exit.write(AppExit::error());
    }
}
