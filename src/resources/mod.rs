use crate::prelude::*;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

use crate::config::SimulationConfig;
use crate::physics::container::Piston;
use crate::physics::observables::ConcentrationProfile;
use crate::physics::simulation::Simulation;
use crate::physics::species::Species;

#[derive(Resource, Deref, DerefMut, Debug, Clone, PartialEq)]
pub struct SharedRng(pub ChaCha8Rng);

impl SharedRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::default(),
        }
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self(ChaCha8Rng::from_rng(&mut rand::rng()))
    }
}

/// The running gas
#[derive(Resource, Deref, DerefMut, Debug)]
pub struct GasSimulation(pub Simulation);

impl GasSimulation {
    pub fn new(simulation: Simulation) -> Self {
        Self(simulation)
    }
}

/// Moving far wall, present only when the config enables it
#[derive(Resource, Deref, Debug, Clone, Copy, PartialEq)]
pub struct GasPiston(pub Piston);

/// Concentration along x for runs started in the diffusion layout
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct DiffusionTracker {
    /// Profile at the most recent report, or at spawn before the first one
    pub profile: ConcentrationProfile,
    /// Net crossings per interior slab boundary since the previous report,
    /// indexed by species
    pub flux: [Vec<isize>; Species::COUNT],
    /// Net crossings since spawn
    pub total_flux: [Vec<isize>; Species::COUNT],
}

impl DiffusionTracker {
    pub fn new(simulation: &Simulation, slabs: usize) -> Self {
        let profile = Self::measure(simulation, slabs);
        let boundaries = profile.slabs() - 1;

        Self {
            profile,
            flux: std::array::from_fn(|_| vec![0; boundaries]),
            total_flux: std::array::from_fn(|_| vec![0; boundaries]),
        }
    }

    /// Measures a fresh profile and folds the crossings since the last one
    /// into the running totals.
    pub fn update(&mut self, simulation: &Simulation) {
        let profile = Self::measure(simulation, self.profile.slabs());

        for species in Species::ALL {
            let flux = self.profile.flux_between(&profile, species);
            for (total, crossed) in self.total_flux[species.index()].iter_mut().zip(&flux) {
                *total += crossed;
            }
            self.flux[species.index()] = flux;
        }

        self.profile = profile;
    }

    fn measure(simulation: &Simulation, slabs: usize) -> ConcentrationProfile {
        ConcentrationProfile::measure(simulation.particles(), simulation.container(), 0, slabs)
    }
}

/// Cadences for the step driver, in steps. Zero disables an interval.
#[derive(Resource, Copy, Clone, PartialEq, Eq, Debug)]
pub struct RunSchedule {
    pub steps: u64,
    pub report_interval: u64,
    pub energy_fix_interval: u64,
}

impl RunSchedule {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            steps: config.run.steps,
            report_interval: config.run.report_interval,
            energy_fix_interval: config.physics.energy_fix_interval,
        }
    }

    #[inline]
    pub fn is_finished(&self, step: u64) -> bool {
        step >= self.steps
    }

    #[inline]
    pub fn fixes_energy_at(&self, step: u64) -> bool {
        self.energy_fix_interval > 0 && step % self.energy_fix_interval == 0
    }

    #[inline]
    pub fn reports_at(&self, step: u64) -> bool {
        self.report_interval > 0 && step % self.report_interval == 0
    }
}

impl Default for RunSchedule {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}
