//! Random initial conditions

use bevy::log::{info, warn};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::config::InitialConfig;
use crate::error::ConfigError;
use crate::physics::math::{Scalar, Vector};
use crate::physics::particle::Particle;
use crate::physics::simulation::Simulation;
use crate::physics::species::Species;

/// Where each species starts inside the box
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SpawnLayout {
    /// Both species fill the whole box
    #[default]
    Uniform,
    /// Helium fills the lower half along x, argon the upper half
    Diffusion,
}

/// Axis-aligned part of the box, in fractions of its size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRegion {
    pub min: Vector,
    pub max: Vector,
}

impl SpawnRegion {
    pub const WHOLE: SpawnRegion = SpawnRegion {
        min: Vector::ZERO,
        max: Vector::ONE,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialConditions {
    pub particle_count: usize,
    pub helium_fraction: Scalar,
    pub temperature: Scalar,
    pub layout: SpawnLayout,
}

impl From<&InitialConfig> for InitialConditions {
    fn from(config: &InitialConfig) -> Self {
        Self {
            particle_count: config.particle_count,
            helium_fraction: config.helium_fraction,
            temperature: config.temperature,
            layout: config.layout,
        }
    }
}

impl InitialConditions {
    pub fn helium_count(&self) -> usize {
        let count = (self.particle_count as Scalar * self.helium_fraction.clamp(0.0, 1.0)).round();
        (count as usize).min(self.particle_count)
    }

    /// The first [`helium_count`](Self::helium_count) particles are helium.
    pub fn species_of(&self, index: usize) -> Species {
        if index < self.helium_count() {
            Species::Helium
        } else {
            Species::Argon
        }
    }

    pub fn region(&self, species: Species) -> SpawnRegion {
        match (self.layout, species) {
            (SpawnLayout::Uniform, _) => SpawnRegion::WHOLE,
            (SpawnLayout::Diffusion, Species::Helium) => SpawnRegion {
                min: Vector::ZERO,
                max: Vector::new(0.5, 1.0, 1.0),
            },
            (SpawnLayout::Diffusion, Species::Argon) => SpawnRegion {
                min: Vector::new(0.5, 0.0, 0.0),
                max: Vector::ONE,
            },
        }
    }
}

/// Fills a simulation with randomly placed particles whose velocity
/// components follow the Maxwell-Boltzmann distribution for the requested
/// temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Initializer {
    conditions: InitialConditions,
}

impl Initializer {
    pub fn new(conditions: InitialConditions) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &InitialConditions {
        &self.conditions
    }

    /// Returns how many particles were actually added; anything beyond the
    /// simulation's capacity is dropped.
    pub fn populate<R: Rng>(
        &self,
        simulation: &mut Simulation,
        rng: &mut R,
    ) -> Result<usize, ConfigError> {
        let conditions = &self.conditions;
        let species = *simulation.species();
        let size = simulation.container().size();

        let mut velocity_distributions = Vec::with_capacity(Species::COUNT);
        for kind in Species::ALL {
            let spread = libm::sqrt(conditions.temperature / species.mass(kind));
            velocity_distributions.push(Normal::new(0.0, spread).map_err(|e| {
                ConfigError::InvalidInitialConditions(format!("temperature: {e}"))
            })?);
        }

        let mut added = 0;
        for index in 0..conditions.particle_count {
            let kind = conditions.species_of(index);
            let radius = species.collision_radius(kind);
            let region = conditions.region(kind);

            let lower = region.min * size + Vector::splat(radius);
            let upper = region.max * size - Vector::splat(radius);
            let position = Vector::new(
                sample_between(rng, lower.x, upper.x),
                sample_between(rng, lower.y, upper.y),
                sample_between(rng, lower.z, upper.z),
            );

            let distribution = &velocity_distributions[kind.index()];
            let velocity = Vector::new(
                distribution.sample(rng),
                distribution.sample(rng),
                distribution.sample(rng),
            );

            if !simulation.add_particle(Particle::new(position, velocity, kind)) {
                warn!(
                    "Simulation is full: dropped {} of {} requested particles",
                    conditions.particle_count - added,
                    conditions.particle_count
                );
                break;
            }
            added += 1;
        }

        info!(
            "Spawned {added} particles ({} helium) at temperature {}",
            conditions.helium_count().min(added),
            conditions.temperature
        );

        Ok(added)
    }
}

/// Uniform in `[lower, upper)`, or the midpoint when the interval is empty
fn sample_between<R: Rng>(rng: &mut R, lower: Scalar, upper: Scalar) -> Scalar {
    if lower < upper {
        rng.random_range(lower..upper)
    } else {
        0.5 * (lower + upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::resources::SharedRng;

    fn config(count: usize, capacity: usize, layout: SpawnLayout) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.physics.capacity = capacity;
        config.initial.particle_count = count;
        config.initial.layout = layout;
        config
    }

    fn populated(config: &SimulationConfig, seed: u64) -> (Simulation, usize) {
        let mut simulation = Simulation::new(config).unwrap();
        let mut rng = SharedRng::from_seed(seed);
        let added = Initializer::new(InitialConditions::from(&config.initial))
            .populate(&mut simulation, &mut *rng)
            .unwrap();
        (simulation, added)
    }

    #[test]
    fn test_species_split() {
        let conditions = InitialConditions {
            particle_count: 10,
            helium_fraction: 0.3,
            temperature: 1.0,
            layout: SpawnLayout::Uniform,
        };

        assert_eq!(conditions.helium_count(), 3);
        assert_eq!(conditions.species_of(2), Species::Helium);
        assert_eq!(conditions.species_of(3), Species::Argon);
    }

    #[test]
    fn test_particles_start_inside_the_box() {
        let config = config(200, 200, SpawnLayout::Uniform);
        let (simulation, added) = populated(&config, 1);

        assert_eq!(added, 200);
        for particle in simulation.particles() {
            let radius = simulation.species().collision_radius(particle.species);
            assert!(
                simulation.container().contains(particle.position, radius * 0.999),
                "{} is outside the box",
                particle.position
            );
        }
    }

    #[test]
    fn test_diffusion_layout_separates_species() {
        let config = config(100, 100, SpawnLayout::Diffusion);
        let (simulation, _) = populated(&config, 2);
        let midpoint = 0.5 * simulation.container().size().x;

        for particle in simulation.particles() {
            match particle.species {
                Species::Helium => assert!(particle.position.x <= midpoint),
                Species::Argon => assert!(particle.position.x >= midpoint),
            }
        }
    }

    #[test]
    fn test_overfill_stops_at_capacity() {
        let config = config(50, 20, SpawnLayout::Uniform);
        let (simulation, added) = populated(&config, 3);

        assert_eq!(added, 20);
        assert_eq!(simulation.len(), 20);
    }

    #[test]
    fn test_same_seed_same_gas() {
        let config = config(30, 30, SpawnLayout::Uniform);
        let (first, _) = populated(&config, 42);
        let (second, _) = populated(&config, 42);
        let (other, _) = populated(&config, 43);

        assert_eq!(first.particles(), second.particles());
        assert_ne!(first.particles(), other.particles());
    }

    #[test]
    fn test_temperature_sets_velocity_spread() {
        let mut config = config(1000, 1000, SpawnLayout::Uniform);
        config.initial.helium_fraction = 1.0;
        config.initial.temperature = 4.0;
        let (simulation, _) = populated(&config, 4);

        // Equipartition: ⟨½ m v²⟩ = 3/2 T
        let mean_kinetic = simulation.kinetic_energy() / simulation.len() as Scalar;
        assert!(
            (mean_kinetic - 6.0).abs() < 0.6,
            "mean kinetic energy {mean_kinetic} should be close to 6"
        );
    }

    #[test]
    fn test_zero_temperature_spawns_at_rest() {
        let mut config = config(10, 10, SpawnLayout::Uniform);
        config.initial.temperature = 0.0;
        let (simulation, _) = populated(&config, 5);

        assert!(simulation.particles().iter().all(|p| p.velocity == Vector::ZERO));
    }
}
