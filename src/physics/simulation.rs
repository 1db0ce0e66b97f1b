//! The gas as a whole: particles, box, tree and interaction engine.

use bevy::log::debug;

use crate::config::SimulationConfig;
use crate::error::{ConfigError, SimulationError, reserve_fixed};
use crate::physics::container::Container;
use crate::physics::energy::{self, EnergyCorrection, EnergyCorrector};
use crate::physics::interactions::{InteractionEngine, InteractionLaw, TraversalOrder};
use crate::physics::lennard_jones::InteractionCoefficients;
use crate::physics::math::{Scalar, Vector};
use crate::physics::octree::{Octree, OctreeStats};
use crate::physics::particle::Particle;
use crate::physics::species::{Species, SpeciesTable};
use crate::physics::trajectory::TrajectoryFrame;

#[derive(Debug)]
pub struct Simulation {
    container: Container,
    particles: Vec<Particle>,
    capacity: usize,
    octree: Octree,
    engine: InteractionEngine,
    corrector: EnergyCorrector,
    time_step: Scalar,
    external_acceleration: Vector,
    order: TraversalOrder,
    step: u64,
    wall_impulse: Scalar,
}

impl Simulation {
    /// Validates `config` and reserves all particle and tree storage up
    /// front. The simulation starts empty.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let capacity = config.physics.capacity;
        let container = Container::new(config.container_size())?;
        let species = SpeciesTable::from_config(&config.species)?;
        let coefficients = InteractionCoefficients::new(species, config.physics.cutoff_factor);

        Ok(Self {
            container,
            particles: reserve_fixed("particles", capacity)?,
            capacity,
            octree: Octree::new(container.size(), config.octree_budget())?,
            engine: InteractionEngine::new(config.physics.law, coefficients),
            corrector: EnergyCorrector::new(),
            time_step: config.physics.time_step,
            external_acceleration: config.external_acceleration(),
            order: TraversalOrder::default(),
            step: 0,
            wall_impulse: 0.0,
        })
    }

    /// Appends a particle. Does nothing once the simulation is full.
    pub fn add_particle(&mut self, mut particle: Particle) -> bool {
        if self.particles.len() >= self.capacity {
            return false;
        }

        particle.force = self.resting_force(particle.species);
        self.particles.push(particle);
        true
    }

    /// Advances the gas by one time step: integrate, rebuild the tree,
    /// resolve interactions, then reflect off the walls.
    pub fn step(&mut self) {
        let species = *self.species();
        let gravity = self.external_acceleration;

        for particle in &mut self.particles {
            let mass = species.mass(particle.species);
            particle.integrate(mass, self.time_step, gravity * mass);
        }

        self.octree.build(&self.particles);
        self.engine
            .resolve(&self.octree, &mut self.particles, self.order);
        if self.engine.used_fallback() {
            debug!(
                "Step {}: resolved {} particles pairwise",
                self.step + 1,
                self.particles.len()
            );
        }
        self.order = self.order.reversed();

        self.wall_impulse = 0.0;
        for particle in &mut self.particles {
            let radius = species.collision_radius(particle.species);
            let mass = species.mass(particle.species);
            self.wall_impulse += mass * self.container.reflect(particle, radius);
        }

        self.step += 1;
    }

    /// Pulls the total energy back to the value recorded on the first call.
    pub fn fix_energy(&mut self) -> EnergyCorrection {
        let species = *self.species();
        let potential = self.engine.potential_energy();
        self.corrector
            .correct(&mut self.particles, &species, potential)
    }

    /// Moves the far walls and regenerates the tree geometry. Particles left
    /// outside are reflected back on the next step.
    pub fn resize_container(&mut self, size: Vector) -> Result<(), ConfigError> {
        self.container.resize(size)?;
        self.octree.set_container_size(size);
        Ok(())
    }

    pub fn snapshot(&self) -> TrajectoryFrame {
        TrajectoryFrame::capture(self.step, &self.particles)
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn container(&self) -> &Container {
        &self.container
    }

    #[inline]
    pub fn species(&self) -> &SpeciesTable {
        self.engine.coefficients().species()
    }

    #[inline]
    pub fn law(&self) -> InteractionLaw {
        self.engine.law()
    }

    #[inline]
    pub fn time_step(&self) -> Scalar {
        self.time_step
    }

    /// Completed steps
    #[inline]
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Order the next step will walk particles in
    #[inline]
    pub fn traversal_order(&self) -> TraversalOrder {
        self.order
    }

    pub fn kinetic_energy(&self) -> Scalar {
        energy::kinetic_energy(&self.particles, self.species())
    }

    /// Potential energy found by the latest interaction pass
    pub fn potential_energy(&self) -> Scalar {
        self.engine.potential_energy()
    }

    pub fn total_energy(&self) -> Scalar {
        self.kinetic_energy() + self.potential_energy()
    }

    pub fn energy_baseline(&self) -> Option<Scalar> {
        self.corrector.baseline()
    }

    /// Momentum handed to the walls during the latest step
    pub fn wall_impulse(&self) -> Scalar {
        self.wall_impulse
    }

    /// Wall impulse per unit time per unit wall area
    pub fn pressure(&self) -> Scalar {
        self.wall_impulse / (self.time_step * self.container.surface_area())
    }

    pub fn octree_stats(&self) -> OctreeStats {
        self.octree.stats()
    }

    pub fn octree(&self) -> &Octree {
        &self.octree
    }

    pub fn used_fallback(&self) -> bool {
        self.engine.used_fallback()
    }

    fn resting_force(&self, species: Species) -> Vector {
        self.external_acceleration * self.species().mass(species)
    }
}
