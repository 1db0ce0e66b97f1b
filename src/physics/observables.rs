//! Macroscopic quantities measured from a running simulation.
//!
//! Temperatures are in energy units (k_B = 1).

use std::fmt;

use crate::physics::container::Container;
use crate::physics::math::Scalar;
use crate::physics::octree::OctreeStats;
use crate::physics::particle::Particle;
use crate::physics::simulation::Simulation;
use crate::physics::species::Species;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observables {
    pub step: u64,
    pub particle_count: usize,
    pub kinetic_energy: Scalar,
    pub potential_energy: Scalar,
    pub total_energy: Scalar,
    /// 2K / 3N
    pub temperature: Scalar,
    pub mean_speed: Scalar,
    pub pressure: Scalar,
    pub octree: OctreeStats,
    pub used_fallback: bool,
}

impl Observables {
    pub fn measure(simulation: &Simulation) -> Self {
        let particles = simulation.particles();
        let particle_count = particles.len();
        let kinetic_energy = simulation.kinetic_energy();
        let potential_energy = simulation.potential_energy();

        let (temperature, mean_speed) = if particle_count == 0 {
            (0.0, 0.0)
        } else {
            let count = particle_count as Scalar;
            let total_speed: Scalar = particles.iter().map(|p| p.velocity.length()).sum();
            (2.0 * kinetic_energy / (3.0 * count), total_speed / count)
        };

        Self {
            step: simulation.step_count(),
            particle_count,
            kinetic_energy,
            potential_energy,
            total_energy: kinetic_energy + potential_energy,
            temperature,
            mean_speed,
            pressure: simulation.pressure(),
            octree: simulation.octree_stats(),
            used_fallback: simulation.used_fallback(),
        }
    }
}

impl fmt::Display for Observables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}: N={} K={:.6} U={:.6} E={:.6} T={:.6} <|v|>={:.6} P={:.6e} nodes={} depth={}",
            self.step,
            self.particle_count,
            self.kinetic_energy,
            self.potential_energy,
            self.total_energy,
            self.temperature,
            self.mean_speed,
            self.pressure,
            self.octree.node_count,
            self.octree.depth,
        )?;

        if self.used_fallback {
            write!(f, " (pairwise)")?;
        }

        Ok(())
    }
}

/// Per-species particle counts in equal slabs along one axis of the box
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationProfile {
    axis: usize,
    slab_width: Scalar,
    counts: Vec<[usize; Species::COUNT]>,
}

impl ConcentrationProfile {
    /// Bins `particles` into `slabs` slabs along `axis` (0 = x, 1 = y,
    /// 2 = z). Particles outside the box are clamped into the end slabs.
    pub fn measure(particles: &[Particle], container: &Container, axis: usize, slabs: usize) -> Self {
        let axis = axis.min(2);
        let slabs = slabs.max(1);
        let slab_width = container.size()[axis] / slabs as Scalar;

        let mut counts = vec![[0; Species::COUNT]; slabs];
        for particle in particles {
            let slab = (particle.position[axis] / slab_width).floor().max(0.0) as usize;
            counts[slab.min(slabs - 1)][particle.species.index()] += 1;
        }

        Self {
            axis,
            slab_width,
            counts,
        }
    }

    #[inline]
    pub fn axis(&self) -> usize {
        self.axis
    }

    #[inline]
    pub fn slab_width(&self) -> Scalar {
        self.slab_width
    }

    #[inline]
    pub fn slabs(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, slab: usize, species: Species) -> usize {
        self.counts[slab][species.index()]
    }

    /// Share of `species` among the particles in `slab`, or zero when the
    /// slab is empty
    pub fn fraction(&self, slab: usize, species: Species) -> Scalar {
        let total: usize = self.counts[slab].iter().sum();
        if total == 0 {
            return 0.0;
        }
        self.count(slab, species) as Scalar / total as Scalar
    }

    /// Net number of `species` particles that crossed each interior slab
    /// boundary in the positive direction between `self` and `later`.
    ///
    /// Entry `b` is the boundary between slab `b` and slab `b + 1`.
    pub fn flux_between(&self, later: &Self, species: Species) -> Vec<isize> {
        let slabs = self.slabs().min(later.slabs());
        let mut flux = Vec::with_capacity(slabs.saturating_sub(1));
        let mut transferred = 0isize;

        // What leaves slabs 0..=b must have crossed boundary b.
        for slab in 0..slabs.saturating_sub(1) {
            transferred +=
                self.count(slab, species) as isize - later.count(slab, species) as isize;
            flux.push(transferred);
        }

        flux
    }
}
