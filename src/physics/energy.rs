//! Velocity rescaling against numerical energy drift

use bevy::log::{debug, warn};

use crate::physics::math::Scalar;
use crate::physics::particle::Particle;
use crate::physics::species::SpeciesTable;

pub fn kinetic_energy(particles: &[Particle], species: &SpeciesTable) -> Scalar {
    particles
        .iter()
        .map(|particle| particle.kinetic_energy(species.mass(particle.species)))
        .sum()
}

/// Outcome of a single [`EnergyCorrector::correct`] call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnergyCorrection {
    /// First call: the total energy was recorded and nothing changed
    Baseline { total: Scalar },
    /// Every velocity was multiplied by `factor`
    Rescaled { factor: Scalar },
    /// No kinetic energy to scale, or the potential alone already exceeds
    /// the baseline
    Skipped,
}

/// Holds the total energy recorded on first use and pulls the kinetic
/// energy back toward it on every later call, treating the potential
/// energy from the latest interaction pass as fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyCorrector {
    baseline: Option<Scalar>,
}

impl EnergyCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn baseline(&self) -> Option<Scalar> {
        self.baseline
    }

    /// Forgets the baseline; the next call records a new one.
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    pub fn correct(
        &mut self,
        particles: &mut [Particle],
        species: &SpeciesTable,
        potential_energy: Scalar,
    ) -> EnergyCorrection {
        let kinetic = kinetic_energy(particles, species);

        let Some(baseline) = self.baseline else {
            let total = kinetic + potential_energy;
            self.baseline = Some(total);
            debug!("Recorded energy baseline {total:.6} (K = {kinetic:.6}, U = {potential_energy:.6})");
            return EnergyCorrection::Baseline { total };
        };

        if kinetic <= Scalar::EPSILON {
            warn!("Skipping energy correction: kinetic energy is {kinetic:e}");
            return EnergyCorrection::Skipped;
        }

        let ratio = (baseline - potential_energy) / kinetic;
        if !(ratio.is_finite() && ratio >= 0.0) {
            warn!(
                "Skipping energy correction: potential {potential_energy:.6} exceeds baseline {baseline:.6}"
            );
            return EnergyCorrection::Skipped;
        }

        let factor = libm::sqrt(ratio);
        for particle in particles.iter_mut() {
            particle.velocity *= factor;
        }

        EnergyCorrection::Rescaled { factor }
    }
}
