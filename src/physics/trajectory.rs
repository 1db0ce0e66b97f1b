use serde::{Deserialize, Serialize};

use crate::physics::math::Scalar;
use crate::physics::particle::Particle;
use crate::physics::species::Species;

/// Read-only copy of the particle state after a step, indexed like the
/// simulation's particle array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryFrame {
    pub step: u64,
    pub positions: Vec<[Scalar; 3]>,
    pub velocities: Vec<[Scalar; 3]>,
    pub species: Vec<Species>,
}

impl TrajectoryFrame {
    pub fn capture(step: u64, particles: &[Particle]) -> Self {
        Self {
            step,
            positions: particles.iter().map(|p| p.position.to_array()).collect(),
            velocities: particles.iter().map(|p| p.velocity.to_array()).collect(),
            species: particles.iter().map(|p| p.species).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::math::Vector;

    #[test]
    fn test_capture_preserves_order() {
        let particles = [
            Particle::new(Vector::new(1.0, 2.0, 3.0), Vector::X, Species::Argon),
            Particle::new(Vector::new(4.0, 5.0, 6.0), Vector::Y, Species::Helium),
        ];

        let frame = TrajectoryFrame::capture(9, &particles);

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.positions, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(frame.velocities, vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(frame.species, vec![Species::Argon, Species::Helium]);
    }

    #[test]
    fn test_serializes_species_by_name() {
        let particles = [Particle::new(Vector::ZERO, Vector::ZERO, Species::Helium)];
        let frame = TrajectoryFrame::capture(3, &particles);

        let encoded = toml::to_string(&frame).unwrap();

        assert!(encoded.contains("step = 3"), "{encoded}");
        assert!(encoded.contains("\"helium\""), "{encoded}");
    }
}
