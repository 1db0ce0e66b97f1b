use crate::physics::math::{Scalar, Vector};
use crate::physics::species::Species;

/// A single molecule. Identified by its index in the simulation's particle
/// array for the whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vector,
    pub velocity: Vector,
    pub force: Vector,
    pub species: Species,
}

impl Particle {
    pub fn new(position: Vector, velocity: Vector, species: Species) -> Self {
        Self {
            position,
            velocity,
            force: Vector::ZERO,
            species,
        }
    }

    /// Advances position and velocity under the accumulated force, then
    /// resets the accumulator to `resting_force`.
    ///
    /// ```text
    /// a = F/m
    /// x(t+dt) = x(t) + v(t)·dt + ½·a·dt²
    /// v(t+dt) = v(t) + a·dt
    /// ```
    #[inline]
    pub fn integrate(&mut self, mass: Scalar, dt: Scalar, resting_force: Vector) {
        let acceleration = self.force / mass;

        self.position += self.velocity * dt + acceleration * (0.5 * dt * dt);
        self.velocity += acceleration * dt;
        self.force = resting_force;
    }

    #[inline]
    pub fn kinetic_energy(&self, mass: Scalar) -> Scalar {
        0.5 * mass * self.velocity.length_squared()
    }
}
