//! Rectangular box the gas lives in, spanning `[0, size]` on every axis.

use crate::error::ConfigError;
use crate::physics::math::{Scalar, Vector};
use crate::physics::particle::Particle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    size: Vector,
}

impl Container {
    pub fn new(size: Vector) -> Result<Self, ConfigError> {
        if !(size.is_finite() && size.min_element() > 0.0) {
            return Err(ConfigError::InvalidContainer(format!(
                "every dimension must be positive, got {size}"
            )));
        }

        Ok(Self { size })
    }

    /// Moves the far walls. Particles left outside are pushed back in by the
    /// next reflection pass.
    pub fn resize(&mut self, size: Vector) -> Result<(), ConfigError> {
        *self = Self::new(size)?;
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> Vector {
        self.size
    }

    #[inline]
    pub fn center(&self) -> Vector {
        self.size * 0.5
    }

    pub fn volume(&self) -> Scalar {
        self.size.x * self.size.y * self.size.z
    }

    pub fn surface_area(&self) -> Scalar {
        2.0 * (self.size.x * self.size.y + self.size.y * self.size.z + self.size.x * self.size.z)
    }

    /// Whether a sphere of `radius` centered at `position` fits without
    /// touching a wall.
    pub fn contains(&self, position: Vector, radius: Scalar) -> bool {
        let half_extents = self.center() - Vector::splat(radius);
        (position - self.center()).abs().cmplt(half_extents).all()
    }

    /// Mirrors the particle back inside on every axis where it came closer to
    /// a wall than `radius`, negating that velocity component.
    ///
    /// Returns the summed speed change along wall normals (2·|v_n| per
    /// bounce), which is the momentum handed to the walls per unit mass.
    pub fn reflect(&self, particle: &mut Particle, radius: Scalar) -> Scalar {
        let mut transferred = 0.0;

        for axis in 0..3 {
            let coordinate = particle.position[axis];
            let far_wall = self.size[axis] - radius;

            let mirrored = if coordinate < radius {
                2.0 * radius - coordinate
            } else if coordinate > far_wall {
                2.0 * far_wall - coordinate
            } else {
                continue;
            };

            particle.position[axis] = mirrored;
            transferred += 2.0 * particle.velocity[axis].abs();
            particle.velocity[axis] = -particle.velocity[axis];
        }

        transferred
    }
}

/// Far x wall oscillating about its rest position, one phase increment
/// per step: `x = rest + amplitude · sin(angular_frequency · step)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Piston {
    rest_size: Vector,
    amplitude: Scalar,
    angular_frequency: Scalar,
}

impl Piston {
    /// Fails when the wall would ever reach the opposite one.
    pub fn new(
        rest_size: Vector,
        amplitude: Scalar,
        angular_frequency: Scalar,
    ) -> Result<Self, ConfigError> {
        Container::new(rest_size)?;
        if !(amplitude.is_finite() && amplitude >= 0.0 && amplitude < rest_size.x) {
            return Err(ConfigError::InvalidContainer(format!(
                "piston amplitude must lie in [0, {}), got {amplitude}",
                rest_size.x
            )));
        }
        if !angular_frequency.is_finite() {
            return Err(ConfigError::InvalidContainer(format!(
                "piston frequency must be finite, got {angular_frequency}"
            )));
        }

        Ok(Self {
            rest_size,
            amplitude,
            angular_frequency,
        })
    }

    #[inline]
    pub fn amplitude(&self) -> Scalar {
        self.amplitude
    }

    pub fn size_at(&self, step: u64) -> Vector {
        let phase = self.angular_frequency * step as Scalar;
        let mut size = self.rest_size;
        size.x += self.amplitude * libm::sin(phase);
        size
    }
}
