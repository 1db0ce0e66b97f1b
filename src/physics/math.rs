/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

/// 3D vector type for positions, velocities, and forces
pub type Vector = bevy::math::DVec3;

/// Lengths below this are treated as degenerate when rescaling a vector.
pub const DEGENERATE_LENGTH: Scalar = 10.0 * Scalar::EPSILON;

/// Operations the gas model needs that `DVec3` does not provide directly.
pub trait VectorExt {
    /// Returns the vector rescaled to `length`, keeping its direction.
    ///
    /// A vector shorter than [`DEGENERATE_LENGTH`] has no usable direction and
    /// is returned unchanged. A negative `length` flips the direction.
    fn with_length(self, length: Scalar) -> Self;

    /// Whether every component lies within `[-half_extents, half_extents]`
    /// on its axis.
    fn within_half_extents(self, half_extents: Self) -> bool;
}

impl VectorExt for Vector {
    #[inline]
    fn with_length(self, length: Scalar) -> Self {
        let current = self.length();

        if current.abs() < DEGENERATE_LENGTH {
            return self;
        }

        self * (length / current)
    }

    #[inline]
    fn within_half_extents(self, half_extents: Self) -> bool {
        self.x.abs() <= half_extents.x
            && self.y.abs() <= half_extents.y
            && self.z.abs() <= half_extents.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_length_preserves_direction() {
        let v = Vector::new(3.0, 0.0, 4.0);
        let scaled = v.with_length(10.0);

        assert!((scaled.length() - 10.0).abs() < 1e-12);
        assert!((scaled - Vector::new(6.0, 0.0, 8.0)).length() < 1e-12);
    }

    #[test]
    fn test_with_length_negative_flips_direction() {
        let v = Vector::new(0.0, 2.0, 0.0);
        assert_eq!(v.with_length(-1.0), Vector::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_with_length_degenerate_vector_is_noop() {
        let tiny = Vector::new(1e-20, 0.0, 0.0);
        assert_eq!(tiny.with_length(5.0), tiny);
        assert_eq!(Vector::ZERO.with_length(5.0), Vector::ZERO);

        let rescaled = Vector::ZERO.with_length(5.0);
        assert!(rescaled.is_finite(), "zero vector must not become NaN");
    }

    #[test]
    fn test_within_half_extents() {
        let half = Vector::new(1.0, 2.0, 3.0);

        assert!(Vector::new(0.5, -2.0, 2.9).within_half_extents(half));
        assert!(Vector::new(-1.0, 2.0, -3.0).within_half_extents(half));
        assert!(!Vector::new(1.01, 0.0, 0.0).within_half_extents(half));
        assert!(!Vector::new(0.0, 0.0, -3.5).within_half_extents(half));
    }
}
