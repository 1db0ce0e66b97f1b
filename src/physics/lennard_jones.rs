//! Lennard-Jones coefficients derived once from the species table.
//!
//! With σ = r_a + r_b and ε the pair's bond energy:
//!
//! ```text
//! U(r) = 4ε((σ/r)¹² − (σ/r)⁶)       = C/r¹² + D/r⁶
//! F(r) = −48εσ¹²/r¹³ + 24εσ⁶/r⁷     = A/r¹³ + B/r⁷
//! ```
//!
//! `F` is signed so that a positive value pulls the pair together. Distances
//! below 1.12σ are raised to 1.12σ, just under the potential minimum at
//! 2^(1/6)σ, so the force never diverges.

use crate::physics::math::Scalar;
use crate::physics::species::{Species, SpeciesTable};

/// Multiple of σ below which the force law is clamped
pub const SHORT_RANGE_CLAMP: Scalar = 1.12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairCoefficients {
    pub sigma: Scalar,
    pub force_a: Scalar,
    pub force_b: Scalar,
    pub potential_c: Scalar,
    pub potential_d: Scalar,
    pub clamp_distance: Scalar,
}

impl PairCoefficients {
    fn new(bond_energy: Scalar, sigma: Scalar) -> Self {
        let sigma6 = sigma.powi(6);
        let sigma12 = sigma6 * sigma6;

        Self {
            sigma,
            force_a: -48.0 * bond_energy * sigma12,
            force_b: 24.0 * bond_energy * sigma6,
            potential_c: 4.0 * bond_energy * sigma12,
            potential_d: -4.0 * bond_energy * sigma6,
            clamp_distance: SHORT_RANGE_CLAMP * sigma,
        }
    }

    /// Attractive force magnitude at `distance` (negative means repulsive).
    #[inline]
    pub fn force(&self, distance: Scalar) -> Scalar {
        let inverse = 1.0 / distance.max(self.clamp_distance);
        let inverse2 = inverse * inverse;
        let inverse6 = inverse2 * inverse2 * inverse2;

        (self.force_a * inverse6 + self.force_b) * inverse6 * inverse
    }

    #[inline]
    pub fn potential(&self, distance: Scalar) -> Scalar {
        let inverse = 1.0 / distance.max(self.clamp_distance);
        let inverse2 = inverse * inverse;
        let inverse6 = inverse2 * inverse2 * inverse2;

        (self.potential_c * inverse6 + self.potential_d) * inverse6
    }
}

/// Immutable interaction constants handed to the interaction engine.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionCoefficients {
    species: SpeciesTable,
    pairs: [[PairCoefficients; Species::COUNT]; Species::COUNT],
    collision_reach: Scalar,
    cutoff_distance: Scalar,
}

impl InteractionCoefficients {
    /// `cutoff_factor` is the radius of each particle's attraction sphere in
    /// units of the largest collision radius; attraction acts while two such
    /// spheres overlap.
    pub fn new(species: SpeciesTable, cutoff_factor: Scalar) -> Self {
        let pairs = Species::ALL.map(|a| {
            Species::ALL.map(|b| {
                PairCoefficients::new(
                    species.bond_energy(a, b),
                    species.collision_radius(a) + species.collision_radius(b),
                )
            })
        });
        let max_radius = species.max_collision_radius();

        Self {
            species,
            pairs,
            collision_reach: 2.0 * max_radius,
            cutoff_distance: 2.0 * cutoff_factor * max_radius,
        }
    }

    #[inline]
    pub fn species(&self) -> &SpeciesTable {
        &self.species
    }

    #[inline]
    pub fn pair(&self, a: Species, b: Species) -> &PairCoefficients {
        &self.pairs[a.index()][b.index()]
    }

    /// Largest center distance at which any two particles can collide
    #[inline]
    pub fn collision_reach(&self) -> Scalar {
        self.collision_reach
    }

    #[inline]
    pub fn cutoff_distance(&self) -> Scalar {
        self.cutoff_distance
    }
}
