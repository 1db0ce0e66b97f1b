//! Molecule species and their physical constants

use serde::{Deserialize, Serialize};

use crate::config::SpeciesConfig;
use crate::error::ConfigError;
use crate::physics::math::Scalar;

/// Closed set of molecule types a particle can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Helium,
    Argon,
}

impl Species {
    pub const COUNT: usize = 2;
    pub const ALL: [Species; Species::COUNT] = [Species::Helium, Species::Argon];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::Helium => "helium",
            Species::Argon => "argon",
        }
    }
}

/// Per-species mass and collision radius plus the symmetric bond-energy
/// matrix. Read-only for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesTable {
    masses: [Scalar; Species::COUNT],
    collision_radii: [Scalar; Species::COUNT],
    bond_energy: [[Scalar; Species::COUNT]; Species::COUNT],
}

impl SpeciesTable {
    pub fn new(
        masses: [Scalar; Species::COUNT],
        collision_radii: [Scalar; Species::COUNT],
        bond_energy: [[Scalar; Species::COUNT]; Species::COUNT],
    ) -> Result<Self, ConfigError> {
        for species in Species::ALL {
            let mass = masses[species.index()];
            if !(mass.is_finite() && mass > 0.0) {
                return Err(ConfigError::InvalidSpecies(format!(
                    "{} mass must be positive, got {mass}",
                    species.name()
                )));
            }

            let radius = collision_radii[species.index()];
            if !(radius.is_finite() && radius > 0.0) {
                return Err(ConfigError::InvalidSpecies(format!(
                    "{} collision radius must be positive, got {radius}",
                    species.name()
                )));
            }
        }

        for a in Species::ALL {
            for b in Species::ALL {
                let energy = bond_energy[a.index()][b.index()];
                if !(energy.is_finite() && energy >= 0.0) {
                    return Err(ConfigError::InvalidSpecies(format!(
                        "{}-{} bond energy must be non-negative, got {energy}",
                        a.name(),
                        b.name()
                    )));
                }
                if energy != bond_energy[b.index()][a.index()] {
                    return Err(ConfigError::InvalidSpecies(format!(
                        "bond energy matrix is not symmetric for {}-{}",
                        a.name(),
                        b.name()
                    )));
                }
            }
        }

        Ok(Self {
            masses,
            collision_radii,
            bond_energy,
        })
    }

    pub fn from_config(config: &SpeciesConfig) -> Result<Self, ConfigError> {
        let helium_argon = config.bond_energy.helium_argon;
        Self::new(
            [config.helium.mass, config.argon.mass],
            [config.helium.collision_radius, config.argon.collision_radius],
            [
                [config.bond_energy.helium_helium, helium_argon],
                [helium_argon, config.bond_energy.argon_argon],
            ],
        )
    }

    #[inline]
    pub fn mass(&self, species: Species) -> Scalar {
        self.masses[species.index()]
    }

    #[inline]
    pub fn collision_radius(&self, species: Species) -> Scalar {
        self.collision_radii[species.index()]
    }

    #[inline]
    pub fn bond_energy(&self, a: Species, b: Species) -> Scalar {
        self.bond_energy[a.index()][b.index()]
    }

    pub fn max_collision_radius(&self) -> Scalar {
        self.collision_radii.iter().copied().fold(0.0, Scalar::max)
    }
}
