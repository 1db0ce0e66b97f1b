use std::path::{Path, PathBuf};

use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::physics::container::{Container, Piston};
use crate::physics::initializer::SpawnLayout;
use crate::physics::interactions::InteractionLaw;
use crate::physics::math::{Scalar, Vector};
use crate::physics::octree::OctreeBudget;
use crate::physics::species::SpeciesTable;

/// Prefix for environment overrides, e.g. `GASBOX__PHYSICS__TIME_STEP=0.05`
pub const ENV_PREFIX: &str = "GASBOX";

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub container: ContainerConfig,
    pub octree: OctreeConfig,
    pub species: SpeciesConfig,
    pub initial: InitialConfig,
    pub run: RunConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Most particles the simulation will ever hold
    pub capacity: usize,
    pub time_step: Scalar,
    pub law: InteractionLaw,
    /// Attraction sphere radius in units of the largest collision radius
    pub cutoff_factor: Scalar,
    /// Constant acceleration applied to every particle, e.g. gravity
    pub external_acceleration: [Scalar; 3],
    /// Steps between energy corrections; 0 disables them
    pub energy_fix_interval: u64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            time_step: 0.1,
            law: InteractionLaw::default(),
            cutoff_factor: 7.0,
            external_acceleration: [0.0; 3],
            energy_fix_interval: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ContainerConfig {
    pub size: [Scalar; 3],
    /// Swing of the far x wall about its rest position; 0 keeps it fixed
    pub piston_amplitude: Scalar,
    /// Piston phase advance per step, in radians
    pub piston_frequency: Scalar,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            size: [200.0; 3],
            piston_amplitude: 0.0,
            piston_frequency: 0.02,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct OctreeConfig {
    /// Node budget in multiples of the particle capacity
    pub node_budget_factor: usize,
    /// Defaults to ⌈log₂ node budget⌉
    pub separation_tries: Option<usize>,
    /// Defaults to ten times the separation tries
    pub max_depth: Option<usize>,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            node_budget_factor: 4,
            separation_tries: None,
            max_depth: None,
        }
    }
}

impl OctreeConfig {
    pub fn budget(&self, capacity: usize) -> OctreeBudget {
        let mut budget = OctreeBudget::for_capacity(capacity, self.node_budget_factor);
        if let Some(tries) = self.separation_tries {
            budget = budget.with_separation_tries(tries);
        }
        if let Some(depth) = self.max_depth {
            budget = budget.with_max_depth(depth);
        }
        budget
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct SpeciesProperties {
    pub mass: Scalar,
    pub collision_radius: Scalar,
}

impl Default for SpeciesProperties {
    fn default() -> Self {
        Self {
            mass: 1.0,
            collision_radius: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct BondEnergyConfig {
    pub helium_helium: Scalar,
    pub helium_argon: Scalar,
    pub argon_argon: Scalar,
}

impl Default for BondEnergyConfig {
    fn default() -> Self {
        Self {
            helium_helium: 0.0845,
            helium_argon: 0.290,
            argon_argon: 0.992,
        }
    }
}

/// Masses in atomic mass units, radii in ångström
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct SpeciesConfig {
    pub helium: SpeciesProperties,
    pub argon: SpeciesProperties,
    pub bond_energy: BondEnergyConfig,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            helium: SpeciesProperties {
                mass: 4.00,
                collision_radius: 1.28,
            },
            argon: SpeciesProperties {
                mass: 39.95,
                collision_radius: 1.91,
            },
            bond_energy: BondEnergyConfig::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InitialConfig {
    pub particle_count: usize,
    /// Share of particles spawned as helium, the rest are argon
    pub helium_fraction: Scalar,
    pub temperature: Scalar,
    pub layout: SpawnLayout,
    pub seed: Option<u64>,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            helium_fraction: 0.5,
            temperature: 2.5,
            layout: SpawnLayout::default(),
            seed: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub steps: u64,
    /// Steps between observable reports; 0 disables them
    pub report_interval: u64,
    /// Slabs along x for concentration reports in the diffusion layout
    pub concentration_slabs: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 1000,
            report_interval: 100,
            concentration_slabs: 10,
        }
    }
}

impl SimulationConfig {
    /// Reads a TOML file. Missing sections and fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
    }

    /// Load configuration from a file, falling back to defaults if the file doesn't exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("Config file {} not found. Using defaults.", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{e}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Location of the per-user configuration file, if the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gasbox").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Defaults, overlaid by the per-user config file, overlaid by
    /// `GASBOX__SECTION__FIELD` environment variables.
    pub fn load_from_user_config() -> Self {
        let path = Self::user_config_path();
        match Self::load_layered(path.as_deref()) {
            Ok(config) => {
                if let Some(path) = path.filter(|path| path.exists()) {
                    info!("Loaded configuration from {}", path.display());
                }
                config
            }
            Err(e) => {
                warn!("{e}. Using defaults.");
                Self::default()
            }
        }
    }

    fn load_layered(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|layered| layered.try_deserialize())
            .map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn container_size(&self) -> Vector {
        Vector::from_array(self.container.size)
    }

    pub fn external_acceleration(&self) -> Vector {
        Vector::from_array(self.physics.external_acceleration)
    }

    /// The moving wall, or `None` while the box is fixed
    pub fn piston(&self) -> Result<Option<Piston>, ConfigError> {
        let container = &self.container;
        if container.piston_amplitude == 0.0 {
            return Ok(None);
        }
        Piston::new(
            self.container_size(),
            container.piston_amplitude,
            container.piston_frequency,
        )
        .map(Some)
    }

    pub fn octree_budget(&self) -> OctreeBudget {
        self.octree.budget(self.physics.capacity)
    }

    /// Checks every value a simulation would reject, reporting the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;

        if physics.capacity == 0 {
            return Err(ConfigError::InvalidPhysics(
                "capacity must be at least 1".to_string(),
            ));
        }
        if !(physics.time_step.is_finite() && physics.time_step > 0.0) {
            return Err(ConfigError::InvalidPhysics(format!(
                "time step must be positive, got {}",
                physics.time_step
            )));
        }
        if !(physics.cutoff_factor.is_finite() && physics.cutoff_factor > 0.0) {
            return Err(ConfigError::InvalidPhysics(format!(
                "cutoff factor must be positive, got {}",
                physics.cutoff_factor
            )));
        }
        if !self.external_acceleration().is_finite() {
            return Err(ConfigError::InvalidPhysics(
                "external acceleration must be finite".to_string(),
            ));
        }
        if self.octree.node_budget_factor == 0 {
            return Err(ConfigError::InvalidPhysics(
                "octree node budget factor must be at least 1".to_string(),
            ));
        }

        Container::new(self.container_size())?;
        self.piston()?;
        SpeciesTable::from_config(&self.species)?;

        let initial = &self.initial;
        if !(0.0..=1.0).contains(&initial.helium_fraction) {
            return Err(ConfigError::InvalidInitialConditions(format!(
                "helium fraction must lie in [0, 1], got {}",
                initial.helium_fraction
            )));
        }
        if !(initial.temperature.is_finite() && initial.temperature >= 0.0) {
            return Err(ConfigError::InvalidInitialConditions(format!(
                "temperature must be non-negative, got {}",
                initial.temperature
            )));
        }

        if self.run.concentration_slabs == 0 {
            return Err(ConfigError::InvalidRun(
                "concentration slabs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
