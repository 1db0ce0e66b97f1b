//! Error types for configuration and simulation setup

use std::collections::TryReserveError;
use std::fmt;

/// Configuration values that cannot produce a working simulation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A species constant is out of range
    InvalidSpecies(String),
    /// Container dimensions are not usable
    InvalidContainer(String),
    /// A physics parameter is out of range
    InvalidPhysics(String),
    /// Initial condition parameters are out of range
    InvalidInitialConditions(String),
    /// Run cadence or reporting parameters are out of range
    InvalidRun(String),
    /// The configuration source could not be read or parsed
    Load(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSpecies(msg) => write!(f, "Invalid species constants: {msg}"),
            ConfigError::InvalidContainer(msg) => write!(f, "Invalid container: {msg}"),
            ConfigError::InvalidPhysics(msg) => write!(f, "Invalid physics parameter: {msg}"),
            ConfigError::InvalidInitialConditions(msg) => {
                write!(f, "Invalid initial conditions: {msg}")
            }
            ConfigError::InvalidRun(msg) => write!(f, "Invalid run parameter: {msg}"),
            ConfigError::Load(msg) => write!(f, "Failed to load configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failures while setting up a simulation
#[derive(Debug)]
pub enum SimulationError {
    /// The configuration was rejected
    Config(ConfigError),
    /// Fixed-capacity particle or tree storage could not be allocated
    Allocation {
        what: &'static str,
        capacity: usize,
        source: TryReserveError,
    },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(err) => write!(f, "{err}"),
            SimulationError::Allocation {
                what,
                capacity,
                source,
            } => write!(
                f,
                "Unable to allocate storage for {capacity} {what}: {source}"
            ),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(err) => Some(err),
            SimulationError::Allocation { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::Config(err)
    }
}

/// Reserves exactly `capacity` slots up front so the vector never grows mid-run.
pub(crate) fn reserve_fixed<T>(
    what: &'static str,
    capacity: usize,
) -> Result<Vec<T>, SimulationError> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(capacity)
        .map_err(|source| SimulationError::Allocation {
            what,
            capacity,
            source,
        })?;
    Ok(storage)
}
