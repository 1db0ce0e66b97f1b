//! Command line interface for Gasbox

use clap::Parser;
use std::fmt;

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::physics::initializer::SpawnLayout;
use crate::physics::interactions::InteractionLaw;

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be loaded
    ConfigLoad(ConfigError),
    /// The configuration after overrides is unusable
    InvalidConfig(ConfigError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigLoad(err) => write!(f, "{err}"),
            CliError::InvalidConfig(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigLoad(err) | CliError::InvalidConfig(err) => Some(err),
        }
    }
}

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

/// Gasbox - molecular gas in a box
#[derive(Parser, Debug)]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Number of particles to spawn (overrides config file)
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub particles: Option<usize>,

    /// Number of steps to run (overrides config file)
    #[arg(short = 's', long, value_name = "COUNT")]
    pub steps: Option<u64>,

    /// Interaction law
    #[arg(short = 'l', long, value_name = "LAW")]
    pub law: Option<InteractionLaw>,

    /// Random seed for initial conditions
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Initial temperature in energy units
    #[arg(short = 't', long, value_name = "VALUE")]
    pub temperature: Option<f64>,

    /// Steps between energy corrections (0 disables them)
    #[arg(long, value_name = "STEPS")]
    pub energy_fix_every: Option<u64>,

    /// Steps between observable reports (0 disables them)
    #[arg(long, value_name = "STEPS")]
    pub report_every: Option<u64>,

    /// Start with helium and argon in opposite halves of the box
    #[arg(long)]
    pub diffusion: bool,

    /// Slabs along x for the concentration profile of a diffusion run
    #[arg(long, value_name = "COUNT")]
    pub slabs: Option<usize>,

    /// Swing of the far x wall; 0 keeps the box fixed
    #[arg(long, value_name = "LENGTH")]
    pub piston_amplitude: Option<f64>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

/// Loads configuration from file or defaults, then applies command-line overrides
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig, CliError> {
    let mut config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {config_path}");
        SimulationConfig::load(config_path).map_err(CliError::ConfigLoad)?
    } else {
        SimulationConfig::load_from_user_config()
    };

    apply_overrides(args, &mut config);
    config.validate().map_err(CliError::InvalidConfig)?;

    Ok(config)
}

fn apply_overrides(args: &Args, config: &mut SimulationConfig) {
    if let Some(count) = args.particles {
        println!("Overriding particle count to: {count}");
        config.initial.particle_count = count;
        if count > config.physics.capacity {
            config.physics.capacity = count;
        }
    }

    if let Some(steps) = args.steps {
        println!("Overriding step count to: {steps}");
        config.run.steps = steps;
    }

    if let Some(law) = args.law {
        println!("Using interaction law: {law:?}");
        config.physics.law = law;
    }

    if let Some(seed) = args.seed {
        println!("Using random seed: {seed}");
        config.initial.seed = Some(seed);
    }

    if let Some(temperature) = args.temperature {
        println!("Overriding temperature to: {temperature}");
        config.initial.temperature = temperature;
    }

    if let Some(interval) = args.energy_fix_every {
        config.physics.energy_fix_interval = interval;
    }

    if let Some(interval) = args.report_every {
        config.run.report_interval = interval;
    }

    if args.diffusion {
        config.initial.layout = SpawnLayout::Diffusion;
    }

    if let Some(slabs) = args.slabs {
        config.run.concentration_slabs = slabs;
    }

    if let Some(amplitude) = args.piston_amplitude {
        println!("Driving the far x wall with amplitude: {amplitude}");
        config.container.piston_amplitude = amplitude;
    }
}
