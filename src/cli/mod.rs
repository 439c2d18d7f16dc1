//! CLI command implementations for grandsim.

pub(crate) mod batch;
pub(crate) mod init;
pub(crate) mod run;
pub(crate) mod validate;

mod output;

use clap::{Args, ValueEnum};
use grandsim::{Content, ScenarioBuilder, SimConfig, SimError, SimulationContext};
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `batch` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BatchFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format, one row per faction.
    Csv,
}

/// Where the starting world comes from.
#[derive(Debug, Clone, Args)]
pub(crate) struct WorldArgs {
    /// Scenario file (JSON). Without one a grid world is built
    #[arg(long)]
    pub(crate) scenario: Option<PathBuf>,

    /// Content tables (JSON) for a built world
    #[arg(long)]
    pub(crate) content: Option<PathBuf>,

    /// Balance constants (JSON); replaces the scenario's
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Map width of a built world
    #[arg(long, default_value = "16")]
    pub(crate) width: u16,

    /// Map height of a built world
    #[arg(long, default_value = "12")]
    pub(crate) height: u16,

    /// Factions in a built world
    #[arg(long, default_value = "4")]
    pub(crate) factions: usize,

    /// Starting workers per province in a built world
    #[arg(long, default_value = "4")]
    pub(crate) workers: u32,
}

impl WorldArgs {
    /// Load the scenario file, or build a grid world.
    ///
    /// Borders are recalculated after loading, since they are not part of
    /// the turn.
    pub(crate) fn load(&self) -> Result<SimulationContext, CliError> {
        let config = self.config.as_deref().map(SimConfig::from_file).transpose()?;

        let mut ctx = match &self.scenario {
            Some(path) => {
                let mut ctx = SimulationContext::load(path)?;
                grandsim::sim::calculate_borders(&mut ctx);
                ctx
            }
            None => {
                let content = match &self.content {
                    Some(path) => Content::from_file(path)?,
                    None => Content::builtin(),
                };
                ScenarioBuilder::new()
                    .content(content)
                    .config(config.unwrap_or_default())
                    .size(self.width, self.height)
                    .factions(self.factions)
                    .workers(self.workers)
                    .build()?
            }
        };

        if let Some(config) = config {
            ctx.config = config;
        }
        Ok(ctx)
    }
}

/// Seed from the clock when none is given.
pub(crate) fn seed_or_clock(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
            .unwrap_or(42)
    })
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SimError> for CliError {
    fn from(e: SimError) -> Self {
        Self::new(e.to_string())
    }
}
