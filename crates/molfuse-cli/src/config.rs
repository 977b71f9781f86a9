mod file;

pub use file::FileConfig;

use crate::cli::RunArgs;
use crate::error::Result;
use molfuse::engine::config::{RunConfig, SimulationConfig};
use std::path::PathBuf;
use tracing::debug;

/// Fully resolved settings for the `run` command.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub run: RunConfig,
    pub output: Option<PathBuf>,
}

impl AppConfig {
    /// Layers defaults, the optional config file, CLI flags and `--set`
    /// overrides, in that order.
    pub fn from_args(args: &RunArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::from_file(path)?,
            None => {
                debug!("No configuration file given; starting from defaults.");
                FileConfig::default()
            }
        };
        let (simulation, run) = file.merge_with_cli(args)?;
        Ok(Self {
            simulation,
            run,
            output: args.output.clone(),
        })
    }
}
