use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "MolFuse Developers",
    version,
    about = "MolFuse CLI - Run grid-based molecule fusion simulations from the command line.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Seed a scene with random molecules and run it for a number of ticks.
    Run(RunArgs),
    /// Print the default configuration as TOML.
    Defaults,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to write the final scene snapshot to, in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    // --- Run Overrides ---
    /// Override the number of ticks to simulate.
    #[arg(short, long, value_name = "INT")]
    pub ticks: Option<u64>,

    /// Override the number of molecules spawned before the first tick.
    #[arg(short, long, value_name = "INT")]
    pub molecules: Option<usize>,

    /// Override the seconds advanced per tick.
    #[arg(long, value_name = "FLOAT")]
    pub delta: Option<f64>,

    // --- Scene Overrides ---
    /// Seed the random number generator for a reproducible run.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Stop drifting after the first fusion, overriding the config file.
    #[arg(long)]
    pub pause_on_collision: bool,

    /// Set a specific configuration value, overriding the config file and flags.
    /// Can be used multiple times. Example: -S collision.proximity-factor=0.6
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
