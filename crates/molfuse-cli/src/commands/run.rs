use crate::cli::RunArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use molfuse::engine::progress::ProgressReporter;
use molfuse::engine::snapshot::SceneSnapshot;
use molfuse::workflows;
use std::path::Path;
use tracing::info;

pub fn run(args: RunArgs, quiet: bool) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = AppConfig::from_args(&args)?;

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Simulating {} molecule(s) for {} tick(s)...",
        config.run.initial_molecules, config.run.ticks
    );
    info!("Invoking the core simulation workflow...");
    let report = workflows::simulate::run(&config.simulation, &config.run, &reporter)?;

    println!(
        "✓ {} fusion(s). {} molecule(s) remain, the largest has {} atom(s).",
        report.fusions,
        report.snapshot.molecules.len(),
        report.snapshot.largest_molecule()
    );

    if let Some(path) = &config.output {
        write_snapshot(&report.snapshot, path)?;
        println!("✓ Snapshot written to: {}", path.display());
    }

    Ok(())
}

fn write_snapshot(snapshot: &SceneSnapshot, path: &Path) -> Result<()> {
    info!("Writing scene snapshot to {:?}", path);
    let text = toml::to_string(snapshot).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    std::fs::write(path, text)?;
    Ok(())
}
