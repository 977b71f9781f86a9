use crate::engine::config::{RunConfig, SimulationConfig};
use crate::engine::error::EngineError;
use crate::engine::events::EventCounts;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::simulation::Simulation;
use crate::engine::snapshot::SceneSnapshot;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub ticks: u64,
    pub fusions: usize,
    pub events: EventCounts,
    pub snapshot: SceneSnapshot,
}

#[instrument(skip_all, name = "simulation_workflow")]
pub fn run(
    config: &SimulationConfig,
    run: &RunConfig,
    reporter: &ProgressReporter,
) -> Result<SimulationReport, EngineError> {
    // === Phase 1: Scene setup ===
    reporter.report(Progress::PhaseStart { name: "Seeding" });
    run.validate()?;
    let mut simulation = Simulation::new(config.clone())?;

    for _ in 0..run.initial_molecules {
        simulation.spawn_random_molecule();
    }
    let mut events = EventCounts::default();
    for event in simulation.drain_events() {
        events.record(&event);
    }
    info!(
        molecules = run.initial_molecules,
        seed = ?config.seed,
        "Scene seeded."
    );
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Tick loop ===
    reporter.report(Progress::PhaseStart { name: "Simulating" });
    reporter.report(Progress::TaskStart {
        total_steps: run.ticks,
    });

    let mut fusions = 0;
    for _ in 0..run.ticks {
        let outcome = simulation.step(run.tick_delta);
        for event in simulation.drain_events() {
            events.record(&event);
        }
        if let Some(fusion) = outcome.fusion {
            fusions += 1;
            debug!(tick = outcome.tick, hit_by = ?fusion.hit_by, "Fusion recorded.");
            reporter.report(Progress::Status(format!(
                "{} fusion(s), {} molecule(s)",
                fusions,
                simulation.molecules().len()
            )));
        }
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let snapshot = simulation.snapshot();
    info!(
        fusions,
        molecules = snapshot.molecules.len(),
        largest = snapshot.largest_molecule(),
        "Simulation complete."
    );

    Ok(SimulationReport {
        ticks: run.ticks,
        fusions,
        events,
        snapshot,
    })
}
