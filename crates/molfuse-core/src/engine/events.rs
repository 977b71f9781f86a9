use crate::core::models::atom::GridCell;
use crate::core::models::ids::MoleculeId;

/// Notifications queued by the [`Simulation`](super::simulation::Simulation)
/// for whatever presents the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulationEvent {
    MoleculeSpawned {
        molecule: MoleculeId,
    },
    AtomAdded {
        molecule: MoleculeId,
        atom_index: usize,
        cell: GridCell,
    },
    MoleculeDestroyed {
        molecule: MoleculeId,
    },
    CollisionDetected {
        hit_by: MoleculeId,
        hit_with: MoleculeId,
    },
}

/// Running totals of the events a scene has emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub spawned: usize,
    pub atoms_added: usize,
    pub destroyed: usize,
    pub collisions: usize,
}

impl EventCounts {
    pub fn record(&mut self, event: &SimulationEvent) {
        match event {
            SimulationEvent::MoleculeSpawned { .. } => self.spawned += 1,
            SimulationEvent::AtomAdded { .. } => self.atoms_added += 1,
            SimulationEvent::MoleculeDestroyed { .. } => self.destroyed += 1,
            SimulationEvent::CollisionDetected { .. } => self.collisions += 1,
        }
    }
}
