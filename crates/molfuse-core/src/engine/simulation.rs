use super::collider::MoleculeCollider;
use super::config::SimulationConfig;
use super::error::EngineError;
use super::events::SimulationEvent;
use super::snapshot::SceneSnapshot;
use crate::core::models::atom::GridCell;
use crate::core::models::collision::Fusion;
use crate::core::models::ids::MoleculeId;
use crate::core::models::molecule::{Molecule, MoleculeDestroyed, Motion};
use crate::core::models::set::MoleculeSet;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// What a single [`Simulation::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub tick: u64,
    pub fusion: Option<Fusion>,
    /// The scene was frozen, so only the collided molecules were animated.
    pub frozen: bool,
}

/// A tick-driven fusion scene.
///
/// Owns every molecule, the collider that scans them and the RNG that moves
/// them. Commands mutate the scene immediately and queue
/// [`SimulationEvent`]s, which the presentation side collects with
/// [`drain_events`](Self::drain_events).
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    molecules: MoleculeSet,
    collider: MoleculeCollider,
    rng: StdRng,
    events: Vec<SimulationEvent>,
    frozen: Option<(MoleculeId, MoleculeId)>,
    tick: u64,
}

impl Simulation {
    /// Creates an empty scene.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if `config` fails validation.
    pub fn new(config: SimulationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            molecules: MoleculeSet::new(),
            collider: MoleculeCollider::new(),
            rng,
            events: Vec::new(),
            frozen: None,
            tick: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn molecules(&self) -> &MoleculeSet {
        &self.molecules
    }

    pub fn molecule(&self, id: MoleculeId) -> Option<&Molecule> {
        self.molecules.get(id)
    }

    pub fn collider(&self) -> &MoleculeCollider {
        &self.collider
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Events queued since the last drain, oldest first.
    pub fn pending_events(&self) -> &[SimulationEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawns a one-atom molecule with random drift at `position`.
    pub fn spawn_molecule(&mut self, position: Point3<f64>) -> MoleculeId {
        let motion = Motion::random(
            &mut self.rng,
            &self.config.drift_speed,
            &self.config.rotation_speed,
        );
        self.spawn_with_motion(position, motion)
    }

    /// Spawns a one-atom molecule at a uniformly random point inside the bounds.
    pub fn spawn_random_molecule(&mut self) -> MoleculeId {
        let bounds = self.config.bounds;
        let position = Point3::from(Vector3::from_fn(|i, _| {
            self.rng.gen_range(-bounds[i]..=bounds[i])
        }));
        self.spawn_molecule(position)
    }

    /// Spawns a one-atom molecule that neither drifts nor spins.
    pub fn spawn_still_molecule(&mut self, position: Point3<f64>) -> MoleculeId {
        self.spawn_with_motion(position, Motion::still())
    }

    fn spawn_with_motion(&mut self, position: Point3<f64>, motion: Motion) -> MoleculeId {
        let bounds = self.config.bounds;
        let geometry = self.config.atom_geometry();
        let id = self
            .molecules
            .insert_with(|id| Molecule::with_anchor(id, position, motion, bounds, geometry));
        self.collider.add_collidable(id);
        debug!(molecule = ?id, x = position.x, y = position.y, z = position.z, "Spawned molecule.");
        self.events.push(SimulationEvent::MoleculeSpawned { molecule: id });
        id
    }

    /// Adds an atom to `molecule` at `cell`, optionally aligned to `direction`.
    pub fn add_atom_at(
        &mut self,
        molecule: MoleculeId,
        cell: GridCell,
        direction: Option<&Vector3<f64>>,
    ) -> Result<usize, EngineError> {
        let atom_index = self.molecule_mut(molecule)?.add_atom(cell, direction)?;
        self.events.push(SimulationEvent::AtomAdded {
            molecule,
            atom_index,
            cell,
        });
        Ok(atom_index)
    }

    /// Grows `molecule` through the face of atom `atom_index` whose
    /// un-rotated normal is `face_normal`.
    pub fn attach_at_face(
        &mut self,
        molecule: MoleculeId,
        atom_index: usize,
        face_normal: &Vector3<f64>,
    ) -> Result<usize, EngineError> {
        let target = self.molecule_mut(molecule)?;
        if target.atom(atom_index).is_none() {
            return Err(EngineError::AtomNotFound {
                molecule,
                atom_index,
            });
        }
        let index = target.attach_to_atom(atom_index, face_normal)?;
        let cell = target.atoms()[index].cell();
        self.events.push(SimulationEvent::AtomAdded {
            molecule,
            atom_index: index,
            cell,
        });
        Ok(index)
    }

    pub fn destroy_molecule(&mut self, molecule: MoleculeId) -> Result<(), EngineError> {
        let marker = self.molecule_mut(molecule)?.destroy();
        self.discard(marker);
        Ok(())
    }

    /// Clears a freeze left by a fusion under `pause_on_collision`.
    pub fn resume(&mut self) {
        self.frozen = None;
    }

    /// Advances the scene by one tick.
    ///
    /// Every active molecule drifts, then the collider looks for at most one
    /// fusion. A fused candidate is removed from the scene before returning.
    pub fn step(&mut self, delta: f64) -> StepOutcome {
        self.tick += 1;

        if let Some((hit_by, hit_with)) = self.frozen {
            self.molecules.pulse(&[hit_by, hit_with], delta);
            return StepOutcome {
                tick: self.tick,
                fusion: None,
                frozen: true,
            };
        }

        self.molecules.update_all(delta, &mut self.rng);
        let policy = self.config.collision_policy();
        let fusion = self.collider.update(&mut self.molecules, &policy);

        if let Some(fusion) = fusion {
            self.events.push(SimulationEvent::AtomAdded {
                molecule: fusion.hit_by,
                atom_index: fusion.atom_index,
                cell: fusion.cell,
            });
            self.events.push(SimulationEvent::CollisionDetected {
                hit_by: fusion.hit_by,
                hit_with: fusion.hit_with,
            });
            self.discard(fusion.destroyed);
            if self.config.pause_on_collision {
                self.frozen = Some((fusion.hit_by, fusion.hit_with));
            }
        }

        StepOutcome {
            tick: self.tick,
            fusion,
            frozen: false,
        }
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot::capture(self.tick, &self.molecules)
    }

    fn molecule_mut(&mut self, id: MoleculeId) -> Result<&mut Molecule, EngineError> {
        self.molecules
            .get_mut(id)
            .ok_or(EngineError::MoleculeNotFound { molecule: id })
    }

    fn discard(&mut self, marker: MoleculeDestroyed) {
        let id = marker.molecule;
        self.collider.remove_collidable(id);
        self.molecules.remove(id);
        debug!(molecule = ?id, "Destroyed molecule.");
        self.events.push(SimulationEvent::MoleculeDestroyed { molecule: id });
    }
}
