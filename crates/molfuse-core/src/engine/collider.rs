use crate::core::models::collision::{CollisionPolicy, Fusion};
use crate::core::models::ids::MoleculeId;
use crate::core::models::set::MoleculeSet;
use tracing::{debug, instrument};

/// The ordered list of molecules taking part in collision detection.
#[derive(Debug, Clone, Default)]
pub struct MoleculeCollider {
    collidables: Vec<MoleculeId>,
}

impl MoleculeCollider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `id` was already registered.
    pub fn add_collidable(&mut self, id: MoleculeId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.collidables.push(id);
        true
    }

    pub fn remove_collidable(&mut self, id: MoleculeId) -> bool {
        match self.collidables.iter().position(|&c| c == id) {
            Some(index) => {
                self.collidables.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: MoleculeId) -> bool {
        self.collidables.contains(&id)
    }

    pub fn collidables(&self) -> &[MoleculeId] {
        &self.collidables
    }

    pub fn len(&self) -> usize {
        self.collidables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collidables.is_empty()
    }

    /// Scans every collidable against the full collidable list.
    ///
    /// The scan ends at the first fusion, so at most one happens per call.
    /// The destroyed molecule is left registered; removing it is up to the
    /// caller.
    #[instrument(skip_all, name = "collider_scan", fields(collidables = self.collidables.len()))]
    pub fn update(&self, molecules: &mut MoleculeSet, policy: &CollisionPolicy) -> Option<Fusion> {
        for &id in &self.collidables {
            if let Some(fusion) = molecules.check_collision(id, &self.collidables, policy) {
                debug!(
                    hit_by = ?fusion.hit_by,
                    hit_with = ?fusion.hit_with,
                    cell = %fusion.cell,
                    "Molecules fused."
                );
                return Some(fusion);
            }
        }
        None
    }
}
