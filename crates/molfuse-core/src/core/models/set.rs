use super::collision::{CollisionPolicy, Fusion};
use super::ids::MoleculeId;
use super::molecule::Molecule;
use rand::Rng;
use slotmap::SlotMap;
use tracing::{trace, warn};

/// Owning store of every molecule in a scene, iterated in insertion order.
///
/// Molecules are addressed by stable [`MoleculeId`] handles; a removed id is
/// never reused for a different molecule.
#[derive(Debug, Clone, Default)]
pub struct MoleculeSet {
    molecules: SlotMap<MoleculeId, Molecule>,
    order: Vec<MoleculeId>,
}

impl MoleculeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    pub fn contains(&self, id: MoleculeId) -> bool {
        self.molecules.contains_key(id)
    }

    pub fn get(&self, id: MoleculeId) -> Option<&Molecule> {
        self.molecules.get(id)
    }

    pub fn get_mut(&mut self, id: MoleculeId) -> Option<&mut Molecule> {
        self.molecules.get_mut(id)
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> &[MoleculeId] {
        &self.order
    }

    /// Returns an iterator over all molecules in insertion order.
    ///
    /// # Return
    ///
    /// An iterator yielding `(MoleculeId, &Molecule)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (MoleculeId, &Molecule)> {
        self.order
            .iter()
            .filter_map(|&id| self.molecules.get(id).map(|m| (id, m)))
    }

    /// Inserts a molecule built from its freshly allocated id.
    ///
    /// # Arguments
    ///
    /// * `build` - Constructor receiving the id the molecule will be stored under.
    ///
    /// # Return
    ///
    /// The id of the inserted molecule.
    pub fn insert_with(&mut self, build: impl FnOnce(MoleculeId) -> Molecule) -> MoleculeId {
        let id = self.molecules.insert_with_key(build);
        self.order.push(id);
        id
    }

    pub fn remove(&mut self, id: MoleculeId) -> Option<Molecule> {
        let removed = self.molecules.remove(id)?;
        self.order.retain(|&other| other != id);
        Some(removed)
    }

    /// Drifts every active molecule by one tick.
    pub fn update_all<R: Rng + ?Sized>(&mut self, delta: f64, rng: &mut R) {
        for &id in &self.order {
            if let Some(molecule) = self.molecules.get_mut(id) {
                molecule.update(delta, rng);
            }
        }
    }

    /// Advances atom animations of `ids` without moving anything; unknown
    /// ids are skipped.
    pub fn pulse(&mut self, ids: &[MoleculeId], delta: f64) {
        for &id in ids {
            if let Some(molecule) = self.molecules.get_mut(id) {
                molecule.pulse(delta);
            }
        }
    }

    /// Tests `id` against `candidates` in order and applies the first fusion found.
    ///
    /// The candidate that fused is flagged as destroyed but stays in the set;
    /// the caller is responsible for removing it.
    ///
    /// # Arguments
    ///
    /// * `id` - The molecule being tested; it grows if a fusion happens.
    /// * `candidates` - Molecules to test against, in priority order.
    /// * `policy` - Collision tunables.
    ///
    /// # Return
    ///
    /// The applied [`Fusion`], or `None` if no candidate passed every gate.
    pub fn check_collision(
        &mut self,
        id: MoleculeId,
        candidates: &[MoleculeId],
        policy: &CollisionPolicy,
    ) -> Option<Fusion> {
        for &candidate in candidates {
            let (Some(molecule), Some(other)) = (self.molecules.get(id), self.molecules.get(candidate))
            else {
                continue;
            };

            let plan = match molecule.collision_status(other, policy) {
                Ok(plan) => plan,
                Err(rejection) => {
                    trace!(hit_by = ?id, candidate = ?candidate, %rejection, "No collision.");
                    continue;
                }
            };

            let atom_index = match self.molecules.get_mut(id).map(|m| m.apply_fusion(&plan)) {
                Some(Ok(index)) => index,
                Some(Err(e)) => {
                    warn!(hit_by = ?id, candidate = ?candidate, error = %e, "Fusion plan could not be applied.");
                    continue;
                }
                None => continue,
            };
            let Some(destroyed) = self.molecules.get_mut(candidate).map(Molecule::destroy) else {
                continue;
            };

            return Some(Fusion {
                hit_by: id,
                hit_with: candidate,
                atom_index,
                cell: plan.cell,
                destroyed,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::{AtomGeometry, GridCell};
    use crate::core::models::molecule::Motion;
    use nalgebra::{Point3, Vector3};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn spawn(set: &mut MoleculeSet, position: Point3<f64>, cells: &[GridCell]) -> MoleculeId {
        set.insert_with(|id| {
            let mut m = Molecule::new(
                id,
                position,
                Motion::still(),
                Vector3::repeat(20.0),
                AtomGeometry::default(),
            );
            for &cell in cells {
                m.add_atom(cell, None).unwrap();
            }
            m
        })
    }

    #[test]
    fn insertion_order_is_preserved_across_removal() {
        let mut set = MoleculeSet::new();
        let a = spawn(&mut set, Point3::origin(), &[GridCell::ORIGIN]);
        let b = spawn(&mut set, Point3::origin(), &[GridCell::ORIGIN]);
        let c = spawn(&mut set, Point3::origin(), &[GridCell::ORIGIN]);

        assert!(set.remove(b).is_some());
        assert!(set.remove(b).is_none());
        assert_eq!(set.ids(), &[a, c]);
        assert_eq!(set.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(b));
        assert_eq!(set.get(a).unwrap().id(), a);
    }

    #[test]
    fn check_collision_fuses_and_flags_candidate() {
        let mut set = MoleculeSet::new();
        let a = spawn(&mut set, Point3::origin(), &[GridCell::ORIGIN]);
        let b = spawn(&mut set, Point3::new(1.5, 0.0, 0.0), &[GridCell::ORIGIN]);

        let fusion = set
            .check_collision(a, &[a, b], &CollisionPolicy::default())
            .expect("adjacent single atoms should fuse");
        assert_eq!(fusion.hit_by, a);
        assert_eq!(fusion.hit_with, b);
        assert_eq!(fusion.atom_index, 1);
        assert_eq!(fusion.cell, GridCell::new(0, 1, 0));
        assert_eq!(fusion.destroyed.molecule, b);

        assert_eq!(set.get(a).unwrap().atom_count(), 2);
        assert!(set.get(b).unwrap().is_destroyed());
    }

    #[test]
    fn check_collision_returns_none_when_every_gate_rejects() {
        let mut set = MoleculeSet::new();
        let a = spawn(&mut set, Point3::origin(), &[GridCell::ORIGIN]);
        let far = spawn(&mut set, Point3::new(10.0, 0.0, 0.0), &[GridCell::ORIGIN]);

        assert!(set.check_collision(a, &[a, far], &CollisionPolicy::default()).is_none());
        assert_eq!(set.get(a).unwrap().atom_count(), 1);
        assert!(!set.get(far).unwrap().is_destroyed());
    }

    #[test]
    fn check_collision_with_no_candidates_is_a_no_op() {
        let mut set = MoleculeSet::new();
        let a = spawn(&mut set, Point3::origin(), &[GridCell::ORIGIN]);
        let b = spawn(&mut set, Point3::new(1.5, 0.0, 0.0), &[GridCell::ORIGIN]);

        assert!(set.check_collision(a, &[], &CollisionPolicy::default()).is_none());
        assert_eq!(set.get(a).unwrap().atom_count(), 1);
        assert_eq!(set.get(b).unwrap().atom_count(), 1);
        assert!(!set.get(a).unwrap().is_destroyed());
        assert!(!set.get(b).unwrap().is_destroyed());
    }

    #[test]
    fn check_collision_stops_at_first_match() {
        let mut set = MoleculeSet::new();
        let a = spawn(&mut set, Point3::origin(), &[GridCell::ORIGIN]);
        let b = spawn(&mut set, Point3::new(1.5, 0.0, 0.0), &[GridCell::ORIGIN]);
        let c = spawn(&mut set, Point3::new(0.0, 1.5, 0.0), &[GridCell::ORIGIN]);

        let fusion = set.check_collision(a, &[b, c], &CollisionPolicy::default()).unwrap();
        assert_eq!(fusion.hit_with, b);
        assert!(!set.get(c).unwrap().is_destroyed());
        assert_eq!(set.get(a).unwrap().atom_count(), 2);
    }

    #[test]
    fn update_all_moves_active_molecules_only() {
        let mut set = MoleculeSet::new();
        let a = spawn(&mut set, Point3::origin(), &[GridCell::ORIGIN]);
        let b = spawn(&mut set, Point3::origin(), &[GridCell::ORIGIN]);
        for id in [a, b] {
            set.get_mut(id).unwrap().set_motion(Motion {
                speed: Vector3::repeat(0.1),
                ..Motion::still()
            });
        }
        set.get_mut(b).unwrap().set_active(false);

        set.update_all(0.1, &mut StdRng::seed_from_u64(1));
        assert!((set.get(a).unwrap().position() - Point3::new(0.1, 0.1, 0.1)).norm() < 1e-12);
        assert_eq!(set.get(b).unwrap().position(), Point3::origin());

        set.pulse(&[b], 0.5);
        assert_eq!(set.get(b).unwrap().position(), Point3::origin());
        assert!((set.get(b).unwrap().atoms()[0].animation().elapsed - 0.5).abs() < 1e-12);
        assert!((set.get(a).unwrap().atoms()[0].animation().elapsed - 0.1).abs() < 1e-12);
    }
}
