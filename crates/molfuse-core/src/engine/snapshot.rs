use crate::core::models::set::MoleculeSet;
use serde::Serialize;

/// A serialisable picture of a scene at one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    pub tick: u64,
    pub molecules: Vec<MoleculeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoleculeSnapshot {
    pub position: [f64; 3],
    /// Accumulated Euler angles (XYZ) of the atom grid.
    pub grid_rotation: [f64; 3],
    pub drift_direction: [f64; 3],
    pub atoms: Vec<AtomSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomSnapshot {
    pub row: i32,
    pub column: i32,
    pub depth: i32,
    /// Orientation quaternion as `[i, j, k, w]`.
    pub orientation: [f64; 4],
}

impl SceneSnapshot {
    pub fn capture(tick: u64, molecules: &MoleculeSet) -> Self {
        let molecules = molecules
            .iter()
            .filter(|(_, m)| !m.is_destroyed())
            .map(|(_, m)| MoleculeSnapshot {
                position: m.position().coords.into(),
                grid_rotation: m.grid_rotation().into(),
                drift_direction: m.motion().drift_direction.into(),
                atoms: m
                    .atoms()
                    .iter()
                    .map(|atom| {
                        let q = atom.orientation().quaternion();
                        AtomSnapshot {
                            row: atom.row(),
                            column: atom.column(),
                            depth: atom.depth(),
                            orientation: [q.i, q.j, q.k, q.w],
                        }
                    })
                    .collect(),
            })
            .collect();

        Self { tick, molecules }
    }

    pub fn atom_count(&self) -> usize {
        self.molecules.iter().map(|m| m.atoms.len()).sum()
    }

    /// Size of the largest molecule, zero for an empty scene.
    pub fn largest_molecule(&self) -> usize {
        self.molecules.iter().map(|m| m.atoms.len()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::{AtomGeometry, GridCell};
    use crate::core::models::molecule::{Molecule, Motion};
    use nalgebra::{Point3, Vector3};

    fn scene() -> MoleculeSet {
        let mut set = MoleculeSet::new();
        for (position, cells) in [
            (Point3::new(1.0, 2.0, 3.0), vec![GridCell::ORIGIN, GridCell::new(0, 1, 0)]),
            (Point3::origin(), vec![GridCell::ORIGIN]),
        ] {
            set.insert_with(|id| {
                let mut m = Molecule::new(
                    id,
                    position,
                    Motion::still(),
                    Vector3::repeat(20.0),
                    AtomGeometry::default(),
                );
                for cell in cells {
                    m.add_atom(cell, None).unwrap();
                }
                m
            });
        }
        set
    }

    #[test]
    fn capture_lists_molecules_in_order() {
        let snapshot = SceneSnapshot::capture(12, &scene());
        assert_eq!(snapshot.tick, 12);
        assert_eq!(snapshot.molecules.len(), 2);
        assert_eq!(snapshot.molecules[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(snapshot.molecules[0].atoms[1].column, 1);
        assert_eq!(snapshot.molecules[0].atoms[0].orientation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(snapshot.atom_count(), 3);
        assert_eq!(snapshot.largest_molecule(), 2);
    }

    #[test]
    fn capture_skips_destroyed_molecules() {
        let mut set = scene();
        let last = *set.ids().last().unwrap();
        let _ = set.get_mut(last).unwrap().destroy();
        let snapshot = SceneSnapshot::capture(0, &set);
        assert_eq!(snapshot.molecules.len(), 1);
    }

    #[test]
    fn snapshot_serializes_to_toml() {
        let text = toml::to_string(&SceneSnapshot::capture(3, &scene())).unwrap();
        assert!(text.contains("tick = 3"));
        assert!(text.contains("[[molecules]]"));
        assert!(text.contains("[[molecules.atoms]]"));
    }
}
