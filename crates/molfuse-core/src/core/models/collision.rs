use super::atom::{Atom, Face, GridCell};
use super::ids::MoleculeId;
use super::molecule::MoleculeDestroyed;
use nalgebra::{Isometry3, Vector3};
use thiserror::Error;

/// Tunables of the pairwise collision test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPolicy {
    /// Fraction of `unit_size * atom_count` within which bounding box centres
    /// must lie for a fusion to be considered.
    pub proximity_factor: f64,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self {
            proximity_factor: 0.5,
        }
    }
}

/// Why a pairwise collision test reported no collision.
///
/// These are policy outcomes, not failures: the scan simply moves on to the
/// next candidate.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum Rejection {
    #[error("one of the molecules is already destroyed")]
    Destroyed,

    #[error("a molecule cannot collide with itself")]
    SelfCollision,

    #[error("candidate has more atoms ({other}) than the tested molecule ({own})")]
    CandidateLarger { own: usize, other: usize },

    #[error("merging two multi-atom molecules is not supported")]
    MultiAtomMerge,

    #[error("a molecule without atoms cannot take part in a fusion")]
    NoAnchor,

    #[error("candidate position lies outside the molecule's bounding box")]
    OutsideBounds,

    #[error("bounding box centres are {distance:.3} apart, limit is {limit:.3}")]
    TooFar { distance: f64, limit: f64 },

    #[error("chosen face direction does not address a grid cell")]
    InvalidTarget,

    #[error("target cell {cell} is already occupied")]
    CellOccupied { cell: GridCell },
}

/// The closest face pairing between one atom of molecule A and the anchor
/// atom of molecule B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    pub atom_a: usize,
    pub atom_b: usize,
    /// Face of `atom_a` that produced the minimum distance.
    pub face: Face,
    /// That face's direction in A's local grid frame.
    pub direction: Vector3<f64>,
    pub distance: f64,
}

impl CollisionResult {
    /// Measures all six faces of `atom_a` against `atom_b`.
    ///
    /// Each face of A is paired with the face of B whose world normal points
    /// most directly back at it, and the distance between the two surface
    /// points is taken. The smallest distance wins; ties keep the earlier face
    /// in [`Face::ALL`] order.
    pub fn between(
        (index_a, atom_a, transform_a): (usize, &Atom, &Isometry3<f64>),
        (index_b, atom_b, transform_b): (usize, &Atom, &Isometry3<f64>),
    ) -> Self {
        let mut best: Option<(Face, f64)> = None;
        for face in Face::ALL {
            let normal = atom_a.world_face_vector(face, transform_a);
            let facing = atom_b.most_opposed_face(&normal, transform_b);
            let distance = nalgebra::distance(
                &atom_a.world_face_point(face, transform_a),
                &atom_b.world_face_point(facing, transform_b),
            );
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((face, distance));
            }
        }
        let (face, distance) = best.unwrap_or((Face::PosX, f64::INFINITY));

        Self {
            atom_a: index_a,
            atom_b: index_b,
            face,
            direction: atom_a.face_vector(face),
            distance,
        }
    }
}

/// A validated fusion, computed without touching either molecule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionPlan {
    /// Index of the atom the new atom attaches to.
    pub atom_index: usize,
    pub face: Face,
    pub direction: Vector3<f64>,
    /// Free cell the new atom will occupy.
    pub cell: GridCell,
    pub distance: f64,
}

/// The outcome of a fusion that has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fusion {
    pub hit_by: MoleculeId,
    pub hit_with: MoleculeId,
    /// Index of the newly added atom in `hit_by`.
    pub atom_index: usize,
    pub cell: GridCell,
    pub destroyed: MoleculeDestroyed,
}
