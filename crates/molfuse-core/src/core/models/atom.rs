use super::error::ModelError;
use super::ids::MoleculeId;
use crate::core::utils::geometry::{self, Aabb};
use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};
use serde::Serialize;
use std::fmt;

/// Largest deviation from a whole number still accepted as a grid coordinate.
///
/// Face directions are produced by rotating unit vectors, so they carry a
/// little floating point noise even when they are nominally axis aligned.
pub const GRID_TOLERANCE: f64 = 1e-6;

/// One of the six faces of a unit atom, named after its un-rotated normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    /// All faces, in the order used to break distance ties.
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// The un-rotated unit normal of this face.
    pub fn base_axis(self) -> Vector3<f64> {
        match self {
            Face::PosX => Vector3::x(),
            Face::NegX => -Vector3::x(),
            Face::PosY => Vector3::y(),
            Face::NegY => -Vector3::y(),
            Face::PosZ => Vector3::z(),
            Face::NegZ => -Vector3::z(),
        }
    }
}

/// Integer address of an atom on its molecule's grid.
///
/// The vector form is `(column, row, depth)`: columns run along X, rows along
/// Y and depth along Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct GridCell {
    pub row: i32,
    pub column: i32,
    pub depth: i32,
}

impl GridCell {
    pub const ORIGIN: GridCell = GridCell {
        row: 0,
        column: 0,
        depth: 0,
    };

    pub fn new(row: i32, column: i32, depth: i32) -> Self {
        Self { row, column, depth }
    }

    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.column as f64, self.row as f64, self.depth as f64)
    }

    /// Converts a `(column, row, depth)` vector back to a cell.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] if any component is not a whole
    /// number (within [`GRID_TOLERANCE`]) representable as `i32`.
    pub fn from_vector(v: &Vector3<f64>) -> Result<Self, ModelError> {
        Ok(Self {
            column: whole_number("column", v.x)?,
            row: whole_number("row", v.y)?,
            depth: whole_number("depth", v.z)?,
        })
    }

    /// The neighbouring cell reached by a unit grid offset.
    pub fn offset(self, offset: &Vector3<f64>) -> Result<Self, ModelError> {
        Self::from_vector(&(self.to_vector() + offset))
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(row {}, column {}, depth {})",
            self.row, self.column, self.depth
        )
    }
}

fn whole_number(field: &'static str, value: f64) -> Result<i32, ModelError> {
    let rounded = value.round();
    let in_range = rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64;
    if value.is_finite() && in_range && (value - rounded).abs() <= GRID_TOLERANCE {
        Ok(rounded as i32)
    } else {
        Err(ModelError::InvalidArgument { field, value })
    }
}

/// Size parameters shared by every atom of a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomGeometry {
    /// Edge length of a grid cell.
    pub unit_size: f64,
    /// Length of the face direction vectors.
    pub normal_size: f64,
    /// Scale of the hit box relative to `unit_size`.
    pub hit_box_scale: f64,
}

impl AtomGeometry {
    pub fn hit_box_half_extent(&self) -> f64 {
        self.unit_size * self.hit_box_scale * 0.5
    }
}

impl Default for AtomGeometry {
    fn default() -> Self {
        Self {
            unit_size: 4.0,
            normal_size: 1.0,
            hit_box_scale: 1.1,
        }
    }
}

/// Elapsed animation time, read by whatever renders the atom.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationClock {
    pub elapsed: f64,
}

impl AnimationClock {
    pub fn advance(&mut self, delta: f64) {
        if delta.is_finite() && delta > 0.0 {
            self.elapsed += delta;
        }
    }
}

/// A unit cell on a molecule's grid with an accumulated orientation.
///
/// The six face directions are never stored; they are derived from the
/// orientation each time they are requested, so any number of alignments
/// compose through the quaternion alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    molecule: MoleculeId,
    cell: GridCell,
    geometry: AtomGeometry,
    orientation: UnitQuaternion<f64>,
    local_position: Point3<f64>,
    animation: AnimationClock,
}

impl Atom {
    /// Creates an atom at `cell` with identity orientation.
    ///
    /// # Arguments
    ///
    /// * `molecule` - The owning molecule (non-owning back-reference).
    /// * `cell` - Grid address within the molecule's local frame.
    /// * `geometry` - Shared size parameters.
    pub fn new(molecule: MoleculeId, cell: GridCell, geometry: AtomGeometry) -> Self {
        let mut atom = Self {
            molecule,
            cell,
            geometry,
            orientation: UnitQuaternion::identity(),
            local_position: Point3::origin(),
            animation: AnimationClock::default(),
        };
        atom.update_position();
        atom
    }

    pub fn molecule(&self) -> MoleculeId {
        self.molecule
    }

    pub fn cell(&self) -> GridCell {
        self.cell
    }

    pub fn row(&self) -> i32 {
        self.cell.row
    }

    pub fn column(&self) -> i32 {
        self.cell.column
    }

    pub fn depth(&self) -> i32 {
        self.cell.depth
    }

    pub fn geometry(&self) -> &AtomGeometry {
        &self.geometry
    }

    pub fn orientation(&self) -> &UnitQuaternion<f64> {
        &self.orientation
    }

    pub fn animation(&self) -> &AnimationClock {
        &self.animation
    }

    /// Centre of the atom in its molecule's local frame.
    pub fn local_position(&self) -> Point3<f64> {
        self.local_position
    }

    pub fn set_row(&mut self, value: f64) -> Result<(), ModelError> {
        self.cell.row = whole_number("row", value)?;
        self.update_position();
        Ok(())
    }

    pub fn set_column(&mut self, value: f64) -> Result<(), ModelError> {
        self.cell.column = whole_number("column", value)?;
        self.update_position();
        Ok(())
    }

    pub fn set_depth(&mut self, value: f64) -> Result<(), ModelError> {
        self.cell.depth = whole_number("depth", value)?;
        self.update_position();
        Ok(())
    }

    fn update_position(&mut self) {
        self.local_position = Point3::from(self.cell.to_vector() * self.geometry.unit_size);
    }

    /// Turns the atom so the face it was attached through meets its parent.
    ///
    /// The rotation taking `direction` onto its negation is composed in front
    /// of the current orientation. A zero `direction` leaves the atom as is.
    pub fn align_to_direction(&mut self, direction: &Vector3<f64>) {
        if direction.norm_squared() == 0.0 {
            return;
        }
        let flip = geometry::rotation_between(direction, &-direction);
        self.orientation = flip * self.orientation;
    }

    /// `direction` rotated by the current accumulated orientation.
    pub fn aligned_direction(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        self.orientation * direction
    }

    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f64>) {
        self.orientation = orientation;
    }

    /// The face normal (scaled to `normal_size`) in the molecule's local frame.
    pub fn face_vector(&self, face: Face) -> Vector3<f64> {
        self.orientation * (face.base_axis() * self.geometry.normal_size)
    }

    pub fn face_vectors(&self) -> [(Face, Vector3<f64>); 6] {
        Face::ALL.map(|face| (face, self.face_vector(face)))
    }

    pub fn world_center(&self, transform: &Isometry3<f64>) -> Point3<f64> {
        geometry::world_point(transform, &self.local_position)
    }

    /// Outward face vector from the atom centre, in world space.
    pub fn world_face_vector(&self, face: Face, transform: &Isometry3<f64>) -> Vector3<f64> {
        geometry::world_vector(transform, &self.face_vector(face))
    }

    /// Absolute surface point of a face, in world space.
    pub fn world_face_point(&self, face: Face, transform: &Isometry3<f64>) -> Point3<f64> {
        geometry::world_point(transform, &(self.local_position + self.face_vector(face)))
    }

    /// The atom's hit box in the molecule's local frame.
    pub fn local_bounds(&self) -> Aabb {
        Aabb::cube(&self.local_position, self.geometry.hit_box_half_extent())
    }

    pub fn world_bounds(&self, transform: &Isometry3<f64>) -> Aabb {
        self.local_bounds().transformed(transform)
    }

    /// The face whose world normal points most directly against `world_normal`.
    pub fn most_opposed_face(&self, world_normal: &Vector3<f64>, transform: &Isometry3<f64>) -> Face {
        let mut best = Face::ALL[0];
        let mut best_dot = f64::INFINITY;
        for face in Face::ALL {
            let dot = self.world_face_vector(face, transform).dot(world_normal);
            if dot < best_dot {
                best = face;
                best_dot = dot;
            }
        }
        best
    }

    pub fn advance_animation(&mut self, delta: f64) {
        self.animation.advance(delta);
    }
}
