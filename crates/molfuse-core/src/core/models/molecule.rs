use super::atom::{Atom, AtomGeometry, GridCell};
use super::collision::{CollisionPolicy, CollisionResult, FusionPlan, Rejection};
use super::error::ModelError;
use super::ids::MoleculeId;
use crate::core::utils::geometry::{self, Aabb};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use rand::Rng;

/// A per-axis random speed: `(min + U[0, 1) * spread) * factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRange {
    pub min: f64,
    pub spread: f64,
    pub factor: f64,
}

impl SpeedRange {
    pub const DRIFT: SpeedRange = SpeedRange {
        min: 0.25,
        spread: 0.75,
        factor: 0.1,
    };

    pub const ROTATION: SpeedRange = SpeedRange {
        min: 0.25,
        spread: 0.75,
        factor: 0.01,
    };

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3<f64> {
        Vector3::from_fn(|_, _| (self.min + rng.r#gen::<f64>() * self.spread) * self.factor)
    }

    pub fn lower(&self) -> f64 {
        self.min * self.factor
    }

    pub fn upper(&self) -> f64 {
        (self.min + self.spread) * self.factor
    }
}

/// Rigid-body drift state of a molecule, independent of atom orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Per-axis sign of travel, each component `-1` or `1`.
    pub drift_direction: Vector3<f64>,
    pub speed: Vector3<f64>,
    /// Per-tick increment of the atom grid's X and Y Euler angles.
    pub rotation_speed: Vector3<f64>,
    /// Range `speed` is resampled from when the molecule escapes on all axes.
    pub speed_range: SpeedRange,
}

impl Motion {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, drift: &SpeedRange, rotation: &SpeedRange) -> Self {
        let mut sign = || if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let drift_direction = Vector3::new(sign(), sign(), sign());
        Self {
            drift_direction,
            speed: drift.sample(rng),
            rotation_speed: rotation.sample(rng),
            speed_range: *drift,
        }
    }

    /// No drift and no spin.
    pub fn still() -> Self {
        Self {
            drift_direction: Vector3::repeat(1.0),
            speed: Vector3::zeros(),
            rotation_speed: Vector3::zeros(),
            speed_range: SpeedRange::DRIFT,
        }
    }
}

/// Marker returned by [`Molecule::destroy`].
///
/// The owner of the molecule must react to it by dropping the molecule from
/// every collection that references it.
#[must_use = "a destroyed molecule must be removed from its set and collider"]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoleculeDestroyed {
    pub molecule: MoleculeId,
}

/// An ordered collection of atoms sharing one rigid transform.
///
/// Atom index 0 is the anchor used as the reference point when this molecule
/// is the candidate in another molecule's collision test.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    id: MoleculeId,
    atoms: Vec<Atom>,
    geometry: AtomGeometry,
    position: Point3<f64>,
    motion: Motion,
    grid_rotation: Vector3<f64>,
    bounds: Vector3<f64>,
    active: bool,
    destroyed: bool,
}

impl Molecule {
    /// Creates an empty molecule. Callers are expected to add the first atom
    /// straight away; a molecule without atoms never collides.
    pub fn new(
        id: MoleculeId,
        position: Point3<f64>,
        motion: Motion,
        bounds: Vector3<f64>,
        geometry: AtomGeometry,
    ) -> Self {
        Self {
            id,
            atoms: Vec::new(),
            geometry,
            position,
            motion,
            grid_rotation: Vector3::zeros(),
            bounds,
            active: true,
            destroyed: false,
        }
    }

    /// Creates a molecule holding a single anchor atom at the grid origin.
    pub fn with_anchor(
        id: MoleculeId,
        position: Point3<f64>,
        motion: Motion,
        bounds: Vector3<f64>,
        geometry: AtomGeometry,
    ) -> Self {
        let mut molecule = Self::new(id, position, motion, bounds, geometry);
        molecule.atoms.push(Atom::new(id, GridCell::ORIGIN, geometry));
        molecule
    }

    pub fn id(&self) -> MoleculeId {
        self.id
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn anchor(&self) -> Option<&Atom> {
        self.atoms.first()
    }

    pub fn geometry(&self) -> &AtomGeometry {
        &self.geometry
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn set_motion(&mut self, motion: Motion) {
        self.motion = motion;
    }

    pub fn grid_rotation(&self) -> Vector3<f64> {
        self.grid_rotation
    }

    pub fn set_grid_rotation(&mut self, angles: Vector3<f64>) {
        self.grid_rotation = angles;
    }

    pub fn bounds(&self) -> Vector3<f64> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Vector3<f64>) {
        self.bounds = bounds;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Position plus grid rotation, mapping the atoms' local frame to world.
    pub fn transform(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::from(self.position.coords),
            geometry::rotation_from_euler_xyz(&self.grid_rotation),
        )
    }

    /// World-space box enclosing every atom's hit box.
    pub fn world_bounds(&self) -> Option<Aabb> {
        let transform = self.transform();
        self.atoms
            .iter()
            .map(|atom| atom.world_bounds(&transform))
            .reduce(|acc, b| acc.union(&b))
    }

    pub fn atom_index_at(&self, cell: GridCell) -> Option<usize> {
        self.atoms.iter().position(|atom| atom.cell() == cell)
    }

    /// Appends a new atom at `cell`, optionally aligned to `align_direction`.
    ///
    /// This is the only way a molecule grows.
    ///
    /// # Errors
    ///
    /// * [`ModelError::CellOccupied`] if another atom already sits at `cell`.
    /// * [`ModelError::InvalidOperation`] if the molecule has been destroyed.
    pub fn add_atom(
        &mut self,
        cell: GridCell,
        align_direction: Option<&Vector3<f64>>,
    ) -> Result<usize, ModelError> {
        if self.destroyed {
            return Err(ModelError::InvalidOperation(
                "cannot add an atom to a destroyed molecule",
            ));
        }
        if self.atom_index_at(cell).is_some() {
            return Err(ModelError::CellOccupied { cell });
        }

        let mut atom = Atom::new(self.id, cell, self.geometry);
        if let Some(direction) = align_direction {
            atom.align_to_direction(direction);
        }
        self.atoms.push(atom);
        Ok(self.atoms.len() - 1)
    }

    /// Drifts one step, reflects off the bounds and ticks atom animations.
    pub fn update<R: Rng + ?Sized>(&mut self, delta: f64, rng: &mut R) {
        if !self.active || self.destroyed {
            return;
        }

        let displacement = self.motion.speed.component_mul(&self.motion.drift_direction);
        self.position += displacement;
        self.reflect(rng);

        self.grid_rotation.x += self.motion.rotation_speed.x;
        self.grid_rotation.y += self.motion.rotation_speed.y;

        for atom in &mut self.atoms {
            atom.advance_animation(delta);
        }
    }

    fn reflect<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let escaped = (0..3).all(|i| self.position[i].abs() > self.bounds[i]);
        if escaped {
            self.motion.speed = self.motion.speed_range.sample(rng);
        }

        for i in 0..3 {
            if self.position[i] > self.bounds[i] {
                self.motion.drift_direction[i] = -1.0;
            } else if self.position[i] < -self.bounds[i] {
                self.motion.drift_direction[i] = 1.0;
            }
        }
    }

    /// Ticks atom animations without moving the molecule.
    pub fn pulse(&mut self, delta: f64) {
        for atom in &mut self.atoms {
            atom.advance_animation(delta);
        }
    }

    /// Runs the pairwise collision test of `self` against `other`.
    ///
    /// The gates are evaluated in order and the first failing one decides the
    /// [`Rejection`]; neither molecule is modified either way. On success the
    /// returned plan names the attachment atom, the face direction and the free
    /// cell for the new atom.
    pub fn collision_status(
        &self,
        other: &Molecule,
        policy: &CollisionPolicy,
    ) -> Result<FusionPlan, Rejection> {
        if self.destroyed || other.destroyed {
            return Err(Rejection::Destroyed);
        }
        if self.id == other.id {
            return Err(Rejection::SelfCollision);
        }
        if other.atom_count() > self.atom_count() {
            return Err(Rejection::CandidateLarger {
                own: self.atom_count(),
                other: other.atom_count(),
            });
        }
        if other.atom_count() > 1 && self.atom_count() > 1 {
            return Err(Rejection::MultiAtomMerge);
        }

        let anchor = other.anchor().ok_or(Rejection::NoAnchor)?;
        let own_bounds = self.world_bounds().ok_or(Rejection::NoAnchor)?;
        if !own_bounds.contains(&other.position) {
            return Err(Rejection::OutsideBounds);
        }

        let other_bounds = other.world_bounds().ok_or(Rejection::NoAnchor)?;
        let distance = nalgebra::distance(&own_bounds.center(), &other_bounds.center());
        let limit = self.geometry.unit_size * self.atom_count() as f64 * policy.proximity_factor;
        if distance > limit {
            return Err(Rejection::TooFar { distance, limit });
        }

        let own_transform = self.transform();
        let other_transform = other.transform();
        let mut closest: Option<CollisionResult> = None;
        for (index, atom) in self.atoms.iter().enumerate() {
            let result = CollisionResult::between(
                (index, atom, &own_transform),
                (0, anchor, &other_transform),
            );
            if closest.is_none_or(|c| result.distance < c.distance) {
                closest = Some(result);
            }
        }
        let closest = closest.ok_or(Rejection::NoAnchor)?;

        let offset = closest.direction / self.geometry.normal_size;
        let cell = self.atoms[closest.atom_a]
            .cell()
            .offset(&offset)
            .map_err(|_| Rejection::InvalidTarget)?;
        if self.atom_index_at(cell).is_some() {
            return Err(Rejection::CellOccupied { cell });
        }

        Ok(FusionPlan {
            atom_index: closest.atom_a,
            face: closest.face,
            direction: closest.direction,
            cell,
            distance: closest.distance,
        })
    }

    /// Adds the atom described by `plan` and gives it the structural
    /// orientation of the atom it attaches to.
    pub fn apply_fusion(&mut self, plan: &FusionPlan) -> Result<usize, ModelError> {
        let parent = *self.existing_atom(plan.atom_index)?.orientation();
        self.add_oriented_atom(plan.cell, &plan.direction, parent)
    }

    /// Grows the molecule through one face of an existing atom.
    ///
    /// `face_normal` is the picked face's normal in the atom's un-rotated frame;
    /// only its direction matters. The new atom lands on the neighbouring cell
    /// along it and is aligned to the normal as seen through the parent's
    /// orientation.
    ///
    /// # Errors
    ///
    /// * [`ModelError::InvalidOperation`] if `atom_index` does not exist or the
    ///   normal is zero.
    /// * [`ModelError::InvalidArgument`] if the normal is not axis aligned.
    /// * [`ModelError::CellOccupied`] if the neighbouring cell is taken.
    pub fn attach_to_atom(
        &mut self,
        atom_index: usize,
        face_normal: &Vector3<f64>,
    ) -> Result<usize, ModelError> {
        let atom = self.existing_atom(atom_index)?;
        let direction = atom.aligned_direction(face_normal);
        let step = face_normal
            .try_normalize(f64::EPSILON)
            .ok_or(ModelError::InvalidOperation("face normal must be non-zero"))?;
        let cell = atom.cell().offset(&step)?;
        let parent = *atom.orientation();
        self.add_oriented_atom(cell, &direction, parent)
    }

    fn existing_atom(&self, index: usize) -> Result<&Atom, ModelError> {
        self.atoms.get(index).ok_or(ModelError::InvalidOperation(
            "referenced atom does not exist in this molecule",
        ))
    }

    fn add_oriented_atom(
        &mut self,
        cell: GridCell,
        direction: &Vector3<f64>,
        parent: UnitQuaternion<f64>,
    ) -> Result<usize, ModelError> {
        let index = self.add_atom(cell, Some(direction))?;
        let atom = &mut self.atoms[index];
        let composed = atom.orientation() * parent;
        atom.set_orientation(composed);
        Ok(index)
    }

    /// Flags the molecule as destroyed. Nothing is deallocated here.
    pub fn destroy(&mut self) -> MoleculeDestroyed {
        self.destroyed = true;
        self.active = false;
        MoleculeDestroyed { molecule: self.id }
    }
}
