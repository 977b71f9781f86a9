//! # Core Models Module
//!
//! Data structures for the fusion scene: atoms on an integer grid, the
//! molecules that own them, and the set that owns the molecules.
//!
//! ## Key Components
//!
//! - [`atom`] - Grid cells, faces, and the oriented unit atom
//! - [`molecule`] - Rigid groups of atoms with drift, reflection, and fusion gating
//! - [`collision`] - Face distance measurement and the outcome of a collision test
//! - [`set`] - Insertion-ordered ownership of every molecule in a scene
//! - [`ids`] - Stable handles for molecules
//! - [`error`] - Errors raised when a model invariant would be broken
//!
//! ## Usage
//!
//! ```ignore
//! use molfuse::core::models::{set::MoleculeSet, molecule::{Molecule, Motion}};
//!
//! let mut set = MoleculeSet::new();
//! let id = set.insert_with(|id| {
//!     Molecule::new(id, Point3::origin(), Motion::still(), bounds, geometry)
//! });
//! set.get_mut(id).unwrap().add_atom(GridCell::ORIGIN, None)?;
//! ```

pub mod atom;
pub mod collision;
pub mod error;
pub mod ids;
pub mod molecule;
pub mod set;
