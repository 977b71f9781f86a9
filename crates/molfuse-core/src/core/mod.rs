//! # Core Module
//!
//! The geometric core of MolFuse: the molecule and atom models together with
//! the small amount of vector math they share.
//!
//! ## Architecture
//!
//! - **Scene Representation** ([`models`]) - Atoms, molecules, collision results, and the molecule set
//! - **Geometry Helpers** ([`utils`]) - Rotations between vectors, Euler conversions, and bounding boxes
//!
//! Nothing in this module knows about ticks, events, or configuration; those
//! live in [`crate::engine`].

pub mod models;
pub mod utils;
