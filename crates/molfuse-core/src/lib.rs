//! # MolFuse Core Library
//!
//! A grid-based molecule fusion simulation: single-atom molecules drift inside
//! a bounded box, and when one comes close enough to another it is absorbed as
//! a new atom on the nearest face.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture so each layer can be tested
//! on its own.
//!
//! - **[`core`]: The Foundation.** Stateless geometry and data models (`Atom`,
//!   `Molecule`, `MoleculeSet`) together with the pairwise collision test and
//!   fusion planning.
//!
//! - **[`engine`]: The Logic Core.** The stateful scene driver (`Simulation`),
//!   the per-tick collision scan (`MoleculeCollider`), configuration, events,
//!   and snapshots.
//!
//! - **[`workflows`]: The Public API.** Complete runs from configuration to
//!   report, with progress reporting for front ends such as the CLI.

pub mod core;
pub mod engine;
pub mod workflows;
