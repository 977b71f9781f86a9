//! # Engine Module
//!
//! The stateful layer of MolFuse. It turns the pure models in [`crate::core`]
//! into a running scene: molecules drift each tick, the collider looks for a
//! fusion, and the outcome is published as events.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Scene and run parameters with validation
//! - **Collision Scan** ([`collider`]) - Ordered collidable list, first fusion wins
//! - **Scene Driver** ([`simulation`]) - Owns molecules, RNG, and the event queue
//! - **Events** ([`events`]) - Notifications for whatever presents the scene
//! - **Snapshots** ([`snapshot`]) - Serialisable scene state
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-level error type

pub mod collider;
pub mod config;
pub mod error;
pub mod events;
pub mod progress;
pub mod simulation;
pub mod snapshot;
