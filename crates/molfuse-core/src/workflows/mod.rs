//! # Workflows Module
//!
//! Top-level entry points that run a complete scene from configuration to
//! report.
//!
//! - **Simulation Workflow** ([`simulate`]) - Seeds a scene with random
//!   molecules, runs it for a fixed number of ticks, and summarises the result.

pub mod simulate;
