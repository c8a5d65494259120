//! Domain layer containing the simulation engine's business logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, events)
//! - `scenario` - Read-only role-play exercise definitions
//! - `simulation` - Session lifecycle, scoring, and results

pub mod foundation;
pub mod scenario;
pub mod simulation;
