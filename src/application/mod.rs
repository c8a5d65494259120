//! Application layer - session orchestration.
//!
//! Coordinates the simulation domain with its ports: scenario lookup,
//! event publication, progress persistence and the session countdown.

mod session_manager;
mod timer;

pub use session_manager::{
    ActionOutcome, SessionManager, SessionManagerBuilder, SessionManagerConfig, TickOutcome,
    DEFAULT_PROGRESS_KEY, DEFAULT_TURN_COST_SECS,
};
pub use timer::{SessionTimer, TickControl};
