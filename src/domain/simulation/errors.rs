//! Simulation lifecycle errors.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ScenarioId, SessionId};
use crate::domain::scenario::ScenarioError;

/// Errors returned by session lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// Unknown scenario id.
    #[error("Scenario not found: {0}")]
    NotFound(ScenarioId),

    /// Operation requires an active session (or the session was already finalized).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A session is already active on this engine.
    #[error("A session is already active: {active}")]
    Conflict { active: SessionId },

    /// Action payload is missing required fields.
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// The scenario content cannot drive a session.
    #[error("Invalid scenario: {0}")]
    Scenario(#[from] ScenarioError),
}

impl SimulationError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        SimulationError::InvalidState(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SimulationError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn no_active_session() -> Self {
        Self::invalid_state("no active session")
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SimulationError::NotFound(_) => ErrorCode::ScenarioNotFound,
            SimulationError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SimulationError::Conflict { .. } => ErrorCode::SessionConflict,
            SimulationError::Validation { .. } => ErrorCode::ValidationFailed,
            SimulationError::Scenario(e) => e.code(),
        }
    }
}
