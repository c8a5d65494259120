//! Simulation domain events.
//!
//! Events published over the session lifecycle:
//! - `SessionStarted` - A learner began a scenario
//! - `ActionProcessed` - A learner turn was resolved and scored
//! - `SessionCompleted` - A session was graded and closed

use serde::{Deserialize, Serialize};

use super::{Performance, SessionResult, SimulatedResponse, Stage};
use crate::domain::foundation::{
    domain_event, ActionId, CriterionId, EventId, Percentage, ScenarioId, SessionId, Timestamp,
};
use crate::domain::scenario::ScenarioType;

pub const SESSION_STARTED: &str = "session.started";
pub const ACTION_PROCESSED: &str = "action.processed";
pub const SESSION_COMPLETED: &str = "session.completed";

/// Every topic a simulation engine publishes.
pub const ALL_TOPICS: [&str; 3] = [SESSION_STARTED, ACTION_PROCESSED, SESSION_COMPLETED];

const AGGREGATE_TYPE: &str = "SimulationSession";

// ════════════════════════════════════════════════════════════════════════════
// SessionStarted
// ════════════════════════════════════════════════════════════════════════════

/// Published when a session is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStarted {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub scenario_id: ScenarioId,
    pub scenario_type: ScenarioType,
    pub initial_stage: Stage,
    /// Time budget in seconds.
    pub time_remaining: i64,
    pub started_at: Timestamp,
}

domain_event!(
    SessionStarted,
    event_type = SESSION_STARTED,
    schema_version = 1,
    aggregate_id = session_id,
    aggregate_type = AGGREGATE_TYPE,
    occurred_at = started_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// ActionProcessed
// ════════════════════════════════════════════════════════════════════════════

/// Published after an action has been resolved, scored and the stage advanced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionProcessed {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub action_id: ActionId,
    pub response: SimulatedResponse,
    /// Criteria first satisfied by this action.
    pub newly_completed: Vec<CriterionId>,
    /// Performance after the action.
    pub performance: Performance,
    pub stage: Stage,
    pub progress: Percentage,
    pub time_remaining: i64,
    pub processed_at: Timestamp,
}

domain_event!(
    ActionProcessed,
    event_type = ACTION_PROCESSED,
    schema_version = 1,
    aggregate_id = session_id,
    aggregate_type = AGGREGATE_TYPE,
    occurred_at = processed_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SessionCompleted
// ════════════════════════════════════════════════════════════════════════════

/// Published once per session, when its result is compiled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCompleted {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub result: SessionResult,
    pub completed_at: Timestamp,
}

domain_event!(
    SessionCompleted,
    event_type = SESSION_COMPLETED,
    schema_version = 1,
    aggregate_id = session_id,
    aggregate_type = AGGREGATE_TYPE,
    occurred_at = completed_at,
    event_id = event_id
);
