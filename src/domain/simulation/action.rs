//! Learner actions.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{SimulationError, Stage};
use crate::domain::foundation::{ActionId, Timestamp};

/// Kind of learner turn.
///
/// `speak` is the only kind the scoring heuristics treat specially; other
/// kinds are recorded and advance the stage like any action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    Speak,
    Other(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            ActionType::Speak => "speak",
            ActionType::Other(kind) => kind,
        }
    }

    pub fn is_speak(&self) -> bool {
        matches!(self, ActionType::Speak)
    }
}

impl From<String> for ActionType {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("speak") {
            ActionType::Speak
        } else {
            ActionType::Other(value)
        }
    }
}

impl From<&str> for ActionType {
    fn from(value: &str) -> Self {
        ActionType::from(value.to_string())
    }
}

impl From<ActionType> for String {
    fn from(value: ActionType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller-supplied body of an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPayload {
    #[serde(default)]
    pub text: Option<String>,
}

impl ActionPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// One recorded learner turn. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    id: ActionId,
    action_type: ActionType,
    content: String,
    timestamp: Timestamp,
    stage: Stage,
}

impl Action {
    /// Validates a payload and records it against the current stage.
    ///
    /// # Errors
    ///
    /// - `Validation` if a `speak` action carries no text or only whitespace
    pub fn record(
        action_type: ActionType,
        payload: ActionPayload,
        stage: Stage,
    ) -> Result<Self, SimulationError> {
        let content = payload.text.unwrap_or_default();
        if action_type.is_speak() && content.trim().is_empty() {
            return Err(SimulationError::validation(
                "text",
                "speak actions require non-empty text",
            ));
        }

        Ok(Self {
            id: ActionId::new(),
            action_type,
            content,
            timestamp: Timestamp::now(),
            stage,
        })
    }

    pub fn id(&self) -> &ActionId {
        &self.id
    }

    pub fn action_type(&self) -> &ActionType {
        &self.action_type
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// Stage the session was in when the action was submitted.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }
}
