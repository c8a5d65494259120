//! Scenario content errors.

use thiserror::Error;

use crate::domain::foundation::{CriterionId, ErrorCode};

/// Structural problems in authored scenario content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error("Scenario has no stages")]
    NoStages,

    #[error("Scenario rubric is empty")]
    EmptyRubric,

    #[error("Duplicate criterion id in rubric: {0}")]
    DuplicateCriterion(CriterionId),

    #[error("Criterion '{0}' must have a positive weight")]
    NonPositiveWeight(CriterionId),

    #[error("Criterion '{0}' weighs more than 100")]
    WeightTooLarge(CriterionId),

    #[error("Dialogue '{trigger}' marks option {index} correct but offers {available} options")]
    CorrectOptionOutOfRange {
        trigger: String,
        index: usize,
        available: usize,
    },

    #[error("Stage '{0}' appears more than once in the flow")]
    DuplicateStage(String),

    #[error("Scenario must last at least one minute")]
    ZeroDuration,
}

impl ScenarioError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidScenario
    }
}
