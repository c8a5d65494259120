//! Scenario content model.
//!
//! Scenarios are authored as YAML and loaded once at startup. They are
//! immutable afterwards; sessions only ever read them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ScenarioError;
use crate::domain::foundation::{CriterionId, ScenarioId};
use crate::domain::simulation::Stage;

/// Dialogue trigger used when no entry matches the current stage.
pub const GENERAL_TRIGGER: &str = "general";

/// Kind of role-play exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    Interview,
    Presentation,
}

impl ScenarioType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interview => "interview",
            Self::Presentation => "presentation",
        }
    }
}

/// One weighted rubric item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    pub title: String,
    pub weight: u32,
    pub description: String,
    /// Extra trigger phrases; `a+b` requires both substrings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,
}

/// Feedback shown after a dialogue turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproachFeedback {
    pub correct: String,
    pub incorrect: String,
}

/// Scripted counterpart turn for an interview stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueEntry {
    /// Stage name this entry answers, or `general`.
    pub trigger: String,
    pub speaker: String,
    pub response: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_option: usize,
    pub feedback: ApproachFeedback,
}

/// One stage of a presentation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStage {
    pub stage: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// Static, read-only definition of a role-play exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub scenario_type: ScenarioType,
    pub estimated_duration_minutes: u32,
    pub rubric: Vec<Criterion>,
    #[serde(default)]
    pub dialogues: Vec<DialogueEntry>,
    #[serde(default)]
    pub flow: Vec<FlowStage>,
    /// Question bank for presentation audiences.
    #[serde(default)]
    pub questions: Vec<String>,
}

impl Scenario {
    /// Sum of all criterion weights.
    pub fn max_score(&self) -> u32 {
        self.rubric.iter().map(|c| c.weight).sum()
    }

    /// Estimated duration expressed in seconds.
    pub fn duration_secs(&self) -> i64 {
        i64::from(self.estimated_duration_minutes) * 60
    }

    pub fn criterion(&self, id: &CriterionId) -> Option<&Criterion> {
        self.rubric.iter().find(|c| &c.id == id)
    }

    /// Dialogue for a stage, falling back to the `general` entry.
    pub fn dialogue_for(&self, stage: &Stage) -> Option<&DialogueEntry> {
        self.dialogues
            .iter()
            .find(|d| d.trigger == stage.as_str())
            .or_else(|| self.dialogues.iter().find(|d| d.trigger == GENERAL_TRIGGER))
    }

    pub fn flow_stage(&self, stage: &Stage) -> Option<&FlowStage> {
        self.flow.iter().find(|f| f.stage == stage.as_str())
    }

    /// Checks the structural invariants of the content.
    ///
    /// # Errors
    ///
    /// - `ZeroDuration` if the estimated duration is zero minutes
    /// - `EmptyRubric`, `DuplicateCriterion`, `NonPositiveWeight` or `WeightTooLarge` for rubric problems
    /// - `NoStages` for a presentation without flow, `DuplicateStage` when a flow repeats a stage
    /// - `CorrectOptionOutOfRange` for a dialogue whose canonical option does not exist
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.estimated_duration_minutes == 0 {
            return Err(ScenarioError::ZeroDuration);
        }
        if self.rubric.is_empty() {
            return Err(ScenarioError::EmptyRubric);
        }

        let mut seen = HashSet::new();
        for criterion in &self.rubric {
            if !seen.insert(&criterion.id) {
                return Err(ScenarioError::DuplicateCriterion(criterion.id.clone()));
            }
            if criterion.weight == 0 {
                return Err(ScenarioError::NonPositiveWeight(criterion.id.clone()));
            }
            if criterion.weight > 100 {
                return Err(ScenarioError::WeightTooLarge(criterion.id.clone()));
            }
        }

        // Interviews may omit dialogue entirely; the processor answers with a neutral prompt.
        if self.scenario_type == ScenarioType::Presentation {
            if self.flow.is_empty() {
                return Err(ScenarioError::NoStages);
            }
            let mut stages = HashSet::new();
            for flow in &self.flow {
                if !stages.insert(flow.stage.as_str()) {
                    return Err(ScenarioError::DuplicateStage(flow.stage.clone()));
                }
            }
        }

        for dialogue in &self.dialogues {
            if !dialogue.options.is_empty() && dialogue.correct_option >= dialogue.options.len() {
                return Err(ScenarioError::CorrectOptionOutOfRange {
                    trigger: dialogue.trigger.clone(),
                    index: dialogue.correct_option,
                    available: dialogue.options.len(),
                });
            }
        }

        Ok(())
    }
}
