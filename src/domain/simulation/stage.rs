//! Stage progression - the linear state machine a session moves through.
//!
//! Interview scenarios use a fixed five-stage order. Presentation scenarios
//! bring their own ordered flow list. In both cases the last stage is
//! terminal: advancing from it is a no-op rather than an error.
//!
//! ```ignore
//! let seq = StageSequence::for_scenario(&scenario)?;
//! let mut stage = seq.initial().clone();
//! stage = seq.advance(&stage); // introduction -> purpose_explanation
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Percentage;
use crate::domain::scenario::{Scenario, ScenarioError, ScenarioType};

/// Name of a phase of the interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stage(String);

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<InterviewStage> for Stage {
    fn from(stage: InterviewStage) -> Self {
        Stage::new(stage.as_str())
    }
}

/// The fixed stages of an interview scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStage {
    Introduction,
    PurposeExplanation,
    InformationGathering,
    EvidenceCollection,
    Closure,
}

impl InterviewStage {
    /// The canonical interview order.
    pub const ORDER: [InterviewStage; 5] = [
        InterviewStage::Introduction,
        InterviewStage::PurposeExplanation,
        InterviewStage::InformationGathering,
        InterviewStage::EvidenceCollection,
        InterviewStage::Closure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::PurposeExplanation => "purpose_explanation",
            Self::InformationGathering => "information_gathering",
            Self::EvidenceCollection => "evidence_collection",
            Self::Closure => "closure",
        }
    }
}

/// Ordered, non-empty list of stages for one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSequence {
    stages: Vec<Stage>,
}

impl StageSequence {
    /// Builds a sequence from an explicit list.
    ///
    /// # Errors
    ///
    /// - `NoStages` if the list is empty
    pub fn new(stages: Vec<Stage>) -> Result<Self, ScenarioError> {
        if stages.is_empty() {
            return Err(ScenarioError::NoStages);
        }
        Ok(Self { stages })
    }

    /// The fixed interview sequence.
    pub fn interview() -> Self {
        Self {
            stages: InterviewStage::ORDER.iter().map(|s| Stage::from(*s)).collect(),
        }
    }

    /// Resolves the sequence for a scenario according to its type.
    pub fn for_scenario(scenario: &Scenario) -> Result<Self, ScenarioError> {
        match scenario.scenario_type {
            ScenarioType::Interview => Ok(Self::interview()),
            ScenarioType::Presentation => Self::new(
                scenario
                    .flow
                    .iter()
                    .map(|f| Stage::new(f.stage.clone()))
                    .collect(),
            ),
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// First stage of the sequence.
    pub fn initial(&self) -> &Stage {
        &self.stages[0]
    }

    /// Last stage of the sequence.
    pub fn terminal(&self) -> &Stage {
        &self.stages[self.stages.len() - 1]
    }

    pub fn contains(&self, stage: &Stage) -> bool {
        self.stages.contains(stage)
    }

    /// 0-based position of a stage, if it belongs to the sequence.
    pub fn position(&self, stage: &Stage) -> Option<usize> {
        self.stages.iter().position(|s| s == stage)
    }

    pub fn is_terminal(&self, stage: &Stage) -> bool {
        self.terminal() == stage
    }

    /// Returns the stage after `current`.
    ///
    /// The terminal stage advances to itself. A stage outside the sequence
    /// restarts at the initial stage so the session never leaves the list.
    pub fn advance(&self, current: &Stage) -> Stage {
        match self.position(current) {
            Some(idx) => self
                .stages
                .get(idx + 1)
                .unwrap_or_else(|| self.terminal())
                .clone(),
            None => self.initial().clone(),
        }
    }

    /// Derived progress: `round(position / (len - 1) * 100)`.
    pub fn progress(&self, current: &Stage) -> Percentage {
        let last = self.stages.len() - 1;
        if last == 0 {
            return Percentage::HUNDRED;
        }
        let idx = self.position(current).unwrap_or(0);
        Percentage::of(idx as u32, last as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presentation_sequence() -> StageSequence {
        StageSequence::new(vec![
            Stage::new("opening"),
            Stage::new("findings"),
            Stage::new("closing"),
        ])
        .unwrap()
    }

    mod interview {
        use super::*;

        #[test]
        fn starts_at_introduction() {
            let seq = StageSequence::interview();
            assert_eq!(seq.initial().as_str(), "introduction");
        }

        #[test]
        fn ends_at_closure() {
            let seq = StageSequence::interview();
            assert_eq!(seq.terminal().as_str(), "closure");
            assert_eq!(seq.len(), 5);
        }

        #[test]
        fn advances_in_fixed_order() {
            let seq = StageSequence::interview();
            let mut stage = seq.initial().clone();
            let mut visited = vec![stage.as_str().to_string()];
            for _ in 0..4 {
                stage = seq.advance(&stage);
                visited.push(stage.as_str().to_string());
            }
            assert_eq!(
                visited,
                vec![
                    "introduction",
                    "purpose_explanation",
                    "information_gathering",
                    "evidence_collection",
                    "closure"
                ]
            );
        }

        #[test]
        fn stage_serializes_to_snake_case() {
            let json = serde_json::to_string(&InterviewStage::EvidenceCollection).unwrap();
            assert_eq!(json, "\"evidence_collection\"");
        }
    }

    mod advance {
        use super::*;

        #[test]
        fn terminal_stage_stays_put() {
            let seq = presentation_sequence();
            let closing = Stage::new("closing");
            assert_eq!(seq.advance(&closing), closing);
            assert_eq!(seq.advance(&seq.advance(&closing)), closing);
        }

        #[test]
        fn n_minus_one_advances_reach_terminal() {
            let seq = presentation_sequence();
            let mut stage = seq.initial().clone();
            for _ in 0..seq.len() - 1 {
                stage = seq.advance(&stage);
            }
            assert!(seq.is_terminal(&stage));
        }

        #[test]
        fn unknown_stage_resets_to_initial() {
            let seq = presentation_sequence();
            assert_eq!(seq.advance(&Stage::new("bogus")), Stage::new("opening"));
        }
    }

    mod progress {
        use super::*;

        #[test]
        fn initial_is_zero_and_terminal_is_hundred() {
            let seq = presentation_sequence();
            assert_eq!(seq.progress(seq.initial()), Percentage::ZERO);
            assert_eq!(seq.progress(seq.terminal()), Percentage::HUNDRED);
        }

        #[test]
        fn midpoint_is_fifty() {
            let seq = presentation_sequence();
            assert_eq!(seq.progress(&Stage::new("findings")).value(), 50);
        }

        #[test]
        fn single_stage_is_complete() {
            let seq = StageSequence::new(vec![Stage::new("only")]).unwrap();
            assert_eq!(seq.progress(seq.initial()), Percentage::HUNDRED);
        }
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(matches!(
            StageSequence::new(vec![]),
            Err(ScenarioError::NoStages)
        ));
    }
}
