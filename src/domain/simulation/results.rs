//! Results compilation - turns a finished session into a graded result.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{FeedbackEntry, Session};
use crate::domain::foundation::{CriterionId, Percentage, ResultId, ScenarioId, SessionId, Timestamp};
use crate::domain::scenario::Scenario;

/// Percentage from which a learner is considered ready for official evaluation.
pub const READINESS_THRESHOLD: u8 = 80;

/// Criteria heavier than this are high-priority recommendations.
pub const HIGH_PRIORITY_WEIGHT: u32 = 15;

/// Certification band derived from the final percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationLevel {
    Excellent,
    Good,
    Acceptable,
    NeedsImprovement,
}

impl CertificationLevel {
    pub fn from_percentage(percentage: Percentage) -> Self {
        match percentage.value() {
            90..=100 => Self::Excellent,
            80..=89 => Self::Good,
            60..=79 => Self::Acceptable,
            _ => Self::NeedsImprovement,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
            Self::NeedsImprovement => "needs_improvement",
        }
    }
}

impl fmt::Display for CertificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub ready: bool,
    pub level: CertificationLevel,
}

impl Certification {
    pub fn for_percentage(percentage: Percentage) -> Self {
        Self {
            ready: percentage.value() >= READINESS_THRESHOLD,
            level: CertificationLevel::from_percentage(percentage),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub fn for_weight(weight: u32) -> Self {
        if weight > HIGH_PRIORITY_WEIGHT {
            Priority::High
        } else {
            Priority::Medium
        }
    }
}

/// Remediation advice for a criterion the learner never satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub criterion_id: CriterionId,
    pub area: String,
    pub priority: Priority,
    pub suggestion: String,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// The learner (or caller) completed the session.
    Manual,
    /// The time budget ran out.
    TimeExpired,
}

/// Immutable outcome of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub id: ResultId,
    pub session_id: SessionId,
    pub scenario_id: ScenarioId,
    pub final_score: u32,
    pub max_score: u32,
    pub percentage: Percentage,
    pub criteria_completed: usize,
    pub total_criteria: usize,
    pub feedback: Vec<FeedbackEntry>,
    pub recommendations: Vec<Recommendation>,
    pub certification: Certification,
    pub next_steps: Vec<String>,
    pub completion_reason: CompletionReason,
    pub actions_taken: usize,
    /// Wall-clock seconds between start and completion.
    pub elapsed_secs: i64,
    pub completed_at: Timestamp,
}

const NEXT_STEP_OFFICIAL: &str = "Proceed to the official evaluation";
const NEXT_STEP_PRACTICE: &str = "Practice the weak areas listed in the recommendations";
const NEXT_STEP_RETRY: &str = "Retry the simulation";
const NEXT_STEP_REVIEW: &str = "Review the course materials";

/// Compiles results from a session's performance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultsCompiler;

impl ResultsCompiler {
    pub fn compile(
        &self,
        scenario: &Scenario,
        session: &Session,
        reason: CompletionReason,
    ) -> SessionResult {
        let performance = session.performance();
        let max_score = scenario.max_score();
        let percentage = Percentage::of(performance.score(), max_score);
        let certification = Certification::for_percentage(percentage);

        let recommendations = scenario
            .rubric
            .iter()
            .filter(|c| !performance.is_completed(&c.id))
            .map(|c| Recommendation {
                criterion_id: c.id.clone(),
                area: c.title.clone(),
                priority: Priority::for_weight(c.weight),
                suggestion: format!("Work on: {}", c.description),
            })
            .collect();

        let next_steps = if certification.ready {
            vec![NEXT_STEP_OFFICIAL.to_string()]
        } else {
            vec![
                NEXT_STEP_PRACTICE.to_string(),
                NEXT_STEP_RETRY.to_string(),
                NEXT_STEP_REVIEW.to_string(),
            ]
        };

        let completed_at = Timestamp::now();

        SessionResult {
            id: ResultId::new(),
            session_id: *session.id(),
            scenario_id: scenario.id.clone(),
            final_score: performance.score(),
            max_score,
            percentage,
            criteria_completed: performance.completed().len(),
            total_criteria: scenario.rubric.len(),
            feedback: performance.feedback().to_vec(),
            recommendations,
            certification,
            next_steps,
            completion_reason: reason,
            actions_taken: session.actions().len(),
            elapsed_secs: completed_at.duration_since(session.started_at()).num_seconds(),
            completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::fixtures::interview_scenario;
    use crate::domain::simulation::{SessionOptions, StageSequence};
    use proptest::prelude::*;

    fn session_with(scenario: &Scenario, satisfied: &[&str]) -> Session {
        let stages = StageSequence::for_scenario(scenario).unwrap();
        let mut session = Session::start(scenario, &stages, SessionOptions::default());
        for id in satisfied {
            let criterion = scenario
                .criterion(&CriterionId::new(*id).unwrap())
                .unwrap()
                .clone();
            session.performance_mut().record(&criterion);
        }
        session
    }

    mod levels {
        use super::*;

        #[test]
        fn bands_match_thresholds() {
            let level = |p| CertificationLevel::from_percentage(Percentage::new(p));
            assert_eq!(level(100), CertificationLevel::Excellent);
            assert_eq!(level(90), CertificationLevel::Excellent);
            assert_eq!(level(89), CertificationLevel::Good);
            assert_eq!(level(80), CertificationLevel::Good);
            assert_eq!(level(79), CertificationLevel::Acceptable);
            assert_eq!(level(60), CertificationLevel::Acceptable);
            assert_eq!(level(59), CertificationLevel::NeedsImprovement);
            assert_eq!(level(0), CertificationLevel::NeedsImprovement);
        }

        #[test]
        fn readiness_starts_at_eighty() {
            assert!(Certification::for_percentage(Percentage::new(80)).ready);
            assert!(!Certification::for_percentage(Percentage::new(79)).ready);
        }

        #[test]
        fn level_serializes_snake_case() {
            let json = serde_json::to_string(&CertificationLevel::NeedsImprovement).unwrap();
            assert_eq!(json, "\"needs_improvement\"");
        }
    }

    mod compile {
        use super::*;

        #[test]
        fn empty_session_needs_improvement() {
            let scenario = interview_scenario();
            let session = session_with(&scenario, &[]);

            let result = ResultsCompiler.compile(&scenario, &session, CompletionReason::Manual);

            assert_eq!(result.final_score, 0);
            assert_eq!(result.max_score, 100);
            assert_eq!(result.percentage, Percentage::ZERO);
            assert_eq!(result.certification.level, CertificationLevel::NeedsImprovement);
            assert!(!result.certification.ready);
            assert_eq!(result.recommendations.len(), 6);
            assert_eq!(result.next_steps.len(), 3);
            assert!(result.elapsed_secs >= 0);
        }

        #[test]
        fn full_session_is_excellent() {
            let scenario = interview_scenario();
            let all: Vec<&str> = scenario.rubric.iter().map(|c| c.id.as_str()).collect();
            let session = session_with(&scenario, &all);

            let result = ResultsCompiler.compile(&scenario, &session, CompletionReason::Manual);

            assert_eq!(result.final_score, 100);
            assert_eq!(result.percentage, Percentage::HUNDRED);
            assert_eq!(result.certification.level, CertificationLevel::Excellent);
            assert!(result.certification.ready);
            assert!(result.recommendations.is_empty());
            assert_eq!(result.next_steps, vec![NEXT_STEP_OFFICIAL.to_string()]);
        }

        #[test]
        fn recommendation_priority_follows_weight() {
            let scenario = interview_scenario();
            let session = session_with(&scenario, &["introduction", "closure"]);

            let result = ResultsCompiler.compile(&scenario, &session, CompletionReason::TimeExpired);

            let priorities: Vec<_> = result
                .recommendations
                .iter()
                .map(|r| (r.criterion_id.as_str(), r.priority))
                .collect();
            assert_eq!(
                priorities,
                vec![
                    ("purpose_explanation", Priority::High),
                    ("information_request", Priority::Medium),
                    ("evidence_request", Priority::High),
                    ("response_recording", Priority::Medium),
                ]
            );
            assert_eq!(result.recommendations[0].area, "Title purpose_explanation");
            assert!(result.recommendations[0]
                .suggestion
                .contains("Description of purpose_explanation"));
            assert_eq!(result.completion_reason, CompletionReason::TimeExpired);
        }

        #[test]
        fn percentage_is_rounded() {
            let scenario = interview_scenario();
            // 15 + 20 + 15 + 15 = 65
            let session = session_with(
                &scenario,
                &["introduction", "purpose_explanation", "information_request", "closure"],
            );

            let result = ResultsCompiler.compile(&scenario, &session, CompletionReason::Manual);

            assert_eq!(result.percentage.value(), 65);
            assert_eq!(result.certification.level, CertificationLevel::Acceptable);
            assert_eq!(result.criteria_completed, 4);
            assert_eq!(result.total_criteria, 6);
            assert_eq!(result.feedback.len(), 4);
        }
    }

    proptest! {
        #[test]
        fn percentage_stays_in_bounds(mask in 0u8..64) {
            let scenario = interview_scenario();
            let satisfied: Vec<&str> = scenario
                .rubric
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, c)| c.id.as_str())
                .collect();
            let session = session_with(&scenario, &satisfied);

            let result = ResultsCompiler.compile(&scenario, &session, CompletionReason::Manual);

            prop_assert!(result.percentage.value() <= 100);
            prop_assert_eq!(
                result.criteria_completed + result.recommendations.len(),
                result.total_criteria
            );
            prop_assert_eq!(result.certification.ready, result.percentage.value() >= 80);
        }
    }
}
