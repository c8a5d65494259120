//! Scenarios compiled into the binary.

use std::path::Path;

use super::yaml::parse_scenario;
use super::{InMemoryScenarioStore, ScenarioLoadError};
use crate::domain::scenario::Scenario;

const BUILTIN: [(&str, &str); 2] = [
    (
        "interview_basic.yaml",
        include_str!("../../../scenarios/interview_basic.yaml"),
    ),
    (
        "presentation_results.yaml",
        include_str!("../../../scenarios/presentation_results.yaml"),
    ),
];

/// Parses the built-in catalog.
pub fn builtin_scenarios() -> Result<Vec<Scenario>, ScenarioLoadError> {
    BUILTIN
        .iter()
        .map(|(name, yaml)| parse_scenario(yaml, Path::new(name)))
        .collect()
}

pub fn builtin_store() -> Result<InMemoryScenarioStore, ScenarioLoadError> {
    Ok(InMemoryScenarioStore::new(builtin_scenarios()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::ScenarioType;
    use crate::domain::simulation::StageSequence;

    #[test]
    fn builtin_scenarios_are_valid() {
        let scenarios = builtin_scenarios().unwrap();
        assert_eq!(scenarios.len(), 2);
        for scenario in &scenarios {
            assert_eq!(scenario.max_score(), 100, "{}", scenario.id);
        }
    }

    #[test]
    fn interview_matches_reference_rubric() {
        let scenarios = builtin_scenarios().unwrap();
        let interview = scenarios
            .iter()
            .find(|s| s.scenario_type == ScenarioType::Interview)
            .unwrap();

        let weights: Vec<u32> = interview.rubric.iter().map(|c| c.weight).collect();
        assert_eq!(weights, vec![15, 20, 15, 20, 15, 15]);
        for stage in StageSequence::for_scenario(interview).unwrap().stages() {
            assert!(interview.dialogue_for(stage).is_some(), "{}", stage);
        }
    }

    #[test]
    fn presentation_has_questions_and_flow() {
        let scenarios = builtin_scenarios().unwrap();
        let presentation = scenarios
            .iter()
            .find(|s| s.scenario_type == ScenarioType::Presentation)
            .unwrap();

        assert_eq!(StageSequence::for_scenario(presentation).unwrap().len(), 5);
        assert!(!presentation.questions.is_empty());
    }
}
