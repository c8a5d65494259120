//! Criteria evaluation - decides which rubric criteria a learner turn satisfies.
//!
//! Each criterion is bound to a small set of trigger phrases matched as
//! substrings of the lower-cased action text. A trigger of the form `a+b`
//! requires every `+`-separated part to be present. Well-known criterion ids
//! carry a built-in trigger table; scenario content may declare additional
//! triggers, which are the only ones used for ids the table does not know.
//!
//! A criterion is scored at most once per session. Already completed
//! criteria are skipped entirely, so score and completed set only grow.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use super::Performance;
use crate::domain::foundation::CriterionId;
use crate::domain::scenario::{Criterion, Scenario};

const INTRODUCTION: &[&str] = &[
    "soy+consultor",
    "mi nombre es",
    "me presento",
    "i am+consultant",
    "my name is",
];
const PURPOSE: &[&str] = &["propósito", "proposito", "finalidad", "objetivo de", "purpose"];
const INFORMATION: &[&str] = &[
    "información",
    "informacion",
    "cuénteme",
    "cuenteme",
    "podría explicar",
    "podria explicar",
    "describa",
    "tell me about",
    "information",
];
const EVIDENCE: &[&str] = &["document", "evidencia", "evidence", "comprobante", "reporte", "report"];
const RECORDING: &[&str] = &[
    "anot",
    "tomo nota",
    "tomar nota",
    "tomaré nota",
    "write down",
    "take note",
];
const GRATITUDE: &[&str] = &["gracias", "agradezco", "agradecer", "thank"];
const OPENING: &[&str] = &[
    "buenos días",
    "buenos dias",
    "buenas tardes",
    "bienvenid",
    "good morning",
    "welcome",
];
const OBJECTIVES: &[&str] = &["objetivo", "agenda", "objective"];
const FINDINGS: &[&str] = &["hallazgo", "resultado", "diagnóstico", "diagnostico", "finding", "result"];
const RECOMMENDATIONS: &[&str] = &["recomend", "propuesta", "propong", "recommend"];
const AUDIENCE: &[&str] = &["pregunta", "duda", "question"];

static BUILTIN_TRIGGERS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        ("introduction", INTRODUCTION),
        ("purpose_explanation", PURPOSE),
        ("information_request", INFORMATION),
        ("evidence_request", EVIDENCE),
        ("response_recording", RECORDING),
        ("closure", GRATITUDE),
        ("closing", GRATITUDE),
        ("opening", OPENING),
        ("objectives", OBJECTIVES),
        ("findings", FINDINGS),
        ("recommendations", RECOMMENDATIONS),
        ("audience_interaction", AUDIENCE),
    ])
});

/// Built-in trigger phrases for a criterion id, empty if the id is not known.
pub fn builtin_triggers(id: &CriterionId) -> &'static [&'static str] {
    BUILTIN_TRIGGERS.get(id.as_str()).copied().unwrap_or(&[])
}

/// Decides whether a single criterion is fulfilled by an action's text.
///
/// Implementations receive the text already lower-cased.
pub trait CriterionPredicate: Send + Sync {
    fn is_fulfilled(&self, criterion: &Criterion, text: &str) -> bool;
}

/// Substring matching against built-in and declared triggers.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordCriterionPredicate;

impl KeywordCriterionPredicate {
    fn matches(text: &str, trigger: &str) -> bool {
        let mut parts = trigger
            .split('+')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .peekable();
        if parts.peek().is_none() {
            return false;
        }
        parts.all(|part| text.contains(&part.to_lowercase()))
    }
}

impl CriterionPredicate for KeywordCriterionPredicate {
    fn is_fulfilled(&self, criterion: &Criterion, text: &str) -> bool {
        builtin_triggers(&criterion.id)
            .iter()
            .copied()
            .chain(criterion.triggers.iter().map(String::as_str))
            .any(|trigger| Self::matches(text, trigger))
    }
}

/// Scores action text against a scenario rubric.
#[derive(Clone)]
pub struct CriteriaEvaluator {
    predicate: Arc<dyn CriterionPredicate>,
}

impl CriteriaEvaluator {
    pub fn new(predicate: Arc<dyn CriterionPredicate>) -> Self {
        Self { predicate }
    }

    pub fn keyword() -> Self {
        Self::new(Arc::new(KeywordCriterionPredicate))
    }

    /// Evaluates `text` against every criterion not yet completed and
    /// records first fulfilments in `performance`.
    ///
    /// Returns the ids newly satisfied by this text, in rubric order.
    pub fn evaluate(
        &self,
        scenario: &Scenario,
        performance: &mut Performance,
        text: &str,
    ) -> Vec<CriterionId> {
        let lowered = text.to_lowercase();
        let mut fulfilled = Vec::new();

        for criterion in &scenario.rubric {
            if performance.is_completed(&criterion.id) {
                continue;
            }
            if self.predicate.is_fulfilled(criterion, &lowered) && performance.record(criterion) {
                debug!(criterion = %criterion.id, weight = criterion.weight, "Criterion fulfilled");
                fulfilled.push(criterion.id.clone());
            }
        }

        fulfilled
    }
}

impl Default for CriteriaEvaluator {
    fn default() -> Self {
        Self::keyword()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::fixtures::{criterion, interview_scenario};
    use proptest::prelude::*;

    fn ids(list: &[CriterionId]) -> Vec<&str> {
        list.iter().map(|c| c.as_str()).collect()
    }

    mod keyword_predicate {
        use super::*;

        #[test]
        fn compound_trigger_requires_every_part() {
            let c = criterion("introduction", 15);
            let p = KeywordCriterionPredicate;
            assert!(p.is_fulfilled(&c, "hola, soy el consultor"));
            assert!(!p.is_fulfilled(&c, "hola, soy juan"));
            assert!(!p.is_fulfilled(&c, "el consultor llegó"));
        }

        #[test]
        fn declared_triggers_extend_known_ids() {
            let mut c = criterion("closure", 15);
            c.triggers = vec!["hasta luego".to_string()];
            let p = KeywordCriterionPredicate;
            assert!(p.is_fulfilled(&c, "bueno, hasta luego"));
            assert!(p.is_fulfilled(&c, "muchas gracias"));
        }

        #[test]
        fn unknown_ids_use_only_declared_triggers() {
            let mut c = criterion("empathy", 10);
            let p = KeywordCriterionPredicate;
            assert!(!p.is_fulfilled(&c, "gracias, entiendo su situación"));

            c.triggers = vec!["entiendo".to_string()];
            assert!(p.is_fulfilled(&c, "gracias, entiendo su situación"));
        }

        #[test]
        fn blank_trigger_never_matches() {
            let mut c = criterion("empathy", 10);
            c.triggers = vec![" + ".to_string(), String::new()];
            assert!(!KeywordCriterionPredicate.is_fulfilled(&c, "cualquier cosa"));
        }

        #[test]
        fn data_alone_is_not_an_information_request() {
            let c = criterion("information_request", 15);
            assert!(!KeywordCriterionPredicate.is_fulfilled(&c, "necesito sus datos"));
        }
    }

    mod evaluate {
        use super::*;

        #[test]
        fn introduction_scores_only_its_criterion() {
            let scenario = interview_scenario();
            let mut perf = Performance::new();

            let fulfilled = CriteriaEvaluator::keyword().evaluate(
                &scenario,
                &mut perf,
                "Buenas tardes, Soy el Consultor de la empresa",
            );

            assert_eq!(ids(&fulfilled), vec!["introduction"]);
            assert_eq!(perf.score(), 15);
        }

        #[test]
        fn purpose_with_data_scores_purpose_only() {
            let scenario = interview_scenario();
            let evaluator = CriteriaEvaluator::keyword();
            let mut perf = Performance::new();

            evaluator.evaluate(&scenario, &mut perf, "soy el consultor asignado");
            let fulfilled = evaluator.evaluate(
                &scenario,
                &mut perf,
                "el propósito es revisar sus datos",
            );

            assert_eq!(ids(&fulfilled), vec!["purpose_explanation"]);
            assert_eq!(perf.score(), 35);
            assert_eq!(ids(perf.completed()), vec!["introduction", "purpose_explanation"]);
        }

        #[test]
        fn repeated_fulfilment_is_not_rescored() {
            let scenario = interview_scenario();
            let evaluator = CriteriaEvaluator::keyword();
            let mut perf = Performance::new();

            evaluator.evaluate(&scenario, &mut perf, "muchas gracias");
            let again = evaluator.evaluate(&scenario, &mut perf, "gracias otra vez");

            assert!(again.is_empty());
            assert_eq!(perf.score(), 15);
            assert_eq!(perf.feedback().len(), 1);
        }

        #[test]
        fn one_text_may_satisfy_several_criteria() {
            let scenario = interview_scenario();
            let mut perf = Performance::new();

            let fulfilled = CriteriaEvaluator::keyword().evaluate(
                &scenario,
                &mut perf,
                "tomo nota del documento, gracias",
            );

            assert_eq!(
                ids(&fulfilled),
                vec!["evidence_request", "response_recording", "closure"]
            );
            assert_eq!(perf.score(), 50);
        }

        #[test]
        fn all_criteria_reach_max_score() {
            let scenario = interview_scenario();
            let evaluator = CriteriaEvaluator::keyword();
            let mut perf = Performance::new();

            for text in FULFILLING {
                evaluator.evaluate(&scenario, &mut perf, text);
            }

            assert_eq!(perf.score(), scenario.max_score());
            assert_eq!(perf.completed().len(), 6);
        }
    }

    const FULFILLING: [&str; 6] = [
        "soy el consultor",
        "el propósito de la visita",
        "¿podría explicar el proceso?",
        "necesito la evidencia",
        "tomo nota de eso",
        "muchas gracias",
    ];

    const NOISE: [&str; 3] = ["necesito sus datos", "de acuerdo", "bien"];

    proptest! {
        #[test]
        fn score_matches_distinct_completed_weights(
            picks in prop::collection::vec(
                prop::sample::select(FULFILLING.iter().chain(NOISE.iter()).copied().collect::<Vec<_>>()),
                0..25,
            )
        ) {
            let scenario = interview_scenario();
            let evaluator = CriteriaEvaluator::keyword();
            let mut perf = Performance::new();
            let mut last_score = 0;

            for text in picks {
                evaluator.evaluate(&scenario, &mut perf, text);
                prop_assert!(perf.score() >= last_score);
                last_score = perf.score();
            }

            let expected: u32 = perf
                .completed()
                .iter()
                .filter_map(|id| scenario.criterion(id))
                .map(|c| c.weight)
                .sum();
            prop_assert_eq!(perf.score(), expected);
            prop_assert!(perf.score() <= scenario.max_score());

            let mut unique = perf.completed().to_vec();
            unique.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            unique.dedup();
            prop_assert_eq!(unique.len(), perf.completed().len());
        }
    }
}
