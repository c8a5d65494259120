//! Action processor - resolves a learner turn into the simulated
//! counterpart's reaction.
//!
//! Interviews answer from the scripted dialogue for the current stage and
//! judge the learner's approach by lexical overlap with the candidate
//! options. Presentations judge coverage of the stage's key points and may
//! be interrupted by an audience question.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Action, Engagement, Mood, RandomSource, Session};
use crate::domain::scenario::{DialogueEntry, FlowStage, Scenario, ScenarioType};

/// Default probability of an audience question interrupting a presentation turn.
pub const DEFAULT_QUESTION_PROBABILITY: f64 = 0.3;

const CLIENT_SPEAKER: &str = "Cliente";
const AUDIENCE_SPEAKER: &str = "Audiencia";
const GENERIC_PROMPT: &str = "Entiendo. Por favor, continúe.";
const GENERIC_AUDIENCE: &str = "La audiencia escucha con atención.";
const PRAISE_FEEDBACK: &str = "Excelente: cubrió los puntos clave con claridad.";
const ADEQUATE_FEEDBACK: &str = "Presentación adecuada; puede profundizar en algunos puntos.";
const CLARITY_FEEDBACK: &str = "La audiencia necesita más claridad sobre los puntos clave.";
const QUESTION_FEEDBACK: &str = "La audiencia tiene una pregunta.";

/// Pluggable response-quality heuristics.
pub trait ResponseQualityScorer: Send + Sync {
    /// Index of the candidate option that best matches `text`.
    ///
    /// Returns `None` when there are no options.
    fn best_option(&self, text: &str, options: &[String]) -> Option<usize>;

    /// Share of the key-point vocabulary covered by `text`, in `[0, 1]`.
    fn coverage(&self, text: &str, key_points: &[String]) -> f64;
}

/// Case-insensitive whitespace-token overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalOverlapScorer;

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

impl ResponseQualityScorer for LexicalOverlapScorer {
    fn best_option(&self, text: &str, options: &[String]) -> Option<usize> {
        let submitted: HashSet<String> = tokenize(text).into_iter().collect();

        let mut best: Option<(usize, f64)> = None;
        for (idx, option) in options.iter().enumerate() {
            let candidate = tokenize(option);
            let fraction = if candidate.is_empty() {
                0.0
            } else {
                let hits = candidate.iter().filter(|t| submitted.contains(*t)).count();
                hits as f64 / candidate.len() as f64
            };
            // strict comparison keeps the lowest index on ties
            if best.map_or(true, |(_, score)| fraction > score) {
                best = Some((idx, fraction));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn coverage(&self, text: &str, key_points: &[String]) -> f64 {
        let key_tokens: Vec<String> = key_points.iter().flat_map(|k| tokenize(k)).collect();
        if key_tokens.is_empty() {
            return 0.0;
        }
        let vocabulary: HashSet<&String> = key_tokens.iter().collect();
        let hits = tokenize(text)
            .iter()
            .filter(|t| vocabulary.contains(t))
            .count();
        (hits as f64 / key_tokens.len() as f64).clamp(0.0, 1.0)
    }
}

/// What produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Scripted interview dialogue.
    Dialogue,
    /// Coverage-based audience reaction.
    AudienceReaction,
    /// Question drawn from the scenario's bank.
    AudienceQuestion,
    /// No matching content for the stage.
    Fallback,
}

/// The simulated counterpart's reply to one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedResponse {
    pub kind: ResponseKind,
    pub speaker: String,
    pub content: String,
    pub mood: Mood,
    pub engagement: Engagement,
    pub feedback: Option<String>,
    /// Interview turns only: whether the learner chose the canonical approach.
    pub is_correct_approach: Option<bool>,
    /// Presentation reactions only.
    pub coverage: Option<f64>,
}

impl SimulatedResponse {
    fn fallback(speaker: &str, content: &str) -> Self {
        Self {
            kind: ResponseKind::Fallback,
            speaker: speaker.to_string(),
            content: content.to_string(),
            mood: Mood::Neutral,
            engagement: Engagement::Medium,
            feedback: None,
            is_correct_approach: None,
            coverage: None,
        }
    }
}

/// Resolves actions into counterpart responses.
#[derive(Clone)]
pub struct ActionProcessor {
    scorer: Arc<dyn ResponseQualityScorer>,
    question_probability: f64,
}

impl ActionProcessor {
    /// `question_probability` is clamped to `[0, 1]`.
    pub fn new(scorer: Arc<dyn ResponseQualityScorer>, question_probability: f64) -> Self {
        Self {
            scorer,
            question_probability: question_probability.clamp(0.0, 1.0),
        }
    }

    /// Processor using the lexical overlap heuristics.
    pub fn lexical(question_probability: f64) -> Self {
        Self::new(Arc::new(LexicalOverlapScorer), question_probability)
    }

    pub fn question_probability(&self) -> f64 {
        self.question_probability
    }

    /// Produces the counterpart's response for `action` at the session's current stage.
    pub fn process(
        &self,
        scenario: &Scenario,
        session: &Session,
        action: &Action,
        rng: &mut dyn RandomSource,
    ) -> SimulatedResponse {
        match scenario.scenario_type {
            ScenarioType::Interview => match scenario.dialogue_for(session.current_stage()) {
                Some(entry) => self.respond_to_dialogue(entry, action),
                None => SimulatedResponse::fallback(CLIENT_SPEAKER, GENERIC_PROMPT),
            },
            ScenarioType::Presentation => match scenario.flow_stage(session.current_stage()) {
                Some(flow) => {
                    let allow_questions = session.options().inject_questions;
                    if allow_questions {
                        if let Some(question) = self.maybe_question(scenario, rng) {
                            return question;
                        }
                    }
                    self.react_to_presentation(flow, action)
                }
                None => SimulatedResponse::fallback(AUDIENCE_SPEAKER, GENERIC_AUDIENCE),
            },
        }
    }

    fn respond_to_dialogue(&self, entry: &DialogueEntry, action: &Action) -> SimulatedResponse {
        let mut response = SimulatedResponse {
            kind: ResponseKind::Dialogue,
            speaker: entry.speaker.clone(),
            content: entry.response.clone(),
            mood: Mood::Neutral,
            engagement: Engagement::Medium,
            feedback: None,
            is_correct_approach: None,
            coverage: None,
        };

        if !action.action_type().is_speak() || entry.options.is_empty() {
            return response;
        }

        let chosen = self.scorer.best_option(action.content(), &entry.options);
        let correct = chosen == Some(entry.correct_option);
        debug!(
            trigger = %entry.trigger,
            chosen = ?chosen,
            expected = entry.correct_option,
            correct,
            "Scored dialogue approach"
        );

        if correct {
            response.mood = Mood::Positive;
            response.engagement = Engagement::High;
            response.feedback = Some(entry.feedback.correct.clone());
        } else {
            response.feedback = Some(entry.feedback.incorrect.clone());
        }
        response.is_correct_approach = Some(correct);
        response
    }

    fn maybe_question(
        &self,
        scenario: &Scenario,
        rng: &mut dyn RandomSource,
    ) -> Option<SimulatedResponse> {
        if scenario.questions.is_empty() || rng.next_f64() >= self.question_probability {
            return None;
        }
        let question = &scenario.questions[rng.pick(scenario.questions.len())];
        debug!(question = %question, "Audience question injected");
        Some(SimulatedResponse {
            kind: ResponseKind::AudienceQuestion,
            speaker: AUDIENCE_SPEAKER.to_string(),
            content: question.clone(),
            mood: Mood::Neutral,
            engagement: Engagement::Medium,
            feedback: Some(QUESTION_FEEDBACK.to_string()),
            is_correct_approach: None,
            coverage: None,
        })
    }

    fn react_to_presentation(&self, flow: &FlowStage, action: &Action) -> SimulatedResponse {
        let coverage = self.scorer.coverage(action.content(), &flow.key_points);
        debug!(stage = %flow.stage, coverage, "Scored presentation coverage");

        let (mood, engagement, feedback) = if coverage > 0.8 {
            (Mood::Positive, Engagement::High, PRAISE_FEEDBACK)
        } else if coverage > 0.5 {
            (Mood::Neutral, Engagement::Medium, ADEQUATE_FEEDBACK)
        } else {
            (Mood::Neutral, Engagement::Low, CLARITY_FEEDBACK)
        };

        SimulatedResponse {
            kind: ResponseKind::AudienceReaction,
            speaker: AUDIENCE_SPEAKER.to_string(),
            content: flow.title.clone(),
            mood,
            engagement,
            feedback: Some(feedback.to_string()),
            is_correct_approach: None,
            coverage: Some(coverage),
        }
    }
}

impl Default for ActionProcessor {
    fn default() -> Self {
        Self::lexical(DEFAULT_QUESTION_PROBABILITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::fixtures::{interview_scenario, presentation_scenario};
    use crate::domain::simulation::{
        ActionPayload, ActionType, SeededRandom, SessionOptions, StageSequence,
    };

    /// Replays fixed samples so injection decisions are explicit.
    struct ScriptedRandom {
        samples: Vec<f64>,
        picks: Vec<usize>,
    }

    impl RandomSource for ScriptedRandom {
        fn next_f64(&mut self) -> f64 {
            self.samples.remove(0)
        }

        fn pick(&mut self, _len: usize) -> usize {
            self.picks.remove(0)
        }
    }

    fn speak(session: &Session, text: &str) -> Action {
        Action::record(
            ActionType::Speak,
            ActionPayload::text(text),
            session.current_stage().clone(),
        )
        .unwrap()
    }

    fn session_for(scenario: &Scenario, options: SessionOptions) -> Session {
        let stages = StageSequence::for_scenario(scenario).unwrap();
        Session::start(scenario, &stages, options)
    }

    fn options(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    mod lexical_scorer {
        use super::*;

        #[test]
        fn picks_highest_overlap() {
            let opts = options(&["uno dos tres", "cuatro cinco"]);
            let idx = LexicalOverlapScorer.best_option("Cuatro y CINCO", &opts);
            assert_eq!(idx, Some(1));
        }

        #[test]
        fn ties_go_to_lowest_index() {
            let opts = options(&["alfa beta", "gamma delta"]);
            assert_eq!(LexicalOverlapScorer.best_option("nada", &opts), Some(0));
            assert_eq!(
                LexicalOverlapScorer.best_option("alfa gamma", &opts),
                Some(0)
            );
        }

        #[test]
        fn no_options_yields_none() {
            assert_eq!(LexicalOverlapScorer.best_option("hola", &[]), None);
        }

        #[test]
        fn coverage_counts_submitted_tokens() {
            let kp = options(&["agenda clara", "objetivo"]);
            let c = LexicalOverlapScorer.coverage("la agenda y el objetivo", &kp);
            assert!((c - 2.0 / 3.0).abs() < 1e-9);
        }

        #[test]
        fn coverage_is_clipped_to_one() {
            let kp = options(&["agenda"]);
            let c = LexicalOverlapScorer.coverage("agenda agenda agenda", &kp);
            assert_eq!(c, 1.0);
        }

        #[test]
        fn coverage_without_key_points_is_zero() {
            assert_eq!(LexicalOverlapScorer.coverage("algo", &[]), 0.0);
        }
    }

    mod interview {
        use super::*;

        #[test]
        fn correct_approach_is_positive() {
            let scenario = interview_scenario();
            let session = session_for(&scenario, SessionOptions::default());
            let action = speak(&session, "Hola, soy el consultor asignado");
            let mut rng = SeededRandom::from_seed(1);

            let response = ActionProcessor::default().process(&scenario, &session, &action, &mut rng);

            assert_eq!(response.kind, ResponseKind::Dialogue);
            assert_eq!(response.speaker, "Cliente");
            assert_eq!(response.content, "Respuesta para introduction");
            assert_eq!(response.mood, Mood::Positive);
            assert_eq!(response.engagement, Engagement::High);
            assert_eq!(response.is_correct_approach, Some(true));
            assert_eq!(response.feedback.as_deref(), Some("Bien hecho"));
        }

        #[test]
        fn wrong_approach_is_neutral() {
            let scenario = interview_scenario();
            let session = session_for(&scenario, SessionOptions::default());
            let action = speak(&session, "empecemos ya");
            let mut rng = SeededRandom::from_seed(1);

            let response = ActionProcessor::default().process(&scenario, &session, &action, &mut rng);

            assert_eq!(response.mood, Mood::Neutral);
            assert_eq!(response.engagement, Engagement::Medium);
            assert_eq!(response.is_correct_approach, Some(false));
            assert_eq!(response.feedback.as_deref(), Some("Puede mejorar"));
        }

        #[test]
        fn non_speak_action_is_not_judged() {
            let scenario = interview_scenario();
            let session = session_for(&scenario, SessionOptions::default());
            let action = Action::record(
                ActionType::from("note"),
                ActionPayload::text("soy el consultor asignado"),
                session.current_stage().clone(),
            )
            .unwrap();
            let mut rng = SeededRandom::from_seed(1);

            let response = ActionProcessor::default().process(&scenario, &session, &action, &mut rng);

            assert_eq!(response.is_correct_approach, None);
            assert!(response.feedback.is_none());
        }

        #[test]
        fn missing_dialogue_yields_generic_prompt() {
            let mut scenario = interview_scenario();
            scenario.dialogues.clear();
            let session = session_for(&scenario, SessionOptions::default());
            let action = speak(&session, "hola");
            let mut rng = SeededRandom::from_seed(1);

            let response = ActionProcessor::default().process(&scenario, &session, &action, &mut rng);

            assert_eq!(response.kind, ResponseKind::Fallback);
            assert_eq!(response.mood, Mood::Neutral);
        }
    }

    mod presentation {
        use super::*;

        fn no_questions() -> ActionProcessor {
            ActionProcessor::lexical(0.0)
        }

        #[test]
        fn full_coverage_is_praised() {
            let scenario = presentation_scenario();
            let session = session_for(&scenario, SessionOptions::default());
            let action = speak(&session, "saludo inicial y agenda clara");
            let mut rng = SeededRandom::from_seed(3);

            let response = no_questions().process(&scenario, &session, &action, &mut rng);

            assert_eq!(response.kind, ResponseKind::AudienceReaction);
            assert_eq!(response.mood, Mood::Positive);
            assert_eq!(response.engagement, Engagement::High);
            assert_eq!(response.coverage, Some(1.0));
        }

        #[test]
        fn partial_coverage_is_adequate() {
            let scenario = presentation_scenario();
            let session = session_for(&scenario, SessionOptions::default());
            // 3 of 4 key-point tokens
            let action = speak(&session, "saludo inicial agenda");
            let mut rng = SeededRandom::from_seed(3);

            let response = no_questions().process(&scenario, &session, &action, &mut rng);

            assert_eq!(response.engagement, Engagement::Medium);
            assert_eq!(response.mood, Mood::Neutral);
        }

        #[test]
        fn low_coverage_asks_for_clarity() {
            let scenario = presentation_scenario();
            let session = session_for(&scenario, SessionOptions::default());
            let action = speak(&session, "hola a todos");
            let mut rng = SeededRandom::from_seed(3);

            let response = no_questions().process(&scenario, &session, &action, &mut rng);

            assert_eq!(response.engagement, Engagement::Low);
            assert_eq!(response.feedback.as_deref(), Some(CLARITY_FEEDBACK));
        }

        #[test]
        fn question_overrides_reaction_when_sample_below_probability() {
            let scenario = presentation_scenario();
            let session = session_for(&scenario, SessionOptions::default());
            let action = speak(&session, "saludo inicial y agenda clara");
            let mut rng = ScriptedRandom {
                samples: vec![0.1],
                picks: vec![1],
            };

            let response = ActionProcessor::lexical(0.3).process(&scenario, &session, &action, &mut rng);

            assert_eq!(response.kind, ResponseKind::AudienceQuestion);
            assert_eq!(response.content, "¿Cuándo empezamos?");
        }

        #[test]
        fn no_question_when_sample_above_probability() {
            let scenario = presentation_scenario();
            let session = session_for(&scenario, SessionOptions::default());
            let action = speak(&session, "saludo inicial y agenda clara");
            let mut rng = ScriptedRandom {
                samples: vec![0.9],
                picks: vec![],
            };

            let response = ActionProcessor::lexical(0.3).process(&scenario, &session, &action, &mut rng);

            assert_eq!(response.kind, ResponseKind::AudienceReaction);
        }

        #[test]
        fn session_option_disables_questions() {
            let scenario = presentation_scenario();
            let session = session_for(&scenario, SessionOptions::default().without_questions());
            let action = speak(&session, "saludo inicial");
            let mut rng = ScriptedRandom {
                samples: vec![],
                picks: vec![],
            };

            let response = ActionProcessor::lexical(1.0).process(&scenario, &session, &action, &mut rng);

            assert_eq!(response.kind, ResponseKind::AudienceReaction);
        }

        #[test]
        fn empty_question_bank_never_injects() {
            let mut scenario = presentation_scenario();
            scenario.questions.clear();
            let session = session_for(&scenario, SessionOptions::default());
            let action = speak(&session, "saludo inicial");
            let mut rng = SeededRandom::from_seed(5);

            let response = ActionProcessor::lexical(1.0).process(&scenario, &session, &action, &mut rng);

            assert_eq!(response.kind, ResponseKind::AudienceReaction);
        }

        #[test]
        fn seeded_sources_reproduce_injection() {
            let scenario = presentation_scenario();
            let session = session_for(&scenario, SessionOptions::default());
            let action = speak(&session, "saludo");
            let processor = ActionProcessor::lexical(0.5);

            let run = |seed| {
                let mut rng = SeededRandom::from_seed(seed);
                (0..20)
                    .map(|_| processor.process(&scenario, &session, &action, &mut rng).kind)
                    .collect::<Vec<_>>()
            };

            assert_eq!(run(11), run(11));
        }
    }

    #[test]
    fn probability_is_clamped() {
        assert_eq!(ActionProcessor::lexical(3.0).question_probability(), 1.0);
        assert_eq!(ActionProcessor::lexical(-1.0).question_probability(), 0.0);
    }
}
