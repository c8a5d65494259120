//! Simulation domain module.
//!
//! The engine's pure core: the session aggregate, linear stage progression,
//! action resolution, criteria scoring, and result compilation. Nothing in
//! here performs I/O; the application layer drives these types and talks to
//! the ports.

mod action;
mod criteria;
mod errors;
pub mod events;
mod metrics;
mod processor;
mod random;
mod results;
mod session;
mod stage;

pub use action::{Action, ActionPayload, ActionType};
pub use criteria::{
    builtin_triggers, CriteriaEvaluator, CriterionPredicate, KeywordCriterionPredicate,
};
pub use errors::SimulationError;
pub use events::{ActionProcessed, SessionCompleted, SessionStarted};
pub use metrics::{ProgressSnapshot, SimulationMetrics};
pub use processor::{
    ActionProcessor, LexicalOverlapScorer, ResponseKind, ResponseQualityScorer,
    SimulatedResponse, DEFAULT_QUESTION_PROBABILITY,
};
pub use random::{RandomSource, SeededRandom};
pub use results::{
    Certification, CertificationLevel, CompletionReason, Priority, Recommendation,
    ResultsCompiler, SessionResult, HIGH_PRIORITY_WEIGHT, READINESS_THRESHOLD,
};
pub use session::{
    Engagement, FeedbackEntry, Mood, Performance, Session, SessionOptions,
};
pub use stage::{InterviewStage, Stage, StageSequence};
