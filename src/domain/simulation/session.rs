//! Simulation session aggregate.
//!
//! A session is one in-progress attempt at a scenario. It is created by the
//! session manager, mutated only by processed actions and timer ticks, and
//! discarded when the session is completed.
//!
//! # Invariants
//!
//! - `current_stage` is always a member of the scenario's stage sequence
//! - `time_remaining` never increases
//! - `performance.score` and `performance.completed` never decrease
//! - a criterion id appears in `performance.completed` at most once

use serde::{Deserialize, Serialize};

use super::{Action, Stage, StageSequence};
use crate::domain::foundation::{CriterionId, Percentage, ScenarioId, SessionId, Timestamp};
use crate::domain::scenario::{Criterion, Scenario, ScenarioType};

/// Counterpart mood after the last interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// Counterpart engagement after the last interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Engagement {
    High,
    #[default]
    Medium,
    Low,
}

/// Record of a criterion being satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub criterion_id: CriterionId,
    pub title: String,
    pub timestamp: Timestamp,
}

/// Rubric progress within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    completed: Vec<CriterionId>,
    score: u32,
    feedback: Vec<FeedbackEntry>,
}

impl Performance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Criterion ids in the order they were satisfied.
    pub fn completed(&self) -> &[CriterionId] {
        &self.completed
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn feedback(&self) -> &[FeedbackEntry] {
        &self.feedback
    }

    pub fn is_completed(&self, id: &CriterionId) -> bool {
        self.completed.contains(id)
    }

    /// Marks a criterion satisfied and adds its weight.
    ///
    /// Returns `false` (and changes nothing) if it was already satisfied.
    pub fn record(&mut self, criterion: &Criterion) -> bool {
        if self.is_completed(&criterion.id) {
            return false;
        }
        self.completed.push(criterion.id.clone());
        self.score += criterion.weight;
        self.feedback.push(FeedbackEntry {
            criterion_id: criterion.id.clone(),
            title: criterion.title.clone(),
            timestamp: Timestamp::now(),
        });
        true
    }
}

/// Caller options for starting a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Replaces the scenario's estimated duration, in seconds.
    #[serde(default)]
    pub duration_secs: Option<i64>,
    /// Allows the audience to interrupt presentations with questions.
    #[serde(default = "default_inject_questions")]
    pub inject_questions: bool,
}

fn default_inject_questions() -> bool {
    true
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            duration_secs: None,
            inject_questions: true,
        }
    }
}

impl SessionOptions {
    pub fn with_duration_secs(mut self, secs: i64) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    pub fn without_questions(mut self) -> Self {
        self.inject_questions = false;
        self
    }
}

/// One in-progress attempt at a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    scenario_id: ScenarioId,
    scenario_type: ScenarioType,
    current_stage: Stage,
    time_remaining: i64,
    progress: Percentage,
    actions: Vec<Action>,
    performance: Performance,
    mood: Mood,
    engagement: Engagement,
    options: SessionOptions,
    started_at: Timestamp,
}

impl Session {
    /// Creates a session positioned at the sequence's initial stage.
    pub fn start(scenario: &Scenario, stages: &StageSequence, options: SessionOptions) -> Self {
        let initial = stages.initial().clone();
        Self {
            id: SessionId::new(),
            scenario_id: scenario.id.clone(),
            scenario_type: scenario.scenario_type,
            progress: stages.progress(&initial),
            current_stage: initial,
            time_remaining: options.duration_secs.unwrap_or_else(|| scenario.duration_secs()),
            actions: Vec::new(),
            performance: Performance::new(),
            mood: Mood::default(),
            engagement: Engagement::default(),
            options,
            started_at: Timestamp::now(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn scenario_id(&self) -> &ScenarioId {
        &self.scenario_id
    }

    pub fn scenario_type(&self) -> ScenarioType {
        self.scenario_type
    }

    pub fn current_stage(&self) -> &Stage {
        &self.current_stage
    }

    /// Seconds left; may be zero or negative once expired.
    pub fn time_remaining(&self) -> i64 {
        self.time_remaining
    }

    pub fn progress(&self) -> Percentage {
        self.progress
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn performance(&self) -> &Performance {
        &self.performance
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn engagement(&self) -> Engagement {
        self.engagement
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn is_expired(&self) -> bool {
        self.time_remaining <= 0
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) fn performance_mut(&mut self) -> &mut Performance {
        &mut self.performance
    }

    pub(crate) fn set_reaction(&mut self, mood: Mood, engagement: Engagement) {
        self.mood = mood;
        self.engagement = engagement;
    }

    pub(crate) fn record_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Moves to the next stage and refreshes derived progress.
    pub(crate) fn advance_stage(&mut self, stages: &StageSequence) {
        self.current_stage = stages.advance(&self.current_stage);
        self.progress = stages.progress(&self.current_stage);
    }

    /// Deducts time and returns what is left. Negative amounts are ignored.
    pub(crate) fn consume_time(&mut self, secs: i64) -> i64 {
        self.time_remaining -= secs.max(0);
        self.time_remaining
    }
}
