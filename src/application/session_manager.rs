//! SessionManager - owns the single active simulation session.
//!
//! Every lifecycle operation takes the engine lock, mutates the in-memory
//! state, releases the lock, and only then talks to the outside world
//! (event publication and progress persistence). Completion removes the
//! active session while holding the lock, so whichever caller gets there
//! first (a manual `complete_session`, an expiring action, or the countdown
//! timer) finalizes the session and every later caller sees no session.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::timer::{SessionTimer, TickControl};
use crate::domain::foundation::{
    CriterionId, EventId, Percentage, ScenarioId, SerializableDomainEvent, SessionId, Timestamp,
};
use crate::domain::scenario::Scenario;
use crate::domain::simulation::{
    Action, ActionPayload, ActionProcessed, ActionProcessor, ActionType, CompletionReason,
    CriteriaEvaluator, CriterionPredicate, Performance, ProgressSnapshot, RandomSource,
    ResponseQualityScorer, ResultsCompiler, SeededRandom, Session, SessionCompleted,
    SessionOptions, SessionResult, SessionStarted, SimulatedResponse, SimulationError,
    SimulationMetrics, Stage, StageSequence, DEFAULT_QUESTION_PROBABILITY,
};
use crate::ports::{EventPublisher, KeyValueStore, ScenarioStore};

/// Seconds deducted from the time budget by every processed action.
pub const DEFAULT_TURN_COST_SECS: i64 = 60;

/// Storage key for the persisted progress snapshot.
pub const DEFAULT_PROGRESS_KEY: &str = "simulation_progress";

/// Tunables for a [`SessionManager`].
#[derive(Debug, Clone)]
pub struct SessionManagerConfig {
    pub turn_cost_secs: i64,
    /// Countdown period. `None` disables the background timer; callers then
    /// drive the countdown with [`SessionManager::tick`].
    pub tick_interval: Option<Duration>,
    pub question_probability: f64,
    pub rng_seed: Option<u64>,
    pub progress_key: String,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            turn_cost_secs: DEFAULT_TURN_COST_SECS,
            tick_interval: Some(Duration::from_secs(1)),
            question_probability: DEFAULT_QUESTION_PROBABILITY,
            rng_seed: None,
            progress_key: DEFAULT_PROGRESS_KEY.to_string(),
        }
    }
}

impl SessionManagerConfig {
    pub fn with_turn_cost_secs(mut self, secs: i64) -> Self {
        self.turn_cost_secs = secs;
        self
    }

    pub fn with_tick_interval(mut self, interval: Option<Duration>) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_question_probability(mut self, probability: f64) -> Self {
        self.question_probability = probability;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_progress_key(mut self, key: impl Into<String>) -> Self {
        self.progress_key = key.into();
        self
    }
}

/// Everything a caller needs to render the outcome of one action.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub action: Action,
    pub response: SimulatedResponse,
    /// Criteria first satisfied by this action.
    pub newly_completed: Vec<CriterionId>,
    pub performance: Performance,
    /// Stage after progression.
    pub stage: Stage,
    pub progress: Percentage,
    pub time_remaining: i64,
    /// Present when this action used up the time budget and ended the session.
    pub result: Option<SessionResult>,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Running { time_remaining: i64 },
    Completed(SessionResult),
}

struct ActiveSession {
    session: Session,
    scenario: Arc<Scenario>,
    stages: StageSequence,
    timer: Option<SessionTimer>,
}

struct EngineState {
    active: Option<ActiveSession>,
    history: Vec<SessionResult>,
    metrics: SimulationMetrics,
    rng: Box<dyn RandomSource>,
}

struct Completion {
    result: SessionResult,
    snapshot: ProgressSnapshot,
}

struct Inner {
    scenarios: Arc<dyn ScenarioStore>,
    storage: Arc<dyn KeyValueStore>,
    events: Arc<dyn EventPublisher>,
    config: SessionManagerConfig,
    processor: ActionProcessor,
    evaluator: CriteriaEvaluator,
    compiler: ResultsCompiler,
    state: Mutex<EngineState>,
}

/// Builder for [`SessionManager`].
pub struct SessionManagerBuilder {
    scenarios: Arc<dyn ScenarioStore>,
    storage: Arc<dyn KeyValueStore>,
    events: Arc<dyn EventPublisher>,
    config: SessionManagerConfig,
    rng: Option<Box<dyn RandomSource>>,
    scorer: Option<Arc<dyn ResponseQualityScorer>>,
    predicate: Option<Arc<dyn CriterionPredicate>>,
}

impl SessionManagerBuilder {
    pub fn config(mut self, config: SessionManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the random source otherwise derived from `config.rng_seed`.
    pub fn random_source(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn response_scorer(mut self, scorer: Arc<dyn ResponseQualityScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn criterion_predicate(mut self, predicate: Arc<dyn CriterionPredicate>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn build(self) -> SessionManager {
        let rng: Box<dyn RandomSource> = match (self.rng, self.config.rng_seed) {
            (Some(rng), _) => rng,
            (None, Some(seed)) => Box::new(SeededRandom::from_seed(seed)),
            (None, None) => Box::new(SeededRandom::from_entropy()),
        };
        let processor = match self.scorer {
            Some(scorer) => ActionProcessor::new(scorer, self.config.question_probability),
            None => ActionProcessor::lexical(self.config.question_probability),
        };
        let evaluator = match self.predicate {
            Some(predicate) => CriteriaEvaluator::new(predicate),
            None => CriteriaEvaluator::keyword(),
        };

        SessionManager {
            inner: Arc::new(Inner {
                scenarios: self.scenarios,
                storage: self.storage,
                events: self.events,
                config: self.config,
                processor,
                evaluator,
                compiler: ResultsCompiler,
                state: Mutex::new(EngineState {
                    active: None,
                    history: Vec::new(),
                    metrics: SimulationMetrics::new(),
                    rng,
                }),
            }),
        }
    }
}

/// The simulation engine's entry point.
///
/// Cheap to clone; clones share the same engine.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn builder(
        scenarios: Arc<dyn ScenarioStore>,
        storage: Arc<dyn KeyValueStore>,
        events: Arc<dyn EventPublisher>,
    ) -> SessionManagerBuilder {
        SessionManagerBuilder {
            scenarios,
            storage,
            events,
            config: SessionManagerConfig::default(),
            rng: None,
            scorer: None,
            predicate: None,
        }
    }

    pub fn new(
        scenarios: Arc<dyn ScenarioStore>,
        storage: Arc<dyn KeyValueStore>,
        events: Arc<dyn EventPublisher>,
        config: SessionManagerConfig,
    ) -> Self {
        Self::builder(scenarios, storage, events).config(config).build()
    }

    pub fn config(&self) -> &SessionManagerConfig {
        &self.inner.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Starts a session for `scenario_id` at the scenario's initial stage.
    ///
    /// # Errors
    ///
    /// - `Validation` if `options.duration_secs` is not positive
    /// - `Conflict` if a session is already active; it is left untouched
    /// - `NotFound` if the scenario is unknown
    /// - `Scenario` if the scenario content cannot drive a session
    pub async fn start_session(
        &self,
        scenario_id: &ScenarioId,
        options: SessionOptions,
    ) -> Result<Session, SimulationError> {
        if matches!(options.duration_secs, Some(secs) if secs <= 0) {
            return Err(SimulationError::validation(
                "duration_secs",
                "session duration must be positive",
            ));
        }

        let mut state = self.inner.state.lock().await;
        if let Some(active) = &state.active {
            warn!(
                active_session = %active.session.id(),
                scenario_id = %scenario_id,
                "Rejected start while a session is active"
            );
            return Err(SimulationError::Conflict {
                active: *active.session.id(),
            });
        }

        let scenario = self
            .inner
            .scenarios
            .get(scenario_id)
            .await
            .ok_or_else(|| SimulationError::NotFound(scenario_id.clone()))?;
        scenario.validate()?;
        let stages = StageSequence::for_scenario(&scenario)?;

        let session = Session::start(&scenario, &stages, options);
        let timer = self
            .inner
            .config
            .tick_interval
            .map(|period| self.spawn_timer(*session.id(), period));

        state.active = Some(ActiveSession {
            session: session.clone(),
            scenario: Arc::clone(&scenario),
            stages,
            timer,
        });
        drop(state);

        info!(
            session_id = %session.id(),
            scenario_id = %scenario.id,
            time_remaining = session.time_remaining(),
            "Simulation session started"
        );

        self.publish(&SessionStarted {
            event_id: EventId::new(),
            session_id: *session.id(),
            scenario_id: scenario.id.clone(),
            scenario_type: scenario.scenario_type,
            initial_stage: session.current_stage().clone(),
            time_remaining: session.time_remaining(),
            started_at: *session.started_at(),
        })
        .await;

        Ok(session)
    }

    /// Processes one learner turn against the active session.
    ///
    /// Resolves the counterpart's response, scores the rubric, advances the
    /// stage, records the action and charges the turn cost. If that exhausts
    /// the time budget the session is completed before returning.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if no session is active
    /// - `Validation` if a `speak` action has no text; the session is unchanged
    pub async fn execute_action(
        &self,
        action_type: ActionType,
        payload: ActionPayload,
    ) -> Result<ActionOutcome, SimulationError> {
        let mut guard = self.inner.state.lock().await;
        let state = &mut *guard;
        let active = state
            .active
            .as_mut()
            .ok_or_else(SimulationError::no_active_session)?;

        let action = Action::record(action_type, payload, active.session.current_stage().clone())?;

        let response = self.inner.processor.process(
            &active.scenario,
            &active.session,
            &action,
            state.rng.as_mut(),
        );
        active.session.set_reaction(response.mood, response.engagement);

        let newly_completed = self.inner.evaluator.evaluate(
            &active.scenario,
            active.session.performance_mut(),
            action.content(),
        );

        active.session.advance_stage(&active.stages);
        active.session.record_action(action.clone());
        active.session.consume_time(self.inner.config.turn_cost_secs);

        let session_id = *active.session.id();
        let performance = active.session.performance().clone();
        let stage = active.session.current_stage().clone();
        let progress = active.session.progress();
        let time_remaining = active.session.time_remaining();
        let expired = active.session.is_expired();

        debug!(
            session_id = %session_id,
            action_type = %action.action_type(),
            stage = %stage,
            score = performance.score(),
            newly_completed = newly_completed.len(),
            time_remaining,
            "Action processed"
        );

        let mut completion = None;
        if expired {
            if let Some(finished) = state.active.take() {
                completion = Some(self.finalize(state, finished, CompletionReason::TimeExpired));
            }
        }
        drop(guard);

        let outcome = ActionOutcome {
            action,
            response,
            newly_completed,
            performance,
            stage,
            progress,
            time_remaining,
            result: completion.as_ref().map(|c| c.result.clone()),
        };

        self.publish(&ActionProcessed {
            event_id: EventId::new(),
            session_id,
            action_id: *outcome.action.id(),
            response: outcome.response.clone(),
            newly_completed: outcome.newly_completed.clone(),
            performance: outcome.performance.clone(),
            stage: outcome.stage.clone(),
            progress,
            time_remaining,
            processed_at: Timestamp::now(),
        })
        .await;

        if let Some(completion) = &completion {
            self.announce(completion).await;
        }

        Ok(outcome)
    }

    /// Grades the active session, records the result and clears the session.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if no session is active, including when it was
    ///   already completed manually or by the timer
    pub async fn complete_session(&self) -> Result<SessionResult, SimulationError> {
        let mut state = self.inner.state.lock().await;
        let active = state
            .active
            .take()
            .ok_or_else(SimulationError::no_active_session)?;
        let completion = self.finalize(&mut state, active, CompletionReason::Manual);
        drop(state);

        self.announce(&completion).await;
        Ok(completion.result)
    }

    /// Advances the countdown of the active session by one second.
    ///
    /// The background timer calls this once per tick; with the timer
    /// disabled callers may drive the countdown themselves.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if no session is active
    pub async fn tick(&self) -> Result<TickOutcome, SimulationError> {
        self.tick_session(None)
            .await
            .ok_or_else(SimulationError::no_active_session)
    }

    /// Loads the persisted history and metrics, replacing the in-memory ones.
    ///
    /// Returns `false` when nothing was restored. Storage problems are logged,
    /// never surfaced.
    pub async fn restore_progress(&self) -> bool {
        let key = &self.inner.config.progress_key;
        let value = match self.inner.storage.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => return false,
            Err(e) => {
                warn!(key = %key, "Failed to load simulation progress: {}", e);
                return false;
            }
        };

        let snapshot: ProgressSnapshot = match serde_json::from_value(value) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(key = %key, "Ignoring unreadable simulation progress: {}", e);
                return false;
            }
        };

        let mut state = self.inner.state.lock().await;
        info!(
            sessions = snapshot.history.len(),
            "Restored simulation progress"
        );
        state.history = snapshot.history;
        state.metrics = snapshot.metrics;
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn get_active_session(&self) -> Option<Session> {
        self.inner
            .state
            .lock()
            .await
            .active
            .as_ref()
            .map(|a| a.session.clone())
    }

    /// Results of every completed session, oldest first.
    pub async fn get_session_history(&self) -> Vec<SessionResult> {
        self.inner.state.lock().await.history.clone()
    }

    pub async fn metrics(&self) -> SimulationMetrics {
        self.inner.state.lock().await.metrics.clone()
    }

    pub async fn available_scenarios(&self) -> Vec<ScenarioId> {
        self.inner.scenarios.list().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn spawn_timer(&self, session_id: SessionId, period: Duration) -> SessionTimer {
        let engine: Weak<Inner> = Arc::downgrade(&self.inner);
        SessionTimer::spawn(period, move || {
            let engine = engine.clone();
            async move {
                let Some(inner) = engine.upgrade() else {
                    return TickControl::Stop;
                };
                let manager = SessionManager { inner };
                match manager.tick_session(Some(session_id)).await {
                    Some(TickOutcome::Running { .. }) => TickControl::Continue,
                    Some(TickOutcome::Completed(_)) | None => TickControl::Stop,
                }
            }
        })
    }

    /// Ticks the active session, optionally only if it is `expected`.
    ///
    /// Returns `None` when there is nothing to tick.
    async fn tick_session(&self, expected: Option<SessionId>) -> Option<TickOutcome> {
        let mut state = self.inner.state.lock().await;
        let active = state.active.as_mut()?;
        if expected.map_or(false, |id| id != *active.session.id()) {
            return None;
        }

        let remaining = active.session.consume_time(1);
        if remaining > 0 {
            return Some(TickOutcome::Running {
                time_remaining: remaining,
            });
        }

        let finished = state.active.take()?;
        let completion = self.finalize(&mut state, finished, CompletionReason::TimeExpired);
        drop(state);

        self.announce(&completion).await;
        Some(TickOutcome::Completed(completion.result))
    }

    /// Compiles the result and folds it into history and metrics.
    ///
    /// Must be called with the engine lock held and the session already
    /// removed from `state.active`.
    fn finalize(
        &self,
        state: &mut EngineState,
        finished: ActiveSession,
        reason: CompletionReason,
    ) -> Completion {
        let ActiveSession {
            session,
            scenario,
            timer,
            ..
        } = finished;
        if let Some(timer) = timer {
            timer.cancel();
        }

        let result = self.inner.compiler.compile(&scenario, &session, reason);
        state.history.push(result.clone());
        state.metrics.record(&result);

        info!(
            session_id = %session.id(),
            scenario_id = %scenario.id,
            score = result.final_score,
            percentage = result.percentage.value(),
            level = %result.certification.level,
            reason = ?reason,
            "Simulation session completed"
        );

        Completion {
            result,
            snapshot: ProgressSnapshot {
                history: state.history.clone(),
                metrics: state.metrics.clone(),
            },
        }
    }

    async fn announce(&self, completion: &Completion) {
        self.publish(&SessionCompleted {
            event_id: EventId::new(),
            session_id: completion.result.session_id,
            result: completion.result.clone(),
            completed_at: completion.result.completed_at,
        })
        .await;
        self.persist(&completion.snapshot).await;
    }

    async fn publish<E>(&self, event: &E)
    where
        E: SerializableDomainEvent + Sync,
    {
        let envelope = match event.to_envelope() {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(event_type = event.event_type(), "Failed to serialize event: {}", e);
                return;
            }
        };
        if let Err(e) = self.inner.events.publish(envelope).await {
            warn!(event_type = event.event_type(), "Failed to publish event: {}", e);
        }
    }

    async fn persist(&self, snapshot: &ProgressSnapshot) {
        let key = &self.inner.config.progress_key;
        let value = match serde_json::to_value(snapshot) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, "Failed to serialize simulation progress: {}", e);
                return;
            }
        };
        match self.inner.storage.set(key, value).await {
            Ok(()) => debug!(key = %key, "Simulation progress saved"),
            Err(e) => warn!(key = %key, "Failed to persist simulation progress: {}", e),
        }
    }
}
