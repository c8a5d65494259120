//! Simulation engine configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::{SessionManagerConfig, DEFAULT_TURN_COST_SECS};
use crate::domain::simulation::DEFAULT_QUESTION_PROBABILITY;

/// Tunables for the session engine
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Seconds charged against the time budget per action
    #[serde(default = "default_turn_cost")]
    pub turn_cost_secs: i64,

    /// Countdown tick period in milliseconds (0 disables the countdown)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Chance that a presentation audience interrupts with a question
    #[serde(default = "default_question_probability")]
    pub question_injection_probability: f64,

    /// Fixed seed for reproducible runs
    pub rng_seed: Option<u64>,
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Option<Duration> {
        match self.tick_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Builds the engine configuration, persisting progress under `progress_key`
    pub fn session_manager_config(&self, progress_key: &str) -> SessionManagerConfig {
        let config = SessionManagerConfig::default()
            .with_turn_cost_secs(self.turn_cost_secs)
            .with_tick_interval(self.tick_interval())
            .with_question_probability(self.question_injection_probability)
            .with_progress_key(progress_key);
        match self.rng_seed {
            Some(seed) => config.with_rng_seed(seed),
            None => config,
        }
    }

    /// Validate simulation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.turn_cost_secs <= 0 {
            return Err(ValidationError::InvalidTurnCost);
        }
        if !(0.0..=1.0).contains(&self.question_injection_probability) {
            return Err(ValidationError::InvalidProbability);
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            turn_cost_secs: default_turn_cost(),
            tick_interval_ms: default_tick_interval(),
            question_injection_probability: default_question_probability(),
            rng_seed: None,
        }
    }
}

fn default_turn_cost() -> i64 {
    DEFAULT_TURN_COST_SECS
}

fn default_tick_interval() -> u64 {
    1000
}

fn default_question_probability() -> f64 {
    DEFAULT_QUESTION_PROBABILITY
}
