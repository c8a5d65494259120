//! Aggregate learner progress across completed sessions.

use serde::{Deserialize, Serialize};

use super::SessionResult;
use crate::domain::foundation::Percentage;

/// Running totals over every completed session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    pub sessions_completed: u32,
    pub total_actions: u64,
    pub best_percentage: Percentage,
    pub average_percentage: f64,
    pub certification_ready_count: u32,
}

impl SimulationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one result into the totals.
    pub fn record(&mut self, result: &SessionResult) {
        let previous_total = self.average_percentage * f64::from(self.sessions_completed);
        self.sessions_completed += 1;
        self.total_actions += result.actions_taken as u64;
        self.best_percentage = self.best_percentage.max(result.percentage);
        self.average_percentage = (previous_total + f64::from(result.percentage.value()))
            / f64::from(self.sessions_completed);
        if result.certification.ready {
            self.certification_ready_count += 1;
        }
    }
}

/// What gets persisted after each completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub history: Vec<SessionResult>,
    pub metrics: SimulationMetrics,
}
