//! Scenario Store Port - read-only lookup of role-play exercises.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::ScenarioId;
use crate::domain::scenario::Scenario;

/// Port for looking up scenario definitions by id.
///
/// Scenarios are loaded once and never mutated, so implementations hand out
/// shared references.
#[async_trait]
pub trait ScenarioStore: Send + Sync {
    /// Returns the scenario with `id`, or `None` if it is unknown.
    async fn get(&self, id: &ScenarioId) -> Option<Arc<Scenario>>;

    /// Ids of every available scenario, sorted.
    async fn list(&self) -> Vec<ScenarioId>;
}
