//! In-memory scenario catalog.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::foundation::ScenarioId;
use crate::domain::scenario::Scenario;
use crate::ports::ScenarioStore;

/// Immutable catalog keyed by scenario id.
///
/// Later entries with a duplicate id replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScenarioStore {
    scenarios: BTreeMap<ScenarioId, Arc<Scenario>>,
}

impl InMemoryScenarioStore {
    pub fn new(scenarios: impl IntoIterator<Item = Scenario>) -> Self {
        Self {
            scenarios: scenarios
                .into_iter()
                .map(|s| (s.id.clone(), Arc::new(s)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Adds every scenario of `other`, replacing same-id entries.
    pub fn merge(mut self, other: InMemoryScenarioStore) -> Self {
        self.scenarios.extend(other.scenarios);
        self
    }
}

#[async_trait]
impl ScenarioStore for InMemoryScenarioStore {
    async fn get(&self, id: &ScenarioId) -> Option<Arc<Scenario>> {
        self.scenarios.get(id).cloned()
    }

    async fn list(&self) -> Vec<ScenarioId> {
        self.scenarios.keys().cloned().collect()
    }
}
