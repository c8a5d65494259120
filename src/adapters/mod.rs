//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the simulation engine to its collaborators:
//! - `events` - Event bus implementations
//! - `scenarios` - Scenario catalogs (built-in, YAML directory)
//! - `storage` - Key-value stores for learner progress

pub mod events;
pub mod scenarios;
pub mod storage;

pub use events::LocalEventBus;
pub use scenarios::{InMemoryScenarioStore, ScenarioLoadError, YamlScenarioStore};
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore};
