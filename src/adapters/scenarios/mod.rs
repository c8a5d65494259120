//! Scenario store adapters.
//!
//! - `InMemoryScenarioStore` - A fixed catalog held in memory
//! - `YamlScenarioStore` - Loads every `*.yaml` / `*.yml` file in a directory
//! - `builtin` - The catalog compiled into the binary

mod builtin;
mod in_memory;
mod yaml;

pub use builtin::{builtin_scenarios, builtin_store};
pub use in_memory::InMemoryScenarioStore;
pub use yaml::{ScenarioLoadError, YamlScenarioStore};
