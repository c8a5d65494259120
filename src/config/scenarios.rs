//! Scenario catalog configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Where scenario definitions come from
///
/// The built-in scenarios are always available; a configured directory adds
/// to them, and a file defining a built-in id replaces it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScenarioSourceConfig {
    /// Directory of `*.yaml` scenario files
    pub dir: Option<PathBuf>,
}
