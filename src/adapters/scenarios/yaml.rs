//! YAML scenario loading.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::InMemoryScenarioStore;
use crate::domain::foundation::ScenarioId;
use crate::domain::scenario::{Scenario, ScenarioError};
use crate::ports::ScenarioStore;

/// Errors that can occur while loading scenario files
#[derive(Debug, Error)]
pub enum ScenarioLoadError {
    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid scenario in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ScenarioError,
    },
}

/// Parses and validates a single scenario document.
pub fn parse_scenario(yaml: &str, origin: &Path) -> Result<Scenario, ScenarioLoadError> {
    let scenario: Scenario = serde_yaml::from_str(yaml).map_err(|e| ScenarioLoadError::Parse {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })?;
    scenario.validate().map_err(|source| ScenarioLoadError::Invalid {
        path: origin.to_path_buf(),
        source,
    })?;
    Ok(scenario)
}

/// Scenario catalog read from a directory of YAML files.
#[derive(Debug, Clone)]
pub struct YamlScenarioStore {
    inner: InMemoryScenarioStore,
}

impl YamlScenarioStore {
    /// Loads every `*.yaml` / `*.yml` file directly inside `dir`.
    ///
    /// Files are read in name order. Any unreadable, unparseable or invalid
    /// file fails the whole load.
    pub async fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ScenarioLoadError> {
        let dir = dir.as_ref();
        let io_err = |e: std::io::Error| ScenarioLoadError::Io {
            path: dir.to_path_buf(),
            message: e.to_string(),
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| ext == "yaml" || ext == "yml");
            if is_yaml {
                paths.push(path);
            }
        }
        paths.sort();

        let mut scenarios = Vec::with_capacity(paths.len());
        for path in paths {
            let yaml = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| ScenarioLoadError::Io {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            let scenario = parse_scenario(&yaml, &path)?;
            debug!(scenario_id = %scenario.id, path = %path.display(), "Loaded scenario");
            scenarios.push(scenario);
        }

        info!(dir = %dir.display(), count = scenarios.len(), "Scenario catalog loaded");
        Ok(Self {
            inner: InMemoryScenarioStore::new(scenarios),
        })
    }

    pub fn into_inner(self) -> InMemoryScenarioStore {
        self.inner
    }
}

#[async_trait]
impl ScenarioStore for YamlScenarioStore {
    async fn get(&self, id: &ScenarioId) -> Option<Arc<Scenario>> {
        self.inner.get(id).await
    }

    async fn list(&self) -> Vec<ScenarioId> {
        self.inner.list().await
    }
}
