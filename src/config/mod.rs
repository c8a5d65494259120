//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ROLEPLAY_TRAINER` prefix and nested values use double underscores as separators.
//! Every setting has a default, so an empty environment yields a working setup.
//!
//! # Example
//!
//! ```no_run
//! use roleplay_trainer::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Turn cost: {}s", config.simulation.turn_cost_secs);
//! ```

mod error;
mod logging;
mod scenarios;
mod simulation;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use scenarios::ScenarioSourceConfig;
pub use simulation::SimulationConfig;
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

use crate::application::SessionManagerConfig;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Engine tunables (turn cost, countdown, question injection)
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Progress persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Scenario catalog source
    #[serde(default)]
    pub scenarios: ScenarioSourceConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ROLEPLAY_TRAINER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ROLEPLAY_TRAINER__SIMULATION__TURN_COST_SECS=30` -> `simulation.turn_cost_secs = 30`
    /// - `ROLEPLAY_TRAINER__STORAGE__BACKEND=file` -> `storage.backend = file`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ROLEPLAY_TRAINER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.simulation.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Engine configuration derived from the simulation and storage sections
    pub fn session_manager_config(&self) -> SessionManagerConfig {
        self.simulation
            .session_manager_config(&self.storage.progress_key)
    }
}
