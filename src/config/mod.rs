//! Configuration management for the feed engine.
//!
//! Sources are layered with priority:
//! 1. Default values (hardcoded)
//! 2. Explicit config file
//! 3. `FEED_CONFIG_PATH` config file
//! 4. Environment variables (highest priority)

mod engine;
mod monitoring;
pub use engine::*;
pub use monitoring::*;


use std::env;

use config::{Config, Environment, File};
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FeedConfig {
    /// Engine channel capacities and loop behavior
    #[serde(default)]
    pub engine: EngineConfig,

    /// Metrics and monitoring settings
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl FeedConfig {
    /// Load configuration with the documented source priority.
    ///
    /// # Arguments
    /// * `config_path` - Optional path to an explicit config file
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        if let Ok(path) = env::var("FEED_CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&path));
        }

        // Environment variables (highest priority)
        builder = builder.add_source(
            Environment::with_prefix("FEED")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: FeedConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all subsystem configurations
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.monitoring.validate()?;
        Ok(())
    }
}
