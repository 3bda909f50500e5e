//! Configuration management for Warden
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (WARDEN_* prefix, highest precedence)
//! 2. warden.local.toml (gitignored, local overrides)
//! 3. warden.toml (git-tracked, project config)
//! 4. ~/.config/warden/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use warden::EngineConfig;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Warden configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub engine: EngineSettings,
    /// Values exposed to policy conditions under `env.*`.
    pub environment: Map<String, Value>,
    pub logging: LoggingConfig,
    pub state: StateConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub system_admin_permission: String,
    /// First business hour, UTC.
    pub business_hours_start: u32,
    /// Hour business ends (exclusive), UTC.
    pub business_hours_end: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            system_admin_permission: warden::DEFAULT_SYSTEM_ADMIN_PERMISSION.to_string(),
            business_hours_start: 9,
            business_hours_end: 17,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// JSON state snapshot used when the CLI is not given `--state`.
    pub snapshot: Option<PathBuf>,
}

impl WardenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Parse a single TOML document, without layering.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.system_admin_permission.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "engine.system_admin_permission must not be empty".to_string(),
            ));
        }

        let (start, end) = (self.engine.business_hours_start, self.engine.business_hours_end);
        if start >= end || end > 24 {
            return Err(ConfigError::Invalid(format!(
                "business hours must satisfy start < end <= 24, got {start}..{end}"
            )));
        }

        Ok(())
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        if let Some(snapshot) = &self.state.snapshot
            && snapshot.is_relative()
        {
            self.state.snapshot = Some(base_dir.as_ref().join(snapshot));
        }
    }

    /// Engine configuration derived from the `[engine]` and `[environment]` sections.
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default()
            .with_system_admin_permission(&self.engine.system_admin_permission)
            .with_business_hours(self.engine.business_hours_start, self.engine.business_hours_end);
        config.environment = self.environment.clone();
        config
    }
}
