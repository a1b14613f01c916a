// SPDX-License-Identifier: Apache-2.0

//! Filter configuration
//!
//! JSON configuration file plus environment overrides. Values are pushed
//! into the settings registry, which stays the single source of truth at
//! runtime.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{FilterError, FilterResult};
use crate::policy::{
    Privilege, Settings, LEGACY_RELATION_SETTING, LEGACY_SCHEMA_SETTING, RELATIONS_SETTING,
};

/// Environment variable overriding the protected relation list
pub const RELATIONS_ENV: &str = "APPEND_ONLY_FILTER_RELATIONS";
/// Default configuration file name inside a data directory
pub const CONFIG_FILE_NAME: &str = "append_only_filter.json";

/// Logging options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
    /// Write to a daily rolling file in this directory instead of stderr
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Days to keep rolled log files
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
}

fn default_log_level() -> String {
    "append_only_filter=info".to_string()
}

fn default_retention_days() -> u64 {
    14
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            directory: None,
            retention_days: default_retention_days(),
        }
    }
}

/// Configuration for the append-only filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Comma-separated `schema.table` list
    #[serde(default)]
    pub append_only_relations: Option<String>,
    /// Single protected relation (legacy form)
    #[serde(default)]
    pub append_only_relation: Option<String>,
    /// Schema of the single protected relation (legacy form)
    #[serde(default)]
    pub append_only_relation_schema: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FilterConfig {
    /// Load configuration from file; a missing file yields the defaults
    pub fn load(path: &Path) -> FilterResult<Self> {
        if !path.exists() {
            debug!("No filter config file found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| FilterError::config(format!("Failed to read config: {}", e)))?;

        let config: FilterConfig = serde_json::from_str(&content)
            .map_err(|e| FilterError::config(format!("Failed to parse config: {}", e)))?;

        info!("Loaded filter configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> FilterResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FilterError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| FilterError::config(format!("Failed to write config: {}", e)))?;

        debug!("Saved filter configuration to {:?}", path);
        Ok(())
    }

    /// Override values from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(relations) = lookup(RELATIONS_ENV) {
            debug!("Protected relations overridden from {}", RELATIONS_ENV);
            self.append_only_relations = Some(relations);
        }
    }

    /// Push configured values into the settings registry
    pub fn apply_to(&self, settings: &Settings) -> FilterResult<()> {
        let pairs = [
            (RELATIONS_SETTING, &self.append_only_relations),
            (LEGACY_RELATION_SETTING, &self.append_only_relation),
            (LEGACY_SCHEMA_SETTING, &self.append_only_relation_schema),
        ];

        for (name, value) in pairs {
            match value {
                Some(value) => settings.set(name, value, Privilege::Superuser)?,
                None => settings.reset(name, Privilege::Superuser)?,
            }
        }
        Ok(())
    }
}
