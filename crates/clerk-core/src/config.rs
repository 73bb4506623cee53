//! Application configuration
//!
//! Settings come from three layers, applied in order: built-in defaults, an
//! optional YAML file, and `CLERK_*` environment variables.
//!
//! ```yaml
//! name: Reports
//! version: "2.1"
//! lock_dir: /var/lock/reports
//! datetime_format: "%H:%M:%S"
//! verbosity: verbose
//! ```

use std::env;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::context::DEFAULT_DATETIME_FORMAT;
use crate::errors::{ConsoleError, ConsoleResult};
use crate::output::Verbosity;

pub const ENV_APP_NAME: &str = "CLERK_APP_NAME";
pub const ENV_LOCK_DIR: &str = "CLERK_LOCK_DIR";
pub const ENV_DATETIME_FORMAT: &str = "CLERK_DATETIME_FORMAT";
pub const ENV_VERBOSITY: &str = "CLERK_VERBOSITY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub name: String,
    pub version: String,
    /// Directory for command lock files. Defaults to the system temp dir.
    pub lock_dir: Option<PathBuf>,
    pub datetime_format: String,
    pub verbosity: Verbosity,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            name: "Console App".to_string(),
            version: "1.0".to_string(),
            lock_dir: None,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            verbosity: Verbosity::Normal,
        }
    }
}

impl ConsoleConfig {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(content: &str) -> ConsoleResult<Self> {
        let config: ConsoleConfig = serde_yaml::from_str(content)
            .map_err(|e| ConsoleError::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConsoleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConsoleError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// Applies `CLERK_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> ConsoleResult<()> {
        self.apply_env_with(|key| env::var(key).ok())
    }

    pub fn apply_env_with<F>(&mut self, lookup: F) -> ConsoleResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_APP_NAME) {
            self.name = name;
        }
        if let Some(dir) = lookup(ENV_LOCK_DIR) {
            self.lock_dir = Some(PathBuf::from(dir));
        }
        if let Some(format) = lookup(ENV_DATETIME_FORMAT) {
            self.datetime_format = format;
        }
        if let Some(value) = lookup(ENV_VERBOSITY) {
            self.verbosity = Verbosity::parse(&value).ok_or_else(|| {
                ConsoleError::Config(format!("Invalid {} value: {}", ENV_VERBOSITY, value))
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConsoleError::Config(
                "Application name cannot be empty".to_string(),
            ));
        }
        if self.datetime_format.is_empty()
            || StrftimeItems::new(&self.datetime_format).any(|item| matches!(item, Item::Error))
        {
            return Err(ConsoleError::Config(format!(
                "Invalid datetime format: {}",
                self.datetime_format
            )));
        }
        Ok(())
    }
}
