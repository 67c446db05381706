//! Configuration loading.
//!
//! Values are resolved with the following priority (highest first):
//! 1. Environment variables
//! 2. JSON configuration file
//! 3. Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::application::InteractionConfig;

pub const TOAST_TIMEOUT_ENV: &str = "VETCHECK_TOAST_TIMEOUT_MS";
pub const COUNTER_DURATION_ENV: &str = "VETCHECK_COUNTER_DURATION_MS";

/// Defaults scaled for a terminal, where one page row is one line.
const TERMINAL_PRESET: &str = include_str!("../../assets/terminal_config.json");

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the configuration used by the terminal host.
    ///
    /// A missing file is not an error: the terminal preset is used instead.
    pub fn load(path: Option<&Path>) -> Result<InteractionConfig, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "loading configuration file");
                Self::from_file(path)?
            }
            _ => Self::terminal_preset()?,
        };
        Self::apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        Self::validate(&config)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<InteractionConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(json: &str) -> Result<InteractionConfig, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn terminal_preset() -> Result<InteractionConfig, ConfigError> {
        Self::parse(TERMINAL_PRESET)
    }

    /// Applies environment overrides through `lookup` so tests never touch the real environment.
    pub fn apply_overrides(
        config: &mut InteractionConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(TOAST_TIMEOUT_ENV) {
            config.toast_timeout_ms = parse_millis(TOAST_TIMEOUT_ENV, &value)?;
            debug!(value = config.toast_timeout_ms, "toast timeout from environment");
        }
        if let Some(value) = lookup(COUNTER_DURATION_ENV) {
            config.counter_duration_ms = parse_millis(COUNTER_DURATION_ENV, &value)?;
            debug!(value = config.counter_duration_ms, "counter duration from environment");
        }
        Ok(())
    }

    pub fn validate(config: &InteractionConfig) -> Result<(), ConfigError> {
        if config.tick_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tick_ms must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&config.visibility_threshold) {
            return Err(ConfigError::ValidationError(format!(
                "visibility_threshold must be within [0, 1], got {}",
                config.visibility_threshold
            )));
        }
        if config.toast_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "toast_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if config.visibility_bottom_margin < 0.0 || config.anchor_offset < 0.0 {
            return Err(ConfigError::ValidationError(
                "distances must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{key} must be a whole number of milliseconds, got '{value}'")))
}
