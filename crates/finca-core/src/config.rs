//! Runtime configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::GESTATION_DAYS;

/// Longest gestation accepted, in days.
pub const MAX_GESTATION_DAYS: i64 = 400;
/// Longest look-ahead or look-back window accepted, in days.
pub const MAX_WINDOW_DAYS: i64 = 3650;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the lifecycle services. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Database file. `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,
    pub gestation_days: i64,
    /// Days ahead covered by the upcoming calvings list.
    pub calving_window_days: i64,
    pub history_limit: u32,
    pub upcoming_treatments_limit: u32,
    /// Look-back for the service counters in reproduction statistics.
    pub statistics_window_days: i64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            gestation_days: GESTATION_DAYS,
            calving_window_days: 30,
            history_limit: 100,
            upcoming_treatments_limit: 20,
            statistics_window_days: 365,
        }
    }
}

impl CoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounded = [
            ("gestation_days", self.gestation_days, MAX_GESTATION_DAYS),
            ("calving_window_days", self.calving_window_days, MAX_WINDOW_DAYS),
            ("statistics_window_days", self.statistics_window_days, MAX_WINDOW_DAYS),
            ("history_limit", i64::from(self.history_limit), i64::MAX),
            (
                "upcoming_treatments_limit",
                i64::from(self.upcoming_treatments_limit),
                i64::MAX,
            ),
        ];
        for (name, value, max) in bounded {
            if value <= 0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
            if value > max {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be at most {max}, got {value}"
                )));
            }
        }
        Ok(())
    }
}
