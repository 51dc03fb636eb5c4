//! Runtime configuration for hosting layers.
//!
//! # Responsibility
//! - Resolve the persisted document location and logging settings.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - `validate` checks the log level whether or not file logging is on.

use crate::logging::{default_log_level, parse_level};
use std::path::PathBuf;

/// Default document file name, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data.json";

pub const ENV_DATA_PATH: &str = "ATTENDANCE_DATA_PATH";
pub const ENV_LOG_LEVEL: &str = "ATTENDANCE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ATTENDANCE_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceConfig {
    /// Location of the persisted JSON document.
    pub data_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Rolling log directory. File logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AttendanceConfig {
    /// Reads overrides from `ATTENDANCE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            data_path: read(ENV_DATA_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    /// Rejects settings that would only fail once logging starts.
    pub fn validate(&self) -> Result<(), String> {
        parse_level(&self.log_level).map(|_| ())
    }
}
