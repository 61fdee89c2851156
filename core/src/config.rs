//! Configuration for fq, read from the environment.
//!
//! There is no configuration file; the only knob is where to keep log files.

use std::path::PathBuf;

/// Environment variable naming a directory for daily-rolling log files.
pub const LOG_DIR_VAR: &str = "FQ_LOG_DIR";

/// Application configuration read from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Directory for log files; console-only logging when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FQ_LOG_DIR`: optional log directory (ignored when empty)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log_dir = lookup(LOG_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Self { log_dir }
    }
}
