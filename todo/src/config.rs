//! Configuration management for the todo list.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default tracing filter when neither `TODOLIST_LOG` nor `RUST_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "todolist=info,todolist_runtime=info";

/// Default upper bound on title length, in characters
pub const DEFAULT_MAX_TITLE_LEN: usize = 500;

/// Default time the store gets to drain effects on exit, in seconds
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoConfig {
    /// Tracing filter directive (`TODOLIST_LOG`, falling back to `RUST_LOG`)
    pub log_filter: String,
    /// Longest accepted title, in characters (`TODOLIST_MAX_TITLE_LEN`)
    pub max_title_len: usize,
    /// Store shutdown timeout (`TODOLIST_SHUTDOWN_TIMEOUT_SECS`)
    pub shutdown_timeout: Duration,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            max_title_len: DEFAULT_MAX_TITLE_LEN,
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        }
    }
}

impl TodoConfig {
    /// Load configuration from the process environment
    ///
    /// Missing or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            log_filter: lookup("TODOLIST_LOG")
                .or_else(|| lookup("RUST_LOG"))
                .filter(|filter| !filter.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            max_title_len: lookup("TODOLIST_MAX_TITLE_LEN")
                .and_then(|s| s.trim().parse().ok())
                .filter(|len| *len > 0)
                .unwrap_or(defaults.max_title_len),
            shutdown_timeout: lookup("TODOLIST_SHUTDOWN_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .map_or(defaults.shutdown_timeout, Duration::from_secs),
        }
    }
}
