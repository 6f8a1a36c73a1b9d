//! Judge timing and retry configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Tunable timing and retry parameters for a match.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Seconds to wait for the readiness handshake.
    #[serde(default = "default_startup_timeout_secs")]
    startup_timeout_secs: u64,

    /// Seconds to wait on each reply read before counting the attempt as silent.
    #[serde(default = "default_reply_timeout_secs")]
    reply_timeout_secs: u64,

    /// Seconds a bot gets to exit after the shutdown notice before it is killed.
    #[serde(default = "default_shutdown_grace_secs")]
    shutdown_grace_secs: u64,

    /// Read attempts per requested move.
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,

    /// Milliseconds slept between read attempts.
    #[serde(default = "default_retry_delay_ms")]
    retry_delay_ms: u64,
}

fn default_startup_timeout_secs() -> u64 {
    5
}

fn default_reply_timeout_secs() -> u64 {
    10
}

fn default_shutdown_grace_secs() -> u64 {
    2
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl JudgeConfig {
    /// Creates a configuration with explicit values.
    pub fn new(
        startup_timeout_secs: u64,
        reply_timeout_secs: u64,
        shutdown_grace_secs: u64,
        max_attempts: u32,
        retry_delay_ms: u64,
    ) -> Self {
        Self {
            startup_timeout_secs,
            reply_timeout_secs,
            shutdown_grace_secs,
            max_attempts,
            retry_delay_ms,
        }
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading judge config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(?config, "Judge config loaded");
        Ok(config)
    }

    /// Handshake deadline.
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    /// Per-attempt reply deadline.
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }

    /// Grace period between the shutdown notice and a forced kill.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Sleep between read attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            startup_timeout_secs: default_startup_timeout_secs(),
            reply_timeout_secs: default_reply_timeout_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
