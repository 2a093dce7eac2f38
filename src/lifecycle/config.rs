//! File configuration.
//!
//! ```toml
//! [take]
//! retry_interval_ms = 250
//! initial_poll_delay_ms = 1000
//!
//! [venue]
//! processing_rounds = 2
//! push_decisions = true
//! ```
//!
//! Every section and field is optional.

use crate::lifecycle::venue::VenueScript;
use crate::taker::{TakeOptions, DEFAULT_INITIAL_POLL_DELAY, DEFAULT_RETRY_INTERVAL};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Pacing of take operations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TakeSection {
    pub retry_interval_ms: u64,
    pub initial_poll_delay_ms: u64,
}

impl Default for TakeSection {
    fn default() -> Self {
        Self {
            retry_interval_ms: DEFAULT_RETRY_INTERVAL.as_millis() as u64,
            initial_poll_delay_ms: DEFAULT_INITIAL_POLL_DELAY.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TakerConfig {
    pub take: TakeSection,
    pub venue: VenueScript,
}

impl TakerConfig {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    pub fn take_options(&self) -> TakeOptions {
        TakeOptions::default()
            .with_retry_interval(Duration::from_millis(self.take.retry_interval_ms))
            .with_initial_poll_delay(Duration::from_millis(self.take.initial_poll_delay_ms))
    }
}
