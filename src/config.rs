//! Environment-backed configuration.
//!
//! All settings come from environment variables (a `.env` file is loaded by
//! the binary before this runs). Only the extraction endpoint is required.

use std::time::Duration;

use crate::error::ConfigError;
use crate::payload::PayloadStrategy;

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the deployed extraction service.
    pub endpoint: String,
    /// Bearer token for the service, when it requires one.
    pub api_key: Option<String>,
    /// Whole-request timeout applied to the HTTP client.
    pub request_timeout: Duration,
    /// Payload strategy, fixed per deployment.
    pub payload_strategy: PayloadStrategy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, so tests never touch process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint = lookup("TABULIFT_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("TABULIFT_ENDPOINT".to_string()))?;

        let api_key = lookup("TABULIFT_API_KEY").filter(|v| !v.is_empty());

        let request_timeout = match lookup("TABULIFT_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "TABULIFT_TIMEOUT_SECS".to_string(),
                    message: format!("'{raw}' is not a whole number of seconds"),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let payload_strategy = match lookup("TABULIFT_PAYLOAD") {
            Some(raw) => raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "TABULIFT_PAYLOAD".to_string(),
                message,
            })?,
            None => PayloadStrategy::default(),
        };

        Ok(Self {
            endpoint,
            api_key,
            request_timeout,
            payload_strategy,
        })
    }
}
