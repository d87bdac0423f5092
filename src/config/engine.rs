//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{between_time_from_ms, DispatchError};

/// Environment variable holding the initial run flag (`true`/`false`/`1`/`0`).
pub const ENV_RUN_ENABLED: &str = "DISPATCH_RUN_ENABLED";
/// Environment variable holding the between time in milliseconds.
pub const ENV_BETWEEN_TIME_MS: &str = "DISPATCH_BETWEEN_TIME_MS";

/// Settings for one dispatch engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether the engine delivers items as soon as it is built.
    pub run_enabled: bool,
    /// Minimum spacing between handler calls, in milliseconds.
    pub between_time_ms: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            run_enabled: true,
            between_time_ms: 0,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration: enabled, unthrottled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial run flag.
    #[must_use]
    pub const fn with_run_enabled(mut self, run_enabled: bool) -> Self {
        self.run_enabled = run_enabled;
        self
    }

    /// Set the between time in milliseconds.
    #[must_use]
    pub const fn with_between_time_ms(mut self, between_time_ms: i64) -> Self {
        self.between_time_ms = between_time_ms;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.between_time_ms < 0 {
            return Err(format!(
                "between_time_ms must be non-negative, got {}",
                self.between_time_ms
            ));
        }
        Ok(())
    }

    /// The validated between time.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NegativeBetweenTime`] for a negative value.
    pub fn between_time(&self) -> Result<Duration, DispatchError> {
        between_time_from_ms(self.between_time_ms)
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read configuration from the process environment, loading a `.env`
    /// file first if one exists. Unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable that failed to parse, or the
    /// validation failure.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_RUN_ENABLED) {
            cfg.run_enabled = parse_flag(raw.trim())
                .ok_or_else(|| format!("{ENV_RUN_ENABLED}: expected a boolean, got `{raw}`"))?;
        }
        if let Some(raw) = lookup(ENV_BETWEEN_TIME_MS) {
            cfg.between_time_ms = raw
                .trim()
                .parse()
                .map_err(|e| format!("{ENV_BETWEEN_TIME_MS}: {e}"))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
