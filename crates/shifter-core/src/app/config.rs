//! DriverConfig - run settings with environment overrides

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_CONCURRENCY: &str = "SHIFTER_CONCURRENCY";
pub const ENV_PROGRESS_INTERVAL_MS: &str = "SHIFTER_PROGRESS_INTERVAL_MS";
pub const ENV_APPLY_TIMEOUT_MS: &str = "SHIFTER_APPLY_TIMEOUT_MS";

const DEFAULT_CONCURRENCY: usize = 1;
const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 5_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Settings for a `MigrationDriver`.
///
/// Deserializable so it can sit inside a larger application config; every
/// field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Batch size and fan-out limit used by `MigrationDriver::run`.
    pub concurrency: usize,
    /// How often the progress reporter logs the processed count.
    pub progress_interval_ms: u64,
    /// Per-task limit for `Migration::apply`. `None` waits forever.
    pub apply_timeout_ms: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
            apply_timeout_ms: None,
        }
    }
}

impl DriverConfig {
    /// Defaults overridden by `SHIFTER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_CONCURRENCY) {
            config.concurrency = parse(ENV_CONCURRENCY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PROGRESS_INTERVAL_MS) {
            config.progress_interval_ms = parse(ENV_PROGRESS_INTERVAL_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_APPLY_TIMEOUT_MS) {
            config.apply_timeout_ms = Some(parse(ENV_APPLY_TIMEOUT_MS, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Zero("concurrency"));
        }
        if self.progress_interval_ms == 0 {
            return Err(ConfigError::Zero("progress_interval_ms"));
        }
        if self.apply_timeout_ms == Some(0) {
            return Err(ConfigError::Zero("apply_timeout_ms"));
        }
        Ok(())
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sub-millisecond intervals round up to 1ms.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval_ms = millis_ceil(interval);
        self
    }

    /// Sub-millisecond timeouts round up to 1ms.
    pub fn with_apply_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.apply_timeout_ms = timeout.map(millis_ceil);
        self
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn apply_timeout(&self) -> Option<Duration> {
        self.apply_timeout_ms.map(Duration::from_millis)
    }
}

fn millis_ceil(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

fn parse<V>(key: &'static str, raw: &str) -> Result<V, ConfigError>
where
    V: std::str::FromStr,
    V::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: V::Err| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
