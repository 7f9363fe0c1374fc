//! Configuration loading and representation.

use std::time::Duration as StdDuration;

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

use stockhold_inventory::DEFAULT_RESERVATION_TTL_MINUTES;

pub const RESERVATION_TTL_ENV: &str = "STOCKHOLD_RESERVATION_TTL_SECS";
pub const SWEEP_INTERVAL_ENV: &str = "STOCKHOLD_SWEEP_INTERVAL_MS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),

    #[error("{0} is out of range")]
    OutOfRange(&'static str),
}

/// Reservation engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationConfig {
    /// How long a reservation holds stock before it becomes eligible for expiry.
    pub ttl: Duration,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(DEFAULT_RESERVATION_TTL_MINUTES),
        }
    }
}

impl ReservationConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Expiry sweeper settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweeperConfig {
    /// Delay between sweeps.
    pub interval: StdDuration,
    /// Thread name, also used in logs.
    pub name: String,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: StdDuration::from_secs(30),
            name: "expiry-sweeper".to_string(),
        }
    }
}

impl SweeperConfig {
    pub fn with_interval(mut self, interval: StdDuration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Process-level settings, assembled from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockholdConfig {
    pub reservation: ReservationConfig,
    pub sweeper: SweeperConfig,
}

impl StockholdConfig {
    /// Read overrides from `STOCKHOLD_*` environment variables.
    ///
    /// Unset or unparsable values fall back to defaults (with a warning);
    /// explicit zeroes are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_u64(&lookup, RESERVATION_TTL_ENV) {
            if secs == 0 {
                return Err(ConfigError::NonPositive(RESERVATION_TTL_ENV));
            }
            config.reservation.ttl = i64::try_from(secs)
                .ok()
                .and_then(Duration::try_seconds)
                .ok_or(ConfigError::OutOfRange(RESERVATION_TTL_ENV))?;
        }

        if let Some(ms) = parse_u64(&lookup, SWEEP_INTERVAL_ENV) {
            if ms == 0 {
                return Err(ConfigError::NonPositive(SWEEP_INTERVAL_ENV));
            }
            config.sweeper.interval = StdDuration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_u64<F>(lookup: &F, key: &'static str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "ignoring unparsable setting; using default");
            None
        }
    }
}
