//! Generator configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, SequenceError};
use crate::timing::ClockZone;

/// Environment variable overriding the per-millisecond ceiling
pub const MAX_PER_MSEC_ENV: &str = "SEQGEN_MAX_PER_MSEC";

/// Environment variable selecting the timestamp zone (`local`, `utc`, `+08:00`)
pub const TIME_ZONE_ENV: &str = "SEQGEN_TIME_ZONE";

/// Default number of identifiers assumed per millisecond
pub const DEFAULT_MAX_PER_MSEC: u32 = 1000;

/// Sequence generator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Upper bound of the counter before it wraps back to zero
    pub max_per_msec: u32,
    /// Zone the timestamp prefix is rendered in
    pub zone: ClockZone,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            max_per_msec: DEFAULT_MAX_PER_MSEC,
            zone: ClockZone::Local,
        }
    }
}

impl SequenceConfig {
    /// Create a configuration with a custom ceiling
    pub fn with_max_per_msec(max_per_msec: u32) -> Self {
        Self {
            max_per_msec,
            ..Self::default()
        }
    }

    /// Render timestamps in `zone`
    pub fn with_zone(mut self, zone: ClockZone) -> Self {
        self.zone = zone;
        self
    }

    /// Load from `SEQGEN_MAX_PER_MSEC` and `SEQGEN_TIME_ZONE`; unset
    /// variables keep their defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = read_env(MAX_PER_MSEC_ENV)? {
            config.max_per_msec = raw.trim().parse::<u32>().map_err(|e| {
                SequenceError::InvalidConfig(format!("{MAX_PER_MSEC_ENV}={raw:?}: {e}"))
            })?;
        }
        if let Some(raw) = read_env(TIME_ZONE_ENV)? {
            config.zone = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the identifier layout cannot represent
    pub fn validate(&self) -> Result<()> {
        if self.max_per_msec == 0 {
            return Err(SequenceError::InvalidConfig(
                "max_per_msec must be >= 1".to_string(),
            ));
        }
        self.zone
            .validate()
            .map_err(|e| SequenceError::InvalidConfig(e.to_string()))
    }

    /// Width of the zero-padded counter segment
    pub fn counter_width(&self) -> usize {
        decimal_digits(u64::from(self.max_per_msec))
    }
}

fn read_env(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(raw) => Ok(Some(raw)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(SequenceError::InvalidConfig(format!("{name}: {e}"))),
    }
}

fn decimal_digits(mut value: u64) -> usize {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}
