//! Order number generation
//!
//! An identifier is `timestamp ++ counter ++ suffix`:
//!
//! ```text
//! 20240309070502042 0000 583127
//! yyyyMMddHHmmssSSS ctr  random
//! ```
//!
//! The timestamp is wall-clock time in the configured zone (host local time
//! by default). The counter segment is zero-padded to the digit count of the
//! configured ceiling, so the identifier length is fixed for a given
//! configuration. With the default ceiling of 1000 that is 4 counter digits
//! and 27 digits in total: counters 0 and 1000 both fit without sharing a
//! segment, one digit wider than a 3-digit `000..999` layout.
//!
//! The whole read-compose-commit sequence runs under one mutex, and the
//! counter is written only once everything has succeeded.

use std::fmt::{self, Display};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::config::SequenceConfig;
use crate::error::Result;
use crate::suffix::{check_suffix, SuffixSource, ThreadRngSuffix, SUFFIX_DIGITS};
use crate::timing::{Clock, SystemClock, TIMESTAMP_DIGITS};

/// Generated order number
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceNo(String);

impl SequenceNo {
    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the underlying string
    pub fn into_string(self) -> String {
        self.0
    }

    /// The `yyyyMMddHHmmssSSS` prefix
    pub fn timestamp_digits(&self) -> &str {
        self.0.get(..TIMESTAMP_DIGITS).unwrap_or(&self.0)
    }
}

impl Display for SequenceNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SequenceNo {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SequenceNo> for String {
    fn from(id: SequenceNo) -> Self {
        id.0
    }
}

/// Segments of an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceParts<'a> {
    pub timestamp: &'a str,
    pub counter: u64,
    pub suffix: u32,
}

/// Thread-safe order number generator
pub struct SequenceGenerator<C = SystemClock, R = ThreadRngSuffix> {
    config: SequenceConfig,
    counter_width: usize,
    counter: Mutex<u64>,
    clock: C,
    suffix: R,
}

impl SequenceGenerator {
    /// Default ceiling, system clock, thread-local RNG
    pub fn with_defaults() -> Self {
        let config = SequenceConfig::default();
        Self::build(config, SystemClock, ThreadRngSuffix)
    }

    /// System clock and thread-local RNG with a custom configuration
    pub fn from_config(config: SequenceConfig) -> Result<Self> {
        Self::new(config, SystemClock, ThreadRngSuffix)
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<C: Clock, R: SuffixSource> SequenceGenerator<C, R> {
    /// Create a generator; the counter starts at zero
    pub fn new(config: SequenceConfig, clock: C, suffix: R) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, clock, suffix))
    }

    fn build(config: SequenceConfig, clock: C, suffix: R) -> Self {
        let counter_width = config.counter_width();
        info!(
            "🔢 Sequence generator ready (max_per_msec={}, counter_width={}, zone={:?})",
            config.max_per_msec, counter_width, config.zone
        );
        Self {
            config,
            counter_width,
            counter: Mutex::new(0),
            clock,
            suffix,
        }
    }

    /// Start from an arbitrary counter value.
    ///
    /// A value above the ceiling is reset on the next call.
    pub fn with_counter(self, value: u64) -> Self {
        *self.counter.lock().unwrap_or_else(PoisonError::into_inner) = value;
        self
    }

    /// Generate the next order number.
    ///
    /// On error the counter is untouched, so the call can simply be retried.
    pub fn generate_sequence_no(&self) -> Result<SequenceNo> {
        // The counter is only written at the end, so a poisoned lock still
        // guards a consistent value.
        let mut counter = self.counter.lock().unwrap_or_else(PoisonError::into_inner);

        let composed = self.compose(*counter);
        match composed {
            Ok((id, used)) => {
                *counter = used + 1;
                trace!("generated {} (counter={})", id, used);
                Ok(id)
            }
            Err(e) => {
                warn!("sequence generation failed, counter kept at {}: {}", *counter, e);
                Err(e)
            }
        }
    }

    fn compose(&self, current: u64) -> Result<(SequenceNo, u64)> {
        let timestamp = self.clock.now().to_compact_digits(self.config.zone)?;

        let max = u64::from(self.config.max_per_msec);
        let used = if current > max {
            debug!("counter {} exceeded {}, wrapping to 0", current, max);
            0
        } else {
            current
        };

        let suffix = check_suffix(self.suffix.draw()?)?;

        let mut id = String::with_capacity(self.id_len());
        id.push_str(&timestamp);
        id.push_str(&format!("{:0width$}", used, width = self.counter_width));
        id.push_str(&suffix.to_string());
        Ok((SequenceNo(id), used))
    }

    /// Counter value the next call will start from
    pub fn counter(&self) -> u64 {
        *self.counter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configured per-millisecond ceiling
    pub fn max_per_msec(&self) -> u32 {
        self.config.max_per_msec
    }

    /// Digits in the counter segment
    pub fn counter_width(&self) -> usize {
        self.counter_width
    }

    /// Total identifier length
    pub fn id_len(&self) -> usize {
        TIMESTAMP_DIGITS + self.counter_width + SUFFIX_DIGITS
    }

    /// Split an identifier with this generator's layout
    pub fn decompose<'a>(&self, id: &'a str) -> Option<SequenceParts<'a>> {
        if id.len() != self.id_len() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let (timestamp, rest) = id.split_at(TIMESTAMP_DIGITS);
        let (counter, suffix) = rest.split_at(self.counter_width);
        Some(SequenceParts {
            timestamp,
            counter: counter.parse().ok()?,
            suffix: suffix.parse().ok()?,
        })
    }
}

impl<C, R> fmt::Debug for SequenceGenerator<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceGenerator")
            .field("config", &self.config)
            .field("counter_width", &self.counter_width)
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}
