//! Wall-clock readings for identifier timestamps
//!
//! Readings are kept at millisecond resolution, which is the finest field
//! the `yyyyMMddHHmmssSSS` prefix carries. They are rendered in a
//! [`ClockZone`], the host's local time unless configured otherwise. The
//! clock is a trait so tests can freeze or step time.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Datelike, FixedOffset, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SequenceError};

/// Number of digits in a rendered timestamp
pub const TIMESTAMP_DIGITS: usize = 17;

const COMPACT_FORMAT: &str = "%Y%m%d%H%M%S%3f";

/// Millisecond-precision wall-clock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Milliseconds since Unix epoch
    pub millis: i64,
}

impl Timestamp {
    /// Create a timestamp from milliseconds since Unix epoch
    pub fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    /// Create a timestamp from the current time
    pub fn now() -> Self {
        Self {
            millis: system_millis(),
        }
    }

    /// Convert to chrono DateTime<Utc>
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.millis).ok_or_else(|| {
            SequenceError::ClockFormat(format!(
                "{} ms since epoch is not a representable date",
                self.millis
            ))
        })
    }

    /// Render as `yyyyMMddHHmmssSSS` (17 digits) in `zone`
    pub fn to_compact_digits(&self, zone: ClockZone) -> Result<String> {
        let utc = self.to_datetime()?;
        match zone {
            ClockZone::Local => render_compact(utc.with_timezone(&Local)),
            ClockZone::Utc => render_compact(utc),
            ClockZone::Offset(seconds) => render_compact(utc.with_timezone(&zone_offset(seconds)?)),
        }
    }
}

fn render_compact<Tz: TimeZone>(dt: DateTime<Tz>) -> Result<String>
where
    Tz::Offset: fmt::Display,
{
    // %Y pads or signs years outside this range
    if !(1000..=9999).contains(&dt.year()) {
        return Err(SequenceError::ClockFormat(format!(
            "year {} does not fit a 4-digit field",
            dt.year()
        )));
    }

    let digits = dt.format(COMPACT_FORMAT).to_string();
    if digits.len() != TIMESTAMP_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SequenceError::ClockFormat(format!(
            "unexpected timestamp rendering {digits:?}"
        )));
    }
    Ok(digits)
}

fn zone_offset(seconds: i32) -> Result<FixedOffset> {
    FixedOffset::east_opt(seconds).ok_or_else(|| {
        SequenceError::ClockFormat(format!("utc offset {seconds}s out of range"))
    })
}

/// Time zone the timestamp prefix is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockZone {
    /// Host local time; repeats an hour when daylight saving ends
    #[default]
    Local,
    Utc,
    /// Fixed offset east of UTC, in seconds
    Offset(i32),
}

impl ClockZone {
    /// Check that the zone can render a reading
    pub fn validate(&self) -> Result<()> {
        if let ClockZone::Offset(seconds) = *self {
            zone_offset(seconds)?;
        }
        Ok(())
    }
}

impl FromStr for ClockZone {
    type Err = SequenceError;

    /// Accepts `local`, `utc` or an offset such as `+08:00` / `-05:30`
    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("local") {
            return Ok(ClockZone::Local);
        }
        if raw.eq_ignore_ascii_case("utc") || raw == "Z" {
            return Ok(ClockZone::Utc);
        }

        let offset = raw
            .parse::<FixedOffset>()
            .map_err(|e| SequenceError::InvalidConfig(format!("time zone {raw:?}: {e}")))?;
        Ok(ClockZone::Offset(offset.local_minus_utc()))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            millis: dt.timestamp_millis(),
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Ok(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.3f UTC")),
            Err(_) => write!(f, "{}ms", self.millis),
        }
    }
}

/// System time in milliseconds since Unix epoch
#[inline]
pub fn system_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Source of wall-clock readings
pub trait Clock: Send + Sync {
    /// Current reading
    fn now(&self) -> Timestamp;
}

/// Clock backed by the system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Freeze the clock at `at`
    pub fn new(at: Timestamp) -> Self {
        Self {
            millis: AtomicI64::new(at.millis),
        }
    }

    /// Move the clock to `at`
    pub fn set(&self, at: Timestamp) {
        self.millis.store(at.millis, Ordering::SeqCst);
    }

    /// Step the clock forward
    pub fn advance_millis(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
