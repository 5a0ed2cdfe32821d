//! # seqgen core
//!
//! Time-ordered, all-digit order numbers that stay unique under heavy
//! concurrent use within a single process.
//!
//! ## Layout
//!
//! 1. **Timestamp** - `yyyyMMddHHmmssSSS`, 17 digits, host local time by default
//! 2. **Counter** - zero-padded, wraps once it passes the per-millisecond ceiling
//! 3. **Suffix** - 6 random digits in `[100000, 999999]`
//!
//! The clock and the suffix source are injected, so tests can pin both and
//! assert exact output.

pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod suffix;
pub mod timing;

// Re-export commonly used items
pub use config::SequenceConfig;
pub use error::{Result, SequenceError};
pub use generator::{SequenceGenerator, SequenceNo, SequenceParts};
pub use logging::init_logging;
pub use suffix::{OsRngSuffix, SeededSuffix, SuffixSource, ThreadRngSuffix};
pub use timing::{Clock, ClockZone, ManualClock, SystemClock, Timestamp};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::SequenceConfig;
    pub use crate::error::{Result, SequenceError};
    pub use crate::generator::{SequenceGenerator, SequenceNo, SequenceParts};
    pub use crate::logging::{init_logging, init_logging_with, logging_installed, LogLevel};
    pub use crate::suffix::{
        OsRngSuffix, SeededSuffix, SuffixSource, ThreadRngSuffix, SUFFIX_DIGITS, SUFFIX_MAX,
        SUFFIX_MIN,
    };
    pub use crate::timing::{
        Clock, ClockZone, ManualClock, SystemClock, Timestamp, TIMESTAMP_DIGITS,
    };
}
