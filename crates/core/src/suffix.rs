//! Random suffix sources
//!
//! The six trailing digits of an identifier come from a [`SuffixSource`].
//! Sources are called from inside the generator's critical section, so they
//! must not block for long.

use std::sync::Mutex;

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};

use crate::error::{Result, SequenceError};

/// Smallest suffix value
pub const SUFFIX_MIN: u32 = 100_000;

/// Largest suffix value
pub const SUFFIX_MAX: u32 = 999_999;

/// Number of digits in a suffix
pub const SUFFIX_DIGITS: usize = 6;

const SUFFIX_SPAN: u32 = SUFFIX_MAX - SUFFIX_MIN + 1;

/// Produces values in `[SUFFIX_MIN, SUFFIX_MAX]`
pub trait SuffixSource: Send + Sync {
    /// Draw one suffix
    fn draw(&self) -> Result<u32>;
}

/// Thread-local RNG; never fails and never contends
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSuffix;

impl SuffixSource for ThreadRngSuffix {
    fn draw(&self) -> Result<u32> {
        Ok(rand::thread_rng().gen_range(SUFFIX_MIN..=SUFFIX_MAX))
    }
}

/// Operating system entropy; reports platform failures
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngSuffix;

impl SuffixSource for OsRngSuffix {
    fn draw(&self) -> Result<u32> {
        // Largest multiple of the span that fits in u32
        let zone = u32::MAX - (u32::MAX % SUFFIX_SPAN);
        let mut buf = [0u8; 4];
        loop {
            OsRng.try_fill_bytes(&mut buf)?;
            let raw = u32::from_le_bytes(buf);
            if raw < zone {
                return Ok(SUFFIX_MIN + raw % SUFFIX_SPAN);
            }
        }
    }
}

/// Deterministic sequence from a fixed seed
#[derive(Debug)]
pub struct SeededSuffix {
    rng: Mutex<StdRng>,
}

impl SeededSuffix {
    /// Create a source that replays the same draws for the same seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl SuffixSource for SeededSuffix {
    fn draw(&self) -> Result<u32> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| SequenceError::RandomSource("seeded rng lock poisoned".to_string()))?;
        Ok(rng.gen_range(SUFFIX_MIN..=SUFFIX_MAX))
    }
}

impl<S: SuffixSource + ?Sized> SuffixSource for std::sync::Arc<S> {
    fn draw(&self) -> Result<u32> {
        (**self).draw()
    }
}

/// Check a drawn value before it is rendered into an identifier
pub(crate) fn check_suffix(value: u32) -> Result<u32> {
    if (SUFFIX_MIN..=SUFFIX_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(SequenceError::RandomSource(format!(
            "suffix {value} outside [{SUFFIX_MIN}, {SUFFIX_MAX}]"
        )))
    }
}
