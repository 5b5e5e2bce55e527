use core::time::Duration;

#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
use web_time::{SystemTime, UNIX_EPOCH};

use crate::{LayoutConfig, time::ClockSource, time::DEFAULT_EPOCH_MILLIS};

/// Returns the current wall-clock time in Unix milliseconds.
///
/// Times before 1970 come back negative rather than failing.
pub fn unix_millis_now() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => saturating_millis(elapsed),
        Err(e) => -saturating_millis(e.duration()),
    }
}

fn saturating_millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

/// A wall-clock time source anchored at a base epoch.
///
/// Every call reads `SystemTime::now()`, so the tick follows NTP steps and
/// manual clock changes in both directions. Backward steps are expected: the
/// drifting generator compensates for them and the strict generator reports
/// them.
///
/// # Example
///
/// ```
/// use driftflake::{ClockSource, WallClock, unix_millis_now};
///
/// let clock = WallClock::with_epoch(unix_millis_now() - 1_000);
/// assert!(clock.tick() >= 1_000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WallClock {
    base_epoch_millis: i64,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`DEFAULT_EPOCH_MILLIS`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH_MILLIS)
    }
}

impl WallClock {
    /// Constructs a wall clock whose tick zero is `base_epoch_millis` (Unix
    /// milliseconds).
    pub const fn with_epoch(base_epoch_millis: i64) -> Self {
        Self { base_epoch_millis }
    }

    /// Constructs a wall clock using the base epoch of `config`.
    pub const fn from_config(config: &LayoutConfig) -> Self {
        Self::with_epoch(config.base_epoch_millis())
    }

    pub const fn base_epoch_millis(&self) -> i64 {
        self.base_epoch_millis
    }
}

impl ClockSource for WallClock {
    fn tick(&self) -> i64 {
        unix_millis_now() - self.base_epoch_millis
    }
}
