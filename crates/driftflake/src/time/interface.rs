use std::{rc::Rc, sync::Arc};

/// Default epoch: Wednesday, February 19, 2020 18:20:02 UTC
pub const DEFAULT_EPOCH_MILLIS: i64 = 1_582_136_402_000;

/// A source of ticks: milliseconds elapsed since a configured base epoch.
///
/// This abstraction lets the generators run against the real system clock or
/// a scripted clock in tests. Implementations only read time; they do not
/// need to be monotonic, because the generators handle a clock that steps
/// backward.
///
/// # Example
///
/// ```
/// use driftflake::ClockSource;
///
/// struct FixedClock;
/// impl ClockSource for FixedClock {
///     fn tick(&self) -> i64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedClock.tick(), 1234);
/// ```
pub trait ClockSource {
    /// Returns the current time in milliseconds since the base epoch.
    fn tick(&self) -> i64;
}

impl<C: ClockSource + ?Sized> ClockSource for &C {
    fn tick(&self) -> i64 {
        (**self).tick()
    }
}

impl<C: ClockSource + ?Sized> ClockSource for Box<C> {
    fn tick(&self) -> i64 {
        (**self).tick()
    }
}

impl<C: ClockSource + ?Sized> ClockSource for Rc<C> {
    fn tick(&self) -> i64 {
        (**self).tick()
    }
}

impl<C: ClockSource + ?Sized> ClockSource for Arc<C> {
    fn tick(&self) -> i64 {
        (**self).tick()
    }
}
