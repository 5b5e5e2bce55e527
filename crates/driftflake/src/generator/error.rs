use core::fmt;

/// The wall clock was observed behind the last committed tick.
///
/// Only the [`StrictGenerator`] reports this. The condition is transient by
/// nature: retrying after `delta_millis` has elapsed is the only sensible
/// recovery.
///
/// [`StrictGenerator`]: crate::StrictGenerator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClockMovedBackwards {
    /// How far behind the last committed tick the clock was, in milliseconds.
    pub delta_millis: i64,
}

impl fmt::Display for ClockMovedBackwards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "clock moved backwards by {} milliseconds",
            self.delta_millis
        )
    }
}

impl core::error::Error for ClockMovedBackwards {}
