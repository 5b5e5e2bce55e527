use core::fmt;

use crate::{config::ConfigError, generator::ClockMovedBackwards};

/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `driftflake` can emit.
///
/// Configuration problems are caught once, when a [`LayoutConfig`] is built.
/// The only call-time failure is a clock rollback observed by the strict
/// generator; the drifting generator absorbs rollback and never fails.
///
/// [`LayoutConfig`]: crate::LayoutConfig
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// The layout options were rejected at construction time.
    Config(ConfigError),

    /// The wall clock was observed behind the last committed tick.
    ClockMovedBackwards(ClockMovedBackwards),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid layout configuration: {e}"),
            Self::ClockMovedBackwards(e) => e.fmt(f),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::ClockMovedBackwards(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<ClockMovedBackwards> for Error {
    fn from(err: ClockMovedBackwards) -> Self {
        Self::ClockMovedBackwards(err)
    }
}
