//! Snowflake-style 64-bit unique IDs for distributed systems.
//!
//! Each ID packs a millisecond tick (relative to a configurable base epoch),
//! a worker ID and a per-tick sequence. Workers mint IDs independently; the
//! only coordination needed is that every running generator gets its own
//! worker ID.
//!
//! Two algorithms are provided:
//!
//! - [`DriftingGenerator`] never blocks and never fails. It drifts ahead of
//!   the wall clock when a tick's sequence is exhausted, and mints from
//!   reserved turn-back sequences when the clock moves backwards.
//! - [`StrictGenerator`] is the classic algorithm: it waits for the next tick
//!   on exhaustion and returns [`ClockMovedBackwards`] on rollback.
//!
//! ```
//! use driftflake::{DriftingGenerator, LayoutConfig, LayoutOptions, WallClock, decode};
//!
//! let config = LayoutConfig::try_new(LayoutOptions {
//!     worker_id: 1,
//!     ..LayoutOptions::default()
//! })
//! .unwrap();
//! let generator = DriftingGenerator::new(config, WallClock::from_config(&config));
//!
//! let id = generator.next_id();
//! let (_tick, worker_id, seq) = decode(id, &config);
//! assert_eq!(worker_id, 1);
//! assert!(seq >= config.min_seq());
//! ```

mod codec;
mod config;
mod error;
mod generator;
mod time;

pub use crate::codec::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::time::*;
