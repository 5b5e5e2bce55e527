#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    IdCodec, LayoutConfig,
    generator::{
        ClockMovedBackwards, IdGenerator,
        mutex::{StateCell, lock, new_cell},
        state::{SequenceState, spin_until_after},
    },
    time::ClockSource,
};

/// The classic Snowflake algorithm.
///
/// Favors strict monotonicity over availability: when a tick runs out of
/// sequence values the call busy-waits for the next wall-clock tick, and when
/// the wall clock is behind the last committed tick the call fails with
/// [`ClockMovedBackwards`].
///
/// ## See Also
/// - [`DriftingGenerator`](crate::DriftingGenerator)
pub struct StrictGenerator<C>
where
    C: ClockSource,
{
    state: StateCell<SequenceState>,
    config: LayoutConfig,
    codec: IdCodec,
    clock: C,
}

impl<C> StrictGenerator<C>
where
    C: ClockSource,
{
    /// Creates a new [`StrictGenerator`] minting IDs for the worker in
    /// `config`, with ticks read from `clock`.
    pub fn new(config: LayoutConfig, clock: C) -> Self {
        Self {
            state: new_cell(SequenceState::new(config.min_seq())),
            codec: config.codec(),
            config,
            clock,
        }
    }

    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The tick the most recent ID was minted from.
    pub fn last_tick(&self) -> i64 {
        lock(&self.state).last_tick
    }

    /// Generates the next ID, waiting for the next tick if the current one is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`ClockMovedBackwards`] if the clock reads earlier than the
    /// last committed tick. The generator state is left untouched, so a later
    /// call resumes where the last successful one stopped.
    ///
    /// # Example
    /// ```
    /// use driftflake::{LayoutConfig, LayoutOptions, StrictGenerator, WallClock};
    ///
    /// let config = LayoutConfig::try_new(LayoutOptions::default()).unwrap();
    /// let generator = StrictGenerator::new(config, WallClock::from_config(&config));
    ///
    /// let id = loop {
    ///     match generator.try_next_id() {
    ///         Ok(id) => break id,
    ///         Err(e) => std::thread::sleep(std::time::Duration::from_millis(e.delta_millis as u64)),
    ///     }
    /// };
    /// assert_eq!(generator.config().codec().decode(id).worker_id, 0);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<i64, ClockMovedBackwards> {
        let mut state = lock(&self.state);
        let mut tick = self.clock.tick();

        if tick < state.last_tick {
            return Err(self.cold_clock_behind(tick, state.last_tick));
        }

        if tick == state.last_tick {
            state.current_seq += 1;
            if state.current_seq > self.config.max_seq() {
                tick = spin_until_after(&self.clock, state.last_tick);
                state.current_seq = self.config.min_seq();
            }
        } else {
            state.current_seq = self.config.min_seq();
        }

        state.last_tick = tick;
        Ok(self
            .codec
            .encode(tick, self.config.worker_id(), state.current_seq))
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, tick: i64, last_tick: i64) -> ClockMovedBackwards {
        let delta_millis = last_tick - tick;
        debug_assert!(delta_millis > 0);

        #[cfg(feature = "tracing")]
        tracing::warn!(
            worker_id = self.config.worker_id(),
            last_tick,
            tick,
            delta_millis,
            "clock moved backwards, refusing to mint"
        );

        ClockMovedBackwards { delta_millis }
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> SequenceState {
        *lock(&self.state)
    }
}

impl<C> IdGenerator for StrictGenerator<C>
where
    C: ClockSource,
{
    type Err = ClockMovedBackwards;

    fn config(&self) -> &LayoutConfig {
        self.config()
    }

    fn try_next_id(&self) -> Result<i64, Self::Err> {
        self.try_next_id()
    }
}
