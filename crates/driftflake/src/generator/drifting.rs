use core::convert::Infallible;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    IdCodec, LayoutConfig,
    generator::{
        IdGenerator,
        mutex::{StateCell, lock, new_cell},
        state::{SequenceState, spin_until_after},
    },
    time::ClockSource,
};

/// A Snowflake generator that never blocks on the hot path and never fails.
///
/// Two situations make a classic Snowflake generator wait or error out; this
/// one absorbs both:
///
/// - **Sequence exhaustion.** When a tick runs out of sequence values, the
///   generator commits to the next tick immediately ("drifts" ahead of the
///   wall clock) instead of sleeping. It keeps drifting until the wall clock
///   catches up, or until it has drifted
///   [`max_drift_count`](LayoutConfig::max_drift_count) ticks in a row, at
///   which point it waits once for real time to pass the committed tick.
/// - **Clock rollback.** When the wall clock is behind the last committed
///   tick, the generator mints IDs from ticks just below it, walking
///   downwards, with a turn-back index (`1..=4`) in place of the sequence.
///   Normal sequences start at [`min_seq`](LayoutConfig::min_seq) `>= 5`, so
///   the two never collide.
///
/// IDs are strictly increasing while the wall clock never steps backwards.
/// IDs minted during a rollback are unique but do not sort after earlier IDs.
///
/// The state sits behind a single mutex, so the generator can be shared
/// across threads (wrap it in an [`Arc`](std::sync::Arc)).
///
/// ## See Also
/// - [`StrictGenerator`](crate::StrictGenerator)
pub struct DriftingGenerator<C>
where
    C: ClockSource,
{
    state: StateCell<SequenceState>,
    config: LayoutConfig,
    codec: IdCodec,
    clock: C,
}

impl<C> DriftingGenerator<C>
where
    C: ClockSource,
{
    /// Creates a new [`DriftingGenerator`] minting IDs for the worker in
    /// `config`, with ticks read from `clock`.
    ///
    /// # Example
    /// ```
    /// use driftflake::{DriftingGenerator, LayoutConfig, LayoutOptions, WallClock};
    ///
    /// let config = LayoutConfig::try_new(LayoutOptions::default()).unwrap();
    /// let generator = DriftingGenerator::new(config, WallClock::from_config(&config));
    ///
    /// let a = generator.next_id();
    /// let b = generator.next_id();
    /// assert!(a < b);
    /// ```
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

    /// The tick the most recent ID was minted from (outside turn-back
    /// episodes). Runs ahead of the wall clock while drifting.
    pub fn last_tick(&self) -> i64 {
        lock(&self.state).last_tick
    }

    /// Generates the next ID.
    ///
    /// Never blocks except for the bounded wait after
    /// [`max_drift_count`](LayoutConfig::max_drift_count) consecutive drifted
    /// ticks, and never fails.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> i64 {
        let mut state = lock(&self.state);
        if state.is_over_cost {
            self.next_over_cost_id(&mut state)
        } else {
            self.next_normal_id(&mut state)
        }
    }

    fn next_normal_id(&self, state: &mut SequenceState) -> i64 {
        let tick = self.clock.tick();
        if tick < state.last_tick {
            return self.cold_turn_back_id(state, tick);
        }

        if state.turn_back_tick > 0 {
            #[cfg(feature = "tracing")]
            tracing::info!(
                worker_id = self.config.worker_id(),
                turn_back_index = state.turn_back_index,
                tick,
                "clock caught up, turn-back episode ended"
            );
            state.turn_back_tick = 0;
        }

        if tick > state.last_tick {
            state.rollover_to(tick, self.config.min_seq());
            return self.mint(state);
        }

        if state.current_seq > self.config.max_seq() {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                worker_id = self.config.worker_id(),
                tick,
                "sequence exhausted, drifting ahead of the wall clock"
            );
            state.rollover_to(state.last_tick + 1, self.config.min_seq());
            state.is_over_cost = true;
            state.over_cost_count_in_term = 1;
        }

        self.mint(state)
    }

    fn next_over_cost_id(&self, state: &mut SequenceState) -> i64 {
        let tick = self.clock.tick();

        if tick > state.last_tick {
            self.log_over_cost_end(state, tick);
            state.rollover_to(tick, self.config.min_seq());
            state.end_over_cost();
            return self.mint(state);
        }

        if state.over_cost_count_in_term >= self.config.max_drift_count() {
            self.log_over_cost_end(state, tick);
            let tick = spin_until_after(&self.clock, state.last_tick);
            state.rollover_to(tick, self.config.min_seq());
            state.end_over_cost();
            return self.mint(state);
        }

        if state.current_seq > self.config.max_seq() {
            state.rollover_to(state.last_tick + 1, self.config.min_seq());
            state.over_cost_count_in_term += 1;
        }

        self.mint(state)
    }

    #[cold]
    #[inline(never)]
    fn cold_turn_back_id(&self, state: &mut SequenceState, _tick: i64) -> i64 {
        if state.turn_back_tick < 1 {
            state.turn_back_tick = state.last_tick - 1;
            state.advance_turn_back_index();

            #[cfg(feature = "tracing")]
            tracing::warn!(
                worker_id = self.config.worker_id(),
                last_tick = state.last_tick,
                tick = _tick,
                turn_back_index = state.turn_back_index,
                "clock moved backwards, minting turn-back ids"
            );
        }

        let id = self.codec.encode(
            state.turn_back_tick,
            self.config.worker_id(),
            u32::from(state.turn_back_index),
        );
        state.turn_back_tick -= 1;
        id
    }

    #[inline]
    fn mint(&self, state: &mut SequenceState) -> i64 {
        let id = self
            .codec
            .encode(state.last_tick, self.config.worker_id(), state.current_seq);
        state.current_seq += 1;
        id
    }

    #[inline]
    fn log_over_cost_end(&self, _state: &SequenceState, _tick: i64) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            worker_id = self.config.worker_id(),
            last_tick = _state.last_tick,
            tick = _tick,
            drifted_ticks = _state.over_cost_count_in_term,
            "over-cost term ended"
        );
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> SequenceState {
        *lock(&self.state)
    }
}

impl<C> IdGenerator for DriftingGenerator<C>
where
    C: ClockSource,
{
    type Err = Infallible;

    fn config(&self) -> &LayoutConfig {
        self.config()
    }

    fn try_next_id(&self) -> Result<i64, Self::Err> {
        Ok(self.next_id())
    }
}
