use crate::time::ClockSource;

/// Number of turn-back episodes that can overlap before indices are reused.
/// Turn-back IDs carry the index `1..=MAX_TURN_BACK_INDEX` in their sequence
/// field.
pub const MAX_TURN_BACK_INDEX: u8 = 4;

/// Mutable bookkeeping of one generator, only touched under its lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SequenceState {
    /// Last tick an ID was minted from. May run ahead of the wall clock
    /// while over cost.
    pub(crate) last_tick: i64,
    /// Next sequence value to hand out within `last_tick`.
    pub(crate) current_seq: u32,
    pub(crate) is_over_cost: bool,
    /// Ticks drifted ahead in the current over-cost term.
    pub(crate) over_cost_count_in_term: u32,
    /// Next tick to mint a turn-back ID from; `< 1` when no episode is
    /// running.
    pub(crate) turn_back_tick: i64,
    /// Index of the current turn-back episode, `0` until the first one.
    pub(crate) turn_back_index: u8,
}

impl SequenceState {
    pub(crate) fn new(min_seq: u32) -> Self {
        Self {
            current_seq: min_seq,
            ..Self::default()
        }
    }

    /// Moves to a later tick and restarts the sequence.
    #[inline]
    pub(crate) fn rollover_to(&mut self, tick: i64, min_seq: u32) {
        self.last_tick = tick;
        self.current_seq = min_seq;
    }

    /// Leaves over-cost mode and resets the term counter.
    #[inline]
    pub(crate) fn end_over_cost(&mut self) {
        self.is_over_cost = false;
        self.over_cost_count_in_term = 0;
    }

    /// Advances to the next turn-back index, cycling `1 -> 2 -> 3 -> 4 -> 1`.
    /// Index `0` is never produced.
    pub(crate) fn advance_turn_back_index(&mut self) -> u8 {
        self.turn_back_index = if self.turn_back_index >= MAX_TURN_BACK_INDEX {
            1
        } else {
            self.turn_back_index + 1
        };
        self.turn_back_index
    }
}

/// Busy-polls `clock` until it reports a tick later than `last_tick`, and
/// returns that tick.
pub(crate) fn spin_until_after<C: ClockSource>(clock: &C, last_tick: i64) -> i64 {
    let mut tick = clock.tick();
    while tick <= last_tick {
        core::hint::spin_loop();
        tick = clock.tick();
    }
    tick
}
