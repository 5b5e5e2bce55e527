use crate::{LayoutConfig, config::RESERVED_SEQ_FLOOR};

/// Packs and unpacks the three logical fields of an ID for one layout.
///
/// The shifts and masks are derived once from a [`LayoutConfig`]; encoding
/// and decoding are then pure bit arithmetic.
///
/// # Example
///
/// ```
/// use driftflake::{LayoutConfig, LayoutOptions};
///
/// let config = LayoutConfig::try_new(LayoutOptions::default()).unwrap();
/// let codec = config.codec();
///
/// let id = codec.encode(1_000, 3, 7);
/// let decoded = codec.decode(id);
/// assert_eq!((decoded.tick, decoded.worker_id, decoded.seq), (1_000, 3, 7));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IdCodec {
    timestamp_shift: u8,
    seq_bits: u8,
    worker_mask: i64,
    seq_mask: i64,
    base_epoch_millis: i64,
}

impl IdCodec {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            timestamp_shift: config.timestamp_shift(),
            seq_bits: config.seq_bits(),
            worker_mask: (1 << config.worker_id_bits()) - 1,
            seq_mask: (1 << config.seq_bits()) - 1,
            base_epoch_millis: config.base_epoch_millis(),
        }
    }

    /// Packs `tick`, `worker_id` and `seq` into a single ID.
    ///
    /// Inputs are assumed to fit their fields; a validated [`LayoutConfig`]
    /// guarantees this for the worker ID and every sequence a generator
    /// emits.
    #[inline]
    pub const fn encode(&self, tick: i64, worker_id: u16, seq: u32) -> i64 {
        debug_assert!(tick < 1 << (63 - self.timestamp_shift), "tick overflows the sign bit");
        (tick << self.timestamp_shift) | ((worker_id as i64) << self.seq_bits) | seq as i64
    }

    /// Splits `id` back into its fields.
    #[inline]
    pub const fn decode(&self, id: i64) -> DecodedId {
        DecodedId {
            tick: id >> self.timestamp_shift,
            worker_id: ((id >> self.seq_bits) & self.worker_mask) as u16,
            seq: (id & self.seq_mask) as u32,
        }
    }

    /// Returns the Unix millisecond instant `id` was minted at.
    ///
    /// IDs minted while drifting ahead of the wall clock, or during a
    /// turn-back episode, report their committed tick rather than the true
    /// wall-clock time.
    pub const fn unix_millis(&self, id: i64) -> i64 {
        self.decode(id).unix_millis(self.base_epoch_millis)
    }
}

/// The logical fields of a decoded ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecodedId {
    /// Milliseconds since the base epoch.
    pub tick: i64,
    pub worker_id: u16,
    pub seq: u32,
}

impl DecodedId {
    /// Returns the Unix millisecond instant of this ID's tick.
    pub const fn unix_millis(&self, base_epoch_millis: i64) -> i64 {
        self.tick + base_epoch_millis
    }

    /// Whether this ID was minted during a clock rollback, i.e. its sequence
    /// holds a turn-back index (`1..=4`).
    pub const fn is_turn_back(&self) -> bool {
        self.seq > 0 && self.seq < RESERVED_SEQ_FLOOR
    }
}

impl From<DecodedId> for (i64, u16, u32) {
    fn from(id: DecodedId) -> Self {
        (id.tick, id.worker_id, id.seq)
    }
}

/// Splits `id` into `(tick, worker_id, seq)` using the layout of `config`.
pub fn decode(id: i64, config: &LayoutConfig) -> (i64, u16, u32) {
    config.codec().decode(id).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutOptions;

    const NOW: i64 = 1_760_000_000_000;
    const BASE: i64 = 1_654_920_000_000;

    fn config(worker_id_bits: u8, seq_bits: u8) -> LayoutConfig {
        LayoutConfig::try_new_at(
            LayoutOptions {
                base_epoch_millis: BASE,
                worker_id_bits,
                seq_bits,
                ..LayoutOptions::default()
            },
            NOW,
        )
        .unwrap()
    }

    #[test]
    fn fields_land_in_their_slots() {
        let codec = config(6, 6).codec();
        assert_eq!(codec.encode(0, 0, 5), 5);
        assert_eq!(codec.encode(0, 1, 0), 1 << 6);
        assert_eq!(codec.encode(1, 0, 0), 1 << 12);
        assert_eq!(codec.encode(2, 3, 4), (2 << 12) | (3 << 6) | 4);
    }

    #[test]
    fn decode_inverts_encode_at_field_extremes() {
        for (worker_id_bits, seq_bits) in [(1, 3), (6, 6), (10, 12), (15, 7), (1, 21)] {
            let config = config(worker_id_bits, seq_bits);
            let codec = config.codec();
            let max_tick = (1i64 << (63 - config.timestamp_shift())) - 1;
            let max_worker = config.max_worker_id();
            let max_seq = config.max_seq();

            for (tick, worker_id, seq) in [
                (0, 0, 0),
                (1, max_worker, max_seq),
                (max_tick, 0, max_seq),
                (max_tick, max_worker, 0),
                (123_456_789, max_worker / 2, max_seq / 2),
            ] {
                let id = codec.encode(tick, worker_id, seq);
                assert!(id >= 0, "sign bit stays clear");
                assert_eq!(decode(id, &config), (tick, worker_id, seq));
            }
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "tick overflows the sign bit")]
    fn encode_rejects_tick_past_field() {
        let config = config(6, 6);
        let codec = config.codec();
        codec.encode(1i64 << (63 - config.timestamp_shift()), 0, 5);
    }

    #[test]
    fn unix_millis_adds_the_base_epoch() {
        let config = config(6, 6);
        let codec = config.codec();
        let id = codec.encode(42, 1, 9);
        assert_eq!(codec.unix_millis(id), BASE + 42);
        assert_eq!(codec.decode(id).unix_millis(BASE), BASE + 42);
    }

    #[test]
    fn turn_back_sequences_are_flagged() {
        let codec = config(6, 6).codec();
        let flagged: Vec<u32> = (0..8)
            .filter(|&seq| codec.decode(codec.encode(10, 0, seq)).is_turn_back())
            .collect();
        assert_eq!(flagged, vec![1, 2, 3, 4]);
    }
}
