use core::fmt;

use crate::{codec::IdCodec, time::DEFAULT_EPOCH_MILLIS, time::unix_millis_now};

/// Smallest allowed width of the worker ID field.
pub const MIN_WORKER_ID_BITS: u8 = 1;

/// Largest allowed width of the worker ID field.
pub const MAX_WORKER_ID_BITS: u8 = 15;

/// Smallest allowed width of the sequence field.
pub const MIN_SEQ_BITS: u8 = 3;

/// Largest allowed width of the sequence field.
pub const MAX_SEQ_BITS: u8 = 21;

/// Upper bound on `worker_id_bits + seq_bits`. The remaining 41 bits (below
/// the sign bit) hold the tick.
pub const MAX_LAYOUT_BITS: u8 = 22;

/// Lowest sequence value a normal ID may carry. Sequence values `0..=4` are
/// reserved: `0` marks a manual reseed and `1..=4` mark turn-back episodes.
pub const RESERVED_SEQ_FLOOR: u32 = 5;

/// Default bound on consecutive over-cost ticks.
pub const DEFAULT_MAX_DRIFT_COUNT: u32 = 2000;

/// Selects which generator [`AnyGenerator`] builds.
///
/// [`AnyGenerator`]: crate::AnyGenerator
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeneratorMethod {
    /// Absorb sequence exhaustion and clock rollback without blocking or
    /// failing. See [`DriftingGenerator`](crate::DriftingGenerator).
    #[default]
    Drifting,
    /// Classic Snowflake: wait out sequence exhaustion and fail on clock
    /// rollback. See [`StrictGenerator`](crate::StrictGenerator).
    Strict,
}

impl fmt::Display for GeneratorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drifting => f.write_str("drifting"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// Raw, unvalidated layout options.
///
/// Every field has a sensible default, so callers typically override only
/// what they need:
///
/// ```
/// use driftflake::{LayoutConfig, LayoutOptions};
///
/// let config = LayoutConfig::try_new(LayoutOptions {
///     worker_id: 3,
///     ..LayoutOptions::default()
/// })
/// .unwrap();
/// assert_eq!(config.worker_id(), 3);
/// assert_eq!(config.max_seq(), 63);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutOptions {
    /// Origin of the tick field, in Unix milliseconds.
    pub base_epoch_millis: i64,
    /// Externally assigned identifier of this generator instance.
    pub worker_id: u16,
    /// Width of the worker ID field (1..=15).
    pub worker_id_bits: u8,
    /// Width of the sequence field (3..=21).
    pub seq_bits: u8,
    /// Largest sequence value per tick; `0` means `2^seq_bits - 1`.
    pub max_seq: u32,
    /// First sequence value of every tick (at least 5).
    pub min_seq: u32,
    /// Consecutive over-cost ticks allowed before waiting for the wall clock.
    pub max_drift_count: u32,
    /// Generator built by [`AnyGenerator::new`](crate::AnyGenerator::new).
    pub method: GeneratorMethod,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            base_epoch_millis: DEFAULT_EPOCH_MILLIS,
            worker_id: 0,
            worker_id_bits: 6,
            seq_bits: 6,
            max_seq: 0,
            min_seq: RESERVED_SEQ_FLOOR,
            max_drift_count: DEFAULT_MAX_DRIFT_COUNT,
            method: GeneratorMethod::Drifting,
        }
    }
}

/// A validated, immutable bit layout and timing configuration.
///
/// Built once per worker via [`LayoutConfig::try_new`]; every invariant is
/// checked there so generators never have to re-check at call time.
///
/// ```text
///  Bit Index:  63           62                    w+s  w+s-1          s  s-1         0
///              +--------------+----------------------+-----------------+-------------+
///  Field:      | reserved (1) | tick (63 - w - s)    | worker ID (w)   | sequence (s)|
///              +--------------+----------------------+-----------------+-------------+
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutConfig {
    base_epoch_millis: i64,
    worker_id: u16,
    worker_id_bits: u8,
    seq_bits: u8,
    max_seq: u32,
    min_seq: u32,
    max_drift_count: u32,
    method: GeneratorMethod,
}

impl LayoutConfig {
    /// Validates `options` against the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, in field order.
    pub fn try_new(options: LayoutOptions) -> Result<Self, ConfigError> {
        Self::try_new_at(options, unix_millis_now())
    }

    /// Validates `options` as if the current time were `now_millis` (Unix
    /// milliseconds).
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, in field order.
    pub fn try_new_at(options: LayoutOptions, now_millis: i64) -> Result<Self, ConfigError> {
        let LayoutOptions {
            base_epoch_millis,
            worker_id,
            worker_id_bits,
            seq_bits,
            max_seq,
            min_seq,
            max_drift_count,
            method,
        } = options;

        if base_epoch_millis > now_millis {
            return Err(ConfigError::BaseEpochInFuture {
                base_epoch_millis,
                now_millis,
            });
        }
        if !(MIN_WORKER_ID_BITS..=MAX_WORKER_ID_BITS).contains(&worker_id_bits) {
            return Err(ConfigError::WorkerIdBits { worker_id_bits });
        }
        if !(MIN_SEQ_BITS..=MAX_SEQ_BITS).contains(&seq_bits) {
            return Err(ConfigError::SeqBits { seq_bits });
        }
        if worker_id_bits + seq_bits > MAX_LAYOUT_BITS {
            return Err(ConfigError::LayoutTooWide {
                worker_id_bits,
                seq_bits,
            });
        }

        let tick_bits = 63 - (worker_id_bits + seq_bits);
        let max_tick = (1i64 << tick_bits) - 1;
        if now_millis
            .checked_sub(base_epoch_millis)
            .is_none_or(|elapsed| elapsed > max_tick)
        {
            return Err(ConfigError::BaseEpochTooOld {
                base_epoch_millis,
                now_millis,
                tick_bits,
            });
        }

        let max_worker_id = (1u16 << worker_id_bits) - 1;
        if worker_id > max_worker_id {
            return Err(ConfigError::WorkerIdOutOfRange {
                worker_id,
                max_worker_id,
            });
        }

        let seq_limit = (1u32 << seq_bits) - 1;
        if max_seq > seq_limit {
            return Err(ConfigError::MaxSeqOutOfRange { max_seq, seq_limit });
        }
        let max_seq = if max_seq == 0 { seq_limit } else { max_seq };

        if min_seq < RESERVED_SEQ_FLOOR {
            return Err(ConfigError::MinSeqReserved { min_seq });
        }
        if min_seq > max_seq {
            return Err(ConfigError::MinSeqAboveMaxSeq { min_seq, max_seq });
        }
        if max_drift_count == 0 {
            return Err(ConfigError::MaxDriftCount);
        }

        Ok(Self {
            base_epoch_millis,
            worker_id,
            worker_id_bits,
            seq_bits,
            max_seq,
            min_seq,
            max_drift_count,
            method,
        })
    }

    pub const fn base_epoch_millis(&self) -> i64 {
        self.base_epoch_millis
    }

    pub const fn worker_id(&self) -> u16 {
        self.worker_id
    }

    pub const fn worker_id_bits(&self) -> u8 {
        self.worker_id_bits
    }

    pub const fn seq_bits(&self) -> u8 {
        self.seq_bits
    }

    /// Effective largest sequence value (never `0`).
    pub const fn max_seq(&self) -> u32 {
        self.max_seq
    }

    pub const fn min_seq(&self) -> u32 {
        self.min_seq
    }

    pub const fn max_drift_count(&self) -> u32 {
        self.max_drift_count
    }

    pub const fn method(&self) -> GeneratorMethod {
        self.method
    }

    /// Largest worker ID this layout can carry.
    pub const fn max_worker_id(&self) -> u16 {
        (1 << self.worker_id_bits) - 1
    }

    /// Number of bits the tick is shifted left by.
    pub const fn timestamp_shift(&self) -> u8 {
        self.worker_id_bits + self.seq_bits
    }

    /// Number of IDs a single tick can hold before the sequence is exhausted.
    pub const fn ids_per_tick(&self) -> u32 {
        self.max_seq - self.min_seq + 1
    }

    /// The packer/unpacker for this layout.
    pub fn codec(&self) -> IdCodec {
        IdCodec::new(self)
    }
}

/// Reasons a [`LayoutOptions`] value is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ConfigError {
    /// The base epoch lies after the current time.
    BaseEpochInFuture {
        base_epoch_millis: i64,
        now_millis: i64,
    },
    /// The time elapsed since the base epoch no longer fits in the tick
    /// field (`63 - worker_id_bits - seq_bits` bits).
    BaseEpochTooOld {
        base_epoch_millis: i64,
        now_millis: i64,
        tick_bits: u8,
    },
    /// `worker_id_bits` is outside `1..=15`.
    WorkerIdBits { worker_id_bits: u8 },
    /// `seq_bits` is outside `3..=21`.
    SeqBits { seq_bits: u8 },
    /// `worker_id_bits + seq_bits` exceeds 22.
    LayoutTooWide { worker_id_bits: u8, seq_bits: u8 },
    /// `worker_id` does not fit in `worker_id_bits`.
    WorkerIdOutOfRange { worker_id: u16, max_worker_id: u16 },
    /// `max_seq` does not fit in `seq_bits`.
    MaxSeqOutOfRange { max_seq: u32, seq_limit: u32 },
    /// `min_seq` falls in the reserved range `0..=4`.
    MinSeqReserved { min_seq: u32 },
    /// `min_seq` is greater than the effective `max_seq`.
    MinSeqAboveMaxSeq { min_seq: u32, max_seq: u32 },
    /// `max_drift_count` is zero.
    MaxDriftCount,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BaseEpochInFuture {
                base_epoch_millis,
                now_millis,
            } => write!(
                f,
                "base epoch {base_epoch_millis} is ahead of the current time {now_millis}"
            ),
            Self::BaseEpochTooOld {
                base_epoch_millis,
                now_millis,
                tick_bits,
            } => write!(
                f,
                "time since base epoch {base_epoch_millis} overflows {tick_bits} tick bits at {now_millis}"
            ),
            Self::WorkerIdBits { worker_id_bits } => write!(
                f,
                "worker_id_bits {worker_id_bits} must be in {MIN_WORKER_ID_BITS}..={MAX_WORKER_ID_BITS}"
            ),
            Self::SeqBits { seq_bits } => write!(
                f,
                "seq_bits {seq_bits} must be in {MIN_SEQ_BITS}..={MAX_SEQ_BITS}"
            ),
            Self::LayoutTooWide {
                worker_id_bits,
                seq_bits,
            } => write!(
                f,
                "worker_id_bits ({worker_id_bits}) + seq_bits ({seq_bits}) must not exceed {MAX_LAYOUT_BITS}"
            ),
            Self::WorkerIdOutOfRange {
                worker_id,
                max_worker_id,
            } => write!(f, "worker_id {worker_id} exceeds {max_worker_id}"),
            Self::MaxSeqOutOfRange { max_seq, seq_limit } => {
                write!(f, "max_seq {max_seq} exceeds {seq_limit}")
            }
            Self::MinSeqReserved { min_seq } => write!(
                f,
                "min_seq {min_seq} is reserved, must be at least {RESERVED_SEQ_FLOOR}"
            ),
            Self::MinSeqAboveMaxSeq { min_seq, max_seq } => {
                write!(f, "min_seq {min_seq} exceeds max_seq {max_seq}")
            }
            Self::MaxDriftCount => f.write_str("max_drift_count must be at least 1"),
        }
    }
}

impl core::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000_000;
    const BASE: i64 = 1_654_920_000_000;

    fn options() -> LayoutOptions {
        LayoutOptions {
            base_epoch_millis: BASE,
            ..LayoutOptions::default()
        }
    }

    fn reject(options: LayoutOptions) -> ConfigError {
        LayoutConfig::try_new_at(options, NOW).unwrap_err()
    }

    #[test]
    fn defaults_fill_in_max_seq() {
        let config = LayoutConfig::try_new_at(options(), NOW).unwrap();
        assert_eq!(config.max_seq(), 63);
        assert_eq!(config.min_seq(), 5);
        assert_eq!(config.max_worker_id(), 63);
        assert_eq!(config.timestamp_shift(), 12);
        assert_eq!(config.ids_per_tick(), 59);
        assert_eq!(config.max_drift_count(), DEFAULT_MAX_DRIFT_COUNT);
        assert_eq!(config.method(), GeneratorMethod::Drifting);
    }

    #[test]
    fn default_epoch_is_accepted_today() {
        let config = LayoutConfig::try_new(LayoutOptions::default()).unwrap();
        assert_eq!(config.base_epoch_millis(), DEFAULT_EPOCH_MILLIS);
    }

    #[test]
    fn explicit_max_seq_is_kept() {
        let config = LayoutConfig::try_new_at(
            LayoutOptions {
                max_seq: 40,
                min_seq: 10,
                ..options()
            },
            NOW,
        )
        .unwrap();
        assert_eq!(config.max_seq(), 40);
        assert_eq!(config.ids_per_tick(), 31);
    }

    #[test]
    fn rejects_future_epochs() {
        assert_eq!(
            reject(LayoutOptions {
                base_epoch_millis: NOW + 1,
                ..options()
            }),
            ConfigError::BaseEpochInFuture {
                base_epoch_millis: NOW + 1,
                now_millis: NOW,
            }
        );
        // the current instant itself is a valid origin
        assert!(
            LayoutConfig::try_new_at(
                LayoutOptions {
                    base_epoch_millis: NOW,
                    ..options()
                },
                NOW
            )
            .is_ok()
        );
    }

    #[test]
    fn epoch_age_is_bounded_by_tick_bits() {
        // the Unix epoch still fits comfortably in the default 51 tick bits
        assert!(
            LayoutConfig::try_new_at(
                LayoutOptions {
                    base_epoch_millis: 0,
                    ..options()
                },
                NOW
            )
            .is_ok()
        );

        // widest layout: 41 tick bits
        let wide = LayoutOptions {
            worker_id_bits: 10,
            seq_bits: 12,
            ..options()
        };
        let max_tick = (1i64 << 41) - 1;
        assert!(
            LayoutConfig::try_new_at(
                LayoutOptions {
                    base_epoch_millis: NOW - max_tick,
                    ..wide
                },
                NOW
            )
            .is_ok()
        );
        assert_eq!(
            reject(LayoutOptions {
                base_epoch_millis: NOW - max_tick - 1,
                ..wide
            }),
            ConfigError::BaseEpochTooOld {
                base_epoch_millis: NOW - max_tick - 1,
                now_millis: NOW,
                tick_bits: 41,
            }
        );
        // elapsed time that overflows i64 is rejected, not wrapped
        assert!(matches!(
            reject(LayoutOptions {
                base_epoch_millis: i64::MIN,
                ..options()
            }),
            ConfigError::BaseEpochTooOld { tick_bits: 51, .. }
        ));
    }

    #[test]
    fn rejects_bad_bit_widths() {
        for worker_id_bits in [0, 16] {
            assert_eq!(
                reject(LayoutOptions {
                    worker_id_bits,
                    ..options()
                }),
                ConfigError::WorkerIdBits { worker_id_bits }
            );
        }
        for seq_bits in [2, 22] {
            assert_eq!(
                reject(LayoutOptions {
                    seq_bits,
                    ..options()
                }),
                ConfigError::SeqBits { seq_bits }
            );
        }
        assert_eq!(
            reject(LayoutOptions {
                worker_id_bits: 10,
                seq_bits: 13,
                ..options()
            }),
            ConfigError::LayoutTooWide {
                worker_id_bits: 10,
                seq_bits: 13,
            }
        );
        assert!(
            LayoutConfig::try_new_at(
                LayoutOptions {
                    worker_id_bits: 10,
                    seq_bits: 12,
                    ..options()
                },
                NOW
            )
            .is_ok()
        );
    }

    #[test]
    fn rejects_worker_id_outside_field() {
        assert_eq!(
            reject(LayoutOptions {
                worker_id: 64,
                ..options()
            }),
            ConfigError::WorkerIdOutOfRange {
                worker_id: 64,
                max_worker_id: 63,
            }
        );
    }

    #[test]
    fn rejects_bad_sequence_bounds() {
        assert_eq!(
            reject(LayoutOptions {
                max_seq: 64,
                ..options()
            }),
            ConfigError::MaxSeqOutOfRange {
                max_seq: 64,
                seq_limit: 63,
            }
        );
        for min_seq in 0..RESERVED_SEQ_FLOOR {
            assert_eq!(
                reject(LayoutOptions {
                    min_seq,
                    ..options()
                }),
                ConfigError::MinSeqReserved { min_seq }
            );
        }
        assert_eq!(
            reject(LayoutOptions {
                max_seq: 20,
                min_seq: 21,
                ..options()
            }),
            ConfigError::MinSeqAboveMaxSeq {
                min_seq: 21,
                max_seq: 20,
            }
        );
        // defaulted max_seq still has to leave room for min_seq
        assert_eq!(
            reject(LayoutOptions {
                seq_bits: 3,
                min_seq: 8,
                ..options()
            }),
            ConfigError::MinSeqAboveMaxSeq {
                min_seq: 8,
                max_seq: 7,
            }
        );
    }

    #[test]
    fn rejects_zero_drift_count() {
        assert_eq!(
            reject(LayoutOptions {
                max_drift_count: 0,
                ..options()
            }),
            ConfigError::MaxDriftCount
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn options_deserialize_with_defaults() {
        let json = r#"{"worker_id": 7, "seq_bits": 10, "method": "strict"}"#;
        let options: LayoutOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.worker_id, 7);
        assert_eq!(options.seq_bits, 10);
        assert_eq!(options.method, GeneratorMethod::Strict);
        assert_eq!(options.min_seq, RESERVED_SEQ_FLOOR);
        assert_eq!(options.base_epoch_millis, DEFAULT_EPOCH_MILLIS);

        let back = serde_json::to_string(&options).unwrap();
        assert_eq!(serde_json::from_str::<LayoutOptions>(&back).unwrap(), options);
    }
}
