//! Hash spreading, probe sequences and capacity arithmetic shared by every
//! table in the crate.

use crate::error::Error;
use crate::error::Result;

/// `0x9E3779B9`, the 32-bit golden ratio. Multiplying by it scatters
/// sequential integers across the high bits.
pub const PHI: u32 = 0x9E37_79B9;

/// Largest slot count any table may allocate.
pub const MAX_CAPACITY: usize = 1 << 30;

/// Capacity used by `new()` constructors.
pub const DEFAULT_CAPACITY: usize = 4;

/// Spreads a raw 32-bit hash code so that low-entropy inputs (small
/// sequential integers in particular) do not cluster in the low bits.
///
/// The shift is arithmetic, matching signed 32-bit semantics.
#[inline(always)]
pub fn spread(hash: u32) -> u32 {
    let h = (hash as i32).wrapping_mul(PHI as i32);
    (h ^ (h >> 16)) as u32
}

/// Folds a 64-bit hasher output into 32 bits before spreading.
#[inline(always)]
pub fn fold(hash: u64) -> u32 {
    (hash ^ (hash >> 32)) as u32
}

/// First slot visited for `hash` in a table of `mask + 1` slots.
#[inline(always)]
pub fn first_probe(hash: u32, mask: usize) -> usize {
    spread(hash) as usize & mask
}

/// Linear probe step.
#[inline(always)]
pub fn next_probe(slot: usize, mask: usize) -> usize {
    (slot + 1) & mask
}

/// Rounds `requested` up to a power of two, rejecting `0` and anything past
/// `MAX_CAPACITY`.
pub fn slot_count(requested: usize) -> Result<usize> {
    if requested == 0 || requested > MAX_CAPACITY {
        return Err(Error::IllegalCapacity {
            requested,
            max: MAX_CAPACITY,
        });
    }
    Ok(requested.next_power_of_two())
}

/// How full a table may get, counting tombstones, before it expands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPolicy {
    /// A single load factor, in thousandths.
    Fixed(u16),
    /// Smaller tables run denser; see [`scaled_load_factor`].
    Scaled,
}

impl LoadPolicy {
    /// Load factor used by object-keyed tables.
    pub const OBJECT: LoadPolicy = LoadPolicy::Fixed(700);
    /// Load factor used by the non-negative integer key tables.
    pub const UNSIGNED: LoadPolicy = LoadPolicy::Fixed(550);
    /// Load factor used by the `i64`-keyed count table.
    pub const WIDE: LoadPolicy = LoadPolicy::Fixed(500);

    /// Number of live plus tombstoned slots at which a table of `capacity`
    /// slots must expand. Always strictly less than `capacity`.
    pub fn threshold_for(self, capacity: usize) -> usize {
        let per_mille = match self {
            LoadPolicy::Fixed(per_mille) => per_mille as usize,
            LoadPolicy::Scaled => scaled_load_factor(capacity) as usize,
        };
        let threshold = ((capacity as u64 * per_mille as u64) / 1000) as usize;
        threshold.min(capacity.saturating_sub(1))
    }
}

/// Load factor schedule of the packed tables, in thousandths.
///
/// | capacity <= | factor |
/// |---|---|
/// | 4 | 0.90 |
/// | 16 | 0.75 |
/// | 128 | 0.70 |
/// | 512 | 0.65 |
/// | 2048 | 0.60 |
/// | larger | 0.50 |
pub fn scaled_load_factor(capacity: usize) -> u16 {
    match capacity {
        0..=4 => 900,
        5..=16 => 750,
        17..=128 => 700,
        129..=512 => 650,
        513..=2048 => 600,
        _ => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_matches_signed_arithmetic() {
        assert_eq!(spread(0), 0);
        assert_eq!(spread(1), 0x9E37_79B9 ^ 0xFFFF_9E37);
        // -1 * PHI = -PHI, then arithmetic shift keeps the sign.
        let h = (-1i32).wrapping_mul(PHI as i32);
        assert_eq!(spread(u32::MAX), (h ^ (h >> 16)) as u32);
    }

    #[test]
    fn sequential_keys_do_not_collide_in_small_tables() {
        let mask = 15;
        let mut seen = [0usize; 16];
        for key in 0..16u32 {
            seen[first_probe(key, mask)] += 1;
        }
        assert!(seen.iter().all(|&n| n <= 3), "{seen:?}");
    }

    #[test]
    fn probe_wraps_around() {
        assert_eq!(next_probe(6, 7), 7);
        assert_eq!(next_probe(7, 7), 0);
    }

    #[test]
    fn fold_mixes_both_halves() {
        assert_eq!(fold(0x0000_0001_0000_0000), 1);
        assert_eq!(fold(0xFFFF_FFFF_FFFF_FFFF), 0);
        assert_eq!(fold(0x1234), 0x1234);
    }

    #[test]
    fn slot_count_rounds_up() {
        assert_eq!(slot_count(1), Ok(1));
        assert_eq!(slot_count(3), Ok(4));
        assert_eq!(slot_count(4), Ok(4));
        assert_eq!(slot_count(1000), Ok(1024));
        assert_eq!(slot_count(MAX_CAPACITY), Ok(MAX_CAPACITY));
    }

    #[test]
    fn slot_count_rejects_out_of_range() {
        assert!(slot_count(0).is_err());
        assert!(slot_count(MAX_CAPACITY + 1).is_err());
        assert!(slot_count(usize::MAX).is_err());
    }

    #[test]
    fn threshold_leaves_an_empty_slot() {
        for policy in [
            LoadPolicy::OBJECT,
            LoadPolicy::UNSIGNED,
            LoadPolicy::WIDE,
            LoadPolicy::Scaled,
        ] {
            for shift in 0..=20 {
                let capacity = 1usize << shift;
                let threshold = policy.threshold_for(capacity);
                assert!(threshold < capacity, "{policy:?} {capacity}");
            }
        }
        assert_eq!(LoadPolicy::Scaled.threshold_for(1), 0);
    }

    #[test]
    fn scaled_schedule() {
        assert_eq!(LoadPolicy::Scaled.threshold_for(4), 3);
        assert_eq!(LoadPolicy::Scaled.threshold_for(16), 12);
        assert_eq!(LoadPolicy::Scaled.threshold_for(128), 89);
        assert_eq!(LoadPolicy::Scaled.threshold_for(512), 332);
        assert_eq!(LoadPolicy::Scaled.threshold_for(2048), 1228);
        assert_eq!(LoadPolicy::Scaled.threshold_for(4096), 2048);
        assert_eq!(LoadPolicy::OBJECT.threshold_for(16), 11);
        assert_eq!(LoadPolicy::UNSIGNED.threshold_for(16), 8);
        assert_eq!(LoadPolicy::WIDE.threshold_for(8), 4);
    }
}
