//! Counts keyed by `i64`.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::Error;
use crate::error::Result;
use crate::hash::LoadPolicy;
use crate::long_slots::LongStorage;
use crate::long_slots::hash_key;
use crate::raw_table::Probe;
use crate::raw_table::RawTable;
use crate::uint_value_map::check_count;

/// Map from any `i64` key to a non-negative `i32` count.
///
/// Absent keys read as [`NO_VALUE`](Self::NO_VALUE). Operations that would
/// store a negative count, or one past `i32::MAX`, fail and leave the map
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use probe_hash::LongUIntMap;
///
/// let mut bigrams = LongUIntMap::new();
/// let key = (17i64 << 32) | 4;
/// bigrams.increment(key)?;
/// bigrams.increment(key)?;
/// assert_eq!(bigrams.get(key), 2);
/// assert_eq!(bigrams.get(-key), LongUIntMap::NO_VALUE);
/// assert!(bigrams.increment_by_amount(key, -3).is_err());
/// # Ok::<(), probe_hash::Error>(())
/// ```
#[derive(Clone)]
pub struct LongUIntMap {
    table: RawTable<LongStorage>,
}

impl Debug for LongUIntMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl LongUIntMap {
    /// Value returned for absent keys.
    pub const NO_VALUE: i32 = -1;

    /// Slot count used by [`new`](Self::new).
    pub const DEFAULT_CAPACITY: usize = 8;

    /// Creates an empty map with [`DEFAULT_CAPACITY`](Self::DEFAULT_CAPACITY)
    /// slots.
    pub fn new() -> Self {
        Self {
            table: RawTable::allocate(Self::DEFAULT_CAPACITY, LoadPolicy::WIDE),
        }
    }

    /// Creates an empty map with `capacity` slots, rounded up to a power of
    /// two.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            table: RawTable::with_capacity(capacity, LoadPolicy::WIDE)?,
        })
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Tombstones left by removals since the last expansion.
    pub fn tombstones(&self) -> usize {
        self.table.removed()
    }

    /// Count stored under `key`, or [`NO_VALUE`](Self::NO_VALUE).
    pub fn get(&self, key: i64) -> i32 {
        self.table
            .find(hash_key(&key), &key)
            .map_or(Self::NO_VALUE, |slot| self.table.storage().count(slot))
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: i64) -> bool {
        self.table.find(hash_key(&key), &key).is_some()
    }

    /// Stores `count` under `key`, returning the previous count if any.
    pub fn put(&mut self, key: i64, count: i32) -> Result<Option<i32>> {
        if count < 0 {
            return Err(Error::NegativeValue {
                value: count as i64,
            });
        }
        self.store(key, |_| Ok(count)).map(|(previous, _)| previous)
    }

    /// Adds one to the count of `key`, starting from zero.
    pub fn increment(&mut self, key: i64) -> Result<i32> {
        self.increment_by_amount(key, 1)
    }

    /// Subtracts one from the count of `key`. Fails if the key is absent or
    /// its count is zero.
    pub fn decrement(&mut self, key: i64) -> Result<i32> {
        self.increment_by_amount(key, -1)
    }

    /// Adds `amount`, which may be negative, to the count of `key`, starting
    /// from zero for an absent key. Returns the new count.
    pub fn increment_by_amount(&mut self, key: i64, amount: i32) -> Result<i32> {
        self.store(key, |current| {
            check_count(current.unwrap_or(0) as i64 + amount as i64)
        })
        .map(|(_, next)| next)
    }

    /// Computes the next count from the current one and stores it. Nothing
    /// is written, and the table does not grow, if `next` fails.
    fn store(
        &mut self,
        key: i64,
        next: impl FnOnce(Option<i32>) -> Result<i32>,
    ) -> Result<(Option<i32>, i32)> {
        let hash = hash_key(&key);
        let current = self
            .table
            .find(hash, &key)
            .map(|slot| self.table.storage().count(slot));
        let count = next(current)?;
        match self.table.probe_for_insert(hash, &key, hash_key)? {
            Probe::Found(slot) => self.table.storage_mut().set_count(slot, count),
            Probe::Vacant(slot) => self.table.insert_at(slot, key, count),
        }
        Ok((current, count))
    }

    /// Removes `key`, returning its count.
    pub fn remove(&mut self, key: i64) -> Option<i32> {
        self.table
            .remove(hash_key(&key), &key)
            .map(|(_, count)| count)
    }

    /// Drops every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Iterates over `(key, count)` pairs in slot order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (i64, i32)> + '_ {
        let storage = self.table.storage();
        self.table
            .live_slots()
            .map(move |slot| (storage.key(slot), storage.count(slot)))
    }

    /// Live keys in slot order.
    pub fn keys(&self) -> Vec<i64> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Snapshot of the live counts in slot order.
    pub fn copy_of_values(&self) -> Vec<i32> {
        self.iter().map(|(_, count)| count).collect()
    }

    /// Probe-length statistics of the current layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.table.probe_stats(hash_key)
    }
}

impl Default for LongUIntMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn every_key_is_legal() {
        let mut map = LongUIntMap::new();
        for key in [i64::MIN, -2, -1, 0, i64::MAX] {
            assert_eq!(map.put(key, 3), Ok(None), "{key}");
        }
        for key in [i64::MIN, -2, -1, 0, i64::MAX] {
            assert_eq!(map.get(key), 3, "{key}");
        }
        assert_eq!(map.get(1), LongUIntMap::NO_VALUE);
        assert!(!map.contains_key(1));
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn counts_stay_non_negative() {
        let mut map = LongUIntMap::new();
        assert_eq!(map.put(1, -1), Err(Error::NegativeValue { value: -1 }));
        assert!(map.is_empty());

        assert_eq!(map.decrement(7), Err(Error::NegativeValue { value: -1 }));
        assert!(!map.contains_key(7));

        assert_eq!(map.increment(7), Ok(1));
        assert_eq!(map.decrement(7), Ok(0));
        assert_eq!(map.decrement(7), Err(Error::NegativeValue { value: -1 }));
        assert_eq!(map.get(7), 0);

        map.put(8, i32::MAX).unwrap();
        assert_eq!(
            map.increment(8),
            Err(Error::ValueOverflow {
                value: i32::MAX as i64 + 1
            })
        );
        assert_eq!(map.get(8), i32::MAX);
    }

    #[test]
    fn rejected_update_does_not_grow() {
        let mut map = LongUIntMap::with_capacity(4).unwrap();
        map.put(1, 1).unwrap();
        map.put(2, 1).unwrap();
        assert_eq!(map.capacity(), 4);
        assert!(map.increment_by_amount(3, -1).is_err());
        assert_eq!(map.capacity(), 4);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn grows_from_one_slot() {
        let mut rng = SmallRng::seed_from_u64(3);
        let keys: Vec<i64> = (0..5_000).map(|_| rng.random()).collect();
        let mut map = LongUIntMap::with_capacity(1).unwrap();
        for &key in &keys {
            map.increment(key).unwrap();
        }
        for &key in &keys {
            map.increment_by_amount(key, 2).unwrap();
        }
        let mut distinct = keys.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(map.len(), distinct.len());
        for &key in &keys {
            let occurrences = keys.iter().filter(|&&k| k == key).count() as i32;
            assert_eq!(map.get(key), occurrences * 3);
        }
        assert!(map.len() * 2 <= map.capacity());
    }

    #[test]
    fn removal_and_snapshots() {
        let mut map = LongUIntMap::new();
        for key in 0..10i64 {
            map.put(key << 40, key as i32).unwrap();
        }
        assert_eq!(map.remove(3 << 40), Some(3));
        assert_eq!(map.remove(3 << 40), None);
        assert_eq!(map.tombstones(), 1);
        assert_eq!(map.get(3 << 40), LongUIntMap::NO_VALUE);

        let mut keys = map.keys();
        keys.sort_unstable();
        let expected: Vec<i64> = (0..10).filter(|&k| k != 3).map(|k| k << 40).collect();
        assert_eq!(keys, expected);

        let mut counts = map.copy_of_values();
        counts.sort_unstable();
        assert_eq!(counts, vec![0, 1, 2, 4, 5, 6, 7, 8, 9]);
        assert_eq!(map.iter().len(), 9);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.tombstones(), 0);
    }
}
