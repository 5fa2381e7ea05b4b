//! Slot layout for `i64` keys with non-negative `i32` counts.
//!
//! Every `i64` is a legal key, so the slot markers live in the value array
//! instead: `-1` is an empty slot, `-2` a tombstone.

use alloc::vec;
use alloc::vec::Vec;

use crate::hash::fold;
use crate::raw_table::SlotState;
use crate::raw_table::Storage;

pub(crate) const EMPTY: i32 = -1;
pub(crate) const DELETED: i32 = -2;

/// Folds both halves of the key, then lets the engine spread the result.
#[inline(always)]
pub(crate) fn hash_key(key: &i64) -> u32 {
    fold(*key as u64)
}

#[derive(Clone)]
pub(crate) struct LongStorage {
    keys: Vec<i64>,
    counts: Vec<i32>,
}

impl LongStorage {
    #[inline(always)]
    pub(crate) fn key(&self, slot: usize) -> i64 {
        self.keys[slot]
    }

    /// Raw slot content, including the `EMPTY` and `DELETED` markers.
    #[inline(always)]
    pub(crate) fn count(&self, slot: usize) -> i32 {
        self.counts[slot]
    }

    /// Overwrites the count of a live slot.
    #[inline(always)]
    pub(crate) fn set_count(&mut self, slot: usize, count: i32) {
        debug_assert!(count >= 0 && self.counts[slot] >= 0);
        self.counts[slot] = count;
    }
}

impl Storage for LongStorage {
    type Key = i64;
    type Value = i32;

    fn allocate(slots: usize) -> Self {
        Self {
            keys: vec![0; slots],
            counts: vec![EMPTY; slots],
        }
    }

    #[inline(always)]
    fn slots(&self) -> usize {
        self.keys.len()
    }

    #[inline(always)]
    fn state(&self, slot: usize) -> SlotState {
        match self.counts[slot] {
            EMPTY => SlotState::Empty,
            DELETED => SlotState::Tombstone,
            _ => SlotState::Live,
        }
    }

    #[inline(always)]
    fn with_key<R>(&self, slot: usize, f: impl FnOnce(&i64) -> R) -> Option<R> {
        (self.counts[slot] >= 0).then(|| f(&self.keys[slot]))
    }

    #[inline(always)]
    fn holds(&self, slot: usize, key: &i64) -> bool {
        self.keys[slot] == *key && self.counts[slot] >= 0
    }

    fn fill(&mut self, slot: usize, key: i64, count: i32) {
        debug_assert!(count >= 0);
        self.keys[slot] = key;
        self.counts[slot] = count;
    }

    fn bury(&mut self, slot: usize) -> Option<(i64, i32)> {
        let count = self.counts[slot];
        if count < 0 {
            return None;
        }
        self.counts[slot] = DELETED;
        Some((self.keys[slot], count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_key_in_fresh_slot_is_not_live() {
        let storage = LongStorage::allocate(4);
        assert_eq!(storage.state(0), SlotState::Empty);
        assert!(!storage.holds(0, &0));
    }

    #[test]
    fn markers_live_in_the_counts() {
        let mut storage = LongStorage::allocate(4);
        storage.fill(3, i64::MIN, 0);
        assert!(storage.holds(3, &i64::MIN));
        assert_eq!(storage.bury(3), Some((i64::MIN, 0)));
        assert_eq!(storage.state(3), SlotState::Tombstone);
        assert!(!storage.holds(3, &i64::MIN));
        assert_eq!(storage.bury(3), None);
    }

    #[test]
    fn hash_uses_both_halves() {
        assert_ne!(hash_key(&1), hash_key(&(1 << 32 | 1)));
        assert_eq!(hash_key(&-1), 0);
    }
}
