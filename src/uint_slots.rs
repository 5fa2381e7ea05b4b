//! Slot layout for tables whose keys are non-negative `i32`s.
//!
//! Negative keys double as slot markers: `-1` is an empty slot, `-2` a
//! tombstone. A key of `0` is ordinary.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::Error;
use crate::error::Result;
use crate::raw_table::SlotState;
use crate::raw_table::Storage;

pub(crate) const EMPTY: i32 = -1;
pub(crate) const DELETED: i32 = -2;

#[inline(always)]
pub(crate) fn check_key(key: i32) -> Result<()> {
    if key < 0 {
        return Err(Error::IllegalKey { key: key as i64 });
    }
    Ok(())
}

/// Integer keys are hashed as their own bit pattern; the engine spreads them.
#[inline(always)]
pub(crate) fn hash_key(key: &i32) -> u32 {
    *key as u32
}

#[derive(Clone)]
pub(crate) struct UIntStorage<V> {
    keys: Vec<i32>,
    values: Vec<V>,
}

impl<V> UIntStorage<V> {
    /// Raw slot content, including the `EMPTY` and `DELETED` markers.
    #[inline(always)]
    pub(crate) fn key(&self, slot: usize) -> i32 {
        self.keys[slot]
    }

    #[inline(always)]
    pub(crate) fn value(&self, slot: usize) -> &V {
        &self.values[slot]
    }

    #[inline(always)]
    pub(crate) fn value_mut(&mut self, slot: usize) -> &mut V {
        &mut self.values[slot]
    }
}

impl<V: Default> Storage for UIntStorage<V> {
    type Key = i32;
    type Value = V;

    fn allocate(slots: usize) -> Self {
        let mut values = Vec::with_capacity(slots);
        values.resize_with(slots, V::default);
        Self {
            keys: vec![EMPTY; slots],
            values,
        }
    }

    #[inline(always)]
    fn slots(&self) -> usize {
        self.keys.len()
    }

    #[inline(always)]
    fn state(&self, slot: usize) -> SlotState {
        match self.keys[slot] {
            EMPTY => SlotState::Empty,
            DELETED => SlotState::Tombstone,
            _ => SlotState::Live,
        }
    }

    #[inline(always)]
    fn with_key<R>(&self, slot: usize, f: impl FnOnce(&i32) -> R) -> Option<R> {
        let key = &self.keys[slot];
        (*key >= 0).then(|| f(key))
    }

    #[inline(always)]
    fn holds(&self, slot: usize, key: &i32) -> bool {
        self.keys[slot] == *key && *key >= 0
    }

    fn fill(&mut self, slot: usize, key: i32, value: V) {
        debug_assert!(key >= 0);
        self.keys[slot] = key;
        self.values[slot] = value;
    }

    fn bury(&mut self, slot: usize) -> Option<(i32, V)> {
        let key = self.keys[slot];
        if key < 0 {
            return None;
        }
        self.keys[slot] = DELETED;
        Some((key, core::mem::take(&mut self.values[slot])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_keys_are_rejected() {
        assert_eq!(check_key(-1), Err(Error::IllegalKey { key: -1 }));
        assert_eq!(check_key(-2), Err(Error::IllegalKey { key: -2 }));
        assert_eq!(check_key(i32::MIN), Err(Error::IllegalKey { key: i32::MIN as i64 }));
        assert_eq!(check_key(0), Ok(()));
        assert_eq!(check_key(i32::MAX), Ok(()));
    }

    #[test]
    fn markers_never_match_as_keys() {
        let mut storage = UIntStorage::<u8>::allocate(4);
        assert!(!storage.holds(0, &EMPTY));
        storage.fill(1, 0, 3);
        assert!(storage.holds(1, &0));
        assert_eq!(storage.bury(1), Some((0, 3)));
        assert_eq!(storage.state(1), SlotState::Tombstone);
        assert!(!storage.holds(1, &DELETED));
    }
}
