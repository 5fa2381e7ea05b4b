//! Slot layout for tables keyed by any `i32` except `i32::MIN`.
//!
//! `i32::MIN` in the key array marks a never-used slot. A tombstone keeps
//! its old key and drops its value, so no second key has to be reserved.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::Error;
use crate::error::Result;
use crate::raw_table::SlotState;
use crate::raw_table::Storage;

pub(crate) const EMPTY: i32 = i32::MIN;

#[inline(always)]
pub(crate) fn check_key(key: i32) -> Result<()> {
    if key == EMPTY {
        return Err(Error::IllegalKey { key: key as i64 });
    }
    Ok(())
}

#[derive(Clone)]
pub(crate) struct IntStorage<V> {
    keys: Vec<i32>,
    values: Vec<Option<V>>,
}

impl<V> IntStorage<V> {
    /// Key of a live slot.
    #[inline(always)]
    pub(crate) fn key(&self, slot: usize) -> i32 {
        debug_assert!(self.values[slot].is_some());
        self.keys[slot]
    }

    #[inline(always)]
    pub(crate) fn value(&self, slot: usize) -> Option<&V> {
        self.values[slot].as_ref()
    }

    #[inline(always)]
    pub(crate) fn value_mut(&mut self, slot: usize) -> Option<&mut V> {
        self.values[slot].as_mut()
    }
}

impl<V> Storage for IntStorage<V> {
    type Key = i32;
    type Value = V;

    fn allocate(slots: usize) -> Self {
        let mut values = Vec::with_capacity(slots);
        values.resize_with(slots, || None);
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
        match (self.keys[slot], &self.values[slot]) {
            (EMPTY, _) => SlotState::Empty,
            (_, None) => SlotState::Tombstone,
            (_, Some(_)) => SlotState::Live,
        }
    }

    #[inline(always)]
    fn with_key<R>(&self, slot: usize, f: impl FnOnce(&i32) -> R) -> Option<R> {
        self.values[slot].as_ref().map(|_| f(&self.keys[slot]))
    }

    #[inline(always)]
    fn holds(&self, slot: usize, key: &i32) -> bool {
        self.keys[slot] == *key && self.values[slot].is_some()
    }

    fn fill(&mut self, slot: usize, key: i32, value: V) {
        debug_assert!(key != EMPTY);
        self.keys[slot] = key;
        self.values[slot] = Some(value);
    }

    fn bury(&mut self, slot: usize) -> Option<(i32, V)> {
        let value = self.values[slot].take()?;
        Some((self.keys[slot], value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_empty_marker_is_rejected() {
        assert_eq!(check_key(i32::MIN), Err(Error::IllegalKey { key: i32::MIN as i64 }));
        assert_eq!(check_key(i32::MIN + 1), Ok(()));
        assert_eq!(check_key(-1), Ok(()));
        assert_eq!(check_key(i32::MAX), Ok(()));
    }

    #[test]
    fn tombstone_keeps_its_key_but_never_matches() {
        let mut storage = IntStorage::<&str>::allocate(4);
        assert_eq!(storage.state(0), SlotState::Empty);
        assert!(!storage.holds(0, &EMPTY));

        storage.fill(2, -7, "x");
        assert!(storage.holds(2, &-7));
        assert_eq!(storage.bury(2), Some((-7, "x")));
        assert_eq!(storage.state(2), SlotState::Tombstone);
        assert!(!storage.holds(2, &-7));
        assert_eq!(storage.bury(2), None);

        storage.fill(2, 5, "y");
        assert_eq!(storage.state(2), SlotState::Live);
        assert_eq!(storage.value(2), Some(&"y"));
    }
}
