//! Slot layout for tables keyed by arbitrary hashable values.

use alloc::vec::Vec;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::error::Result;
use crate::hash::fold;
use crate::raw_table::SlotState;
use crate::raw_table::Storage;

/// One key slot. Tombstones are a distinct variant rather than a reserved
/// key value, so every key of `K` is legal.
#[derive(Clone, Debug)]
pub(crate) enum Slot<K> {
    Empty,
    Tombstone,
    Occupied(K),
}

/// Keys and values in parallel arrays. Value slots that are not live hold
/// `V::default()`.
#[derive(Clone)]
pub(crate) struct ObjectStorage<K, V> {
    keys: Vec<Slot<K>>,
    values: Vec<V>,
}

impl<K, V> ObjectStorage<K, V> {
    #[inline(always)]
    pub(crate) fn key(&self, slot: usize) -> Option<&K> {
        match &self.keys[slot] {
            Slot::Occupied(key) => Some(key),
            _ => None,
        }
    }

    #[inline(always)]
    pub(crate) fn value(&self, slot: usize) -> &V {
        &self.values[slot]
    }

    #[inline(always)]
    pub(crate) fn value_mut(&mut self, slot: usize) -> &mut V {
        &mut self.values[slot]
    }

    /// Key and value of a live slot.
    #[inline(always)]
    pub(crate) fn entry(&self, slot: usize) -> Option<(&K, &V)> {
        self.key(slot).map(|key| (key, &self.values[slot]))
    }
}

impl<K: Eq, V: Default> Storage for ObjectStorage<K, V> {
    type Key = K;
    type Value = V;

    fn allocate(slots: usize) -> Self {
        let mut keys = Vec::with_capacity(slots);
        keys.resize_with(slots, || Slot::Empty);
        let mut values = Vec::with_capacity(slots);
        values.resize_with(slots, V::default);
        Self { keys, values }
    }

    #[inline(always)]
    fn slots(&self) -> usize {
        self.keys.len()
    }

    #[inline(always)]
    fn state(&self, slot: usize) -> SlotState {
        match self.keys[slot] {
            Slot::Empty => SlotState::Empty,
            Slot::Tombstone => SlotState::Tombstone,
            Slot::Occupied(_) => SlotState::Live,
        }
    }

    #[inline(always)]
    fn with_key<R>(&self, slot: usize, f: impl FnOnce(&K) -> R) -> Option<R> {
        self.key(slot).map(f)
    }

    fn fill(&mut self, slot: usize, key: K, value: V) {
        self.keys[slot] = Slot::Occupied(key);
        self.values[slot] = value;
    }

    fn bury(&mut self, slot: usize) -> Option<(K, V)> {
        if !matches!(self.keys[slot], Slot::Occupied(_)) {
            return None;
        }
        match core::mem::replace(&mut self.keys[slot], Slot::Tombstone) {
            Slot::Occupied(key) => Some((key, core::mem::take(&mut self.values[slot]))),
            _ => None,
        }
    }
}

/// Hashes `key` with `hash_builder` and folds the result to the 32 bits the
/// probe sequence consumes.
#[inline(always)]
pub(crate) fn hash_key<K: Hash + ?Sized, S: BuildHasher>(hash_builder: &S, key: &K) -> u32 {
    fold(hash_builder.hash_one(key))
}

/// Unwraps the outcome of an insert into an object-keyed table.
///
/// The only possible failure is growing past the maximum slot count, which
/// these tables report by panicking, like `Vec` does on capacity overflow.
#[inline(always)]
#[track_caller]
pub(crate) fn or_capacity_overflow<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}
