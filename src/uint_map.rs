//! Tables keyed by non-negative `i32`s with keys stored inline.
//!
//! Keys are hashed by value, so no hasher builder is involved. Negative keys
//! are rejected by every inserting or reading operation and are never
//! present.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::error::Result;
use crate::hash::DEFAULT_CAPACITY;
use crate::hash::LoadPolicy;
use crate::raw_table::LiveSlots;
use crate::raw_table::Probe;
use crate::raw_table::RawTable;
use crate::uint_slots::UIntStorage;
use crate::uint_slots::check_key;
use crate::uint_slots::hash_key;

/// Map from non-negative `i32` keys to values of any type.
///
/// # Examples
///
/// ```rust
/// use probe_hash::UIntMap;
///
/// let mut names = UIntMap::new();
/// names.put(7, "seven").unwrap();
/// assert_eq!(names.get(7), Ok(Some(&"seven")));
/// assert_eq!(names.get(8), Ok(None));
/// assert!(names.put(-1, "minus one").is_err());
/// ```
#[derive(Clone)]
pub struct UIntMap<T> {
    table: RawTable<UIntStorage<Option<T>>>,
}

impl<T: Debug> Debug for UIntMap<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T> UIntMap<T> {
    /// Creates an empty map with the default capacity.
    pub fn new() -> Self {
        Self {
            table: RawTable::allocate(DEFAULT_CAPACITY, LoadPolicy::UNSIGNED),
        }
    }

    /// Creates an empty map with `capacity` slots, rounded up to a power of
    /// two.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            table: RawTable::with_capacity(capacity, LoadPolicy::UNSIGNED)?,
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

    /// Stores `value` under `key`, returning the previous value if any.
    pub fn put(&mut self, key: i32, value: T) -> Result<Option<T>> {
        check_key(key)?;
        match self.table.probe_for_insert(hash_key(&key), &key, hash_key)? {
            Probe::Found(slot) => Ok(self.table.storage_mut().value_mut(slot).replace(value)),
            Probe::Vacant(slot) => {
                self.table.insert_at(slot, key, Some(value));
                Ok(None)
            }
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: i32) -> Result<Option<&T>> {
        check_key(key)?;
        Ok(self
            .table
            .find(hash_key(&key), &key)
            .and_then(|slot| self.table.storage().value(slot).as_ref()))
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut(&mut self, key: i32) -> Result<Option<&mut T>> {
        check_key(key)?;
        Ok(match self.table.find(hash_key(&key), &key) {
            Some(slot) => self.table.storage_mut().value_mut(slot).as_mut(),
            None => None,
        })
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: i32) -> bool {
        self.table.find(hash_key(&key), &key).is_some()
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: i32) -> Option<T> {
        self.table
            .remove(hash_key(&key), &key)
            .and_then(|(_, value)| value)
    }

    /// Drops every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Iterates over `(key, &value)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.table.live_slots(),
        }
    }

    /// Iterates over values in slot order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &T> {
        self.iter().map(|(_, value)| value)
    }

    /// Live keys in slot order.
    pub fn keys(&self) -> Vec<i32> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Live keys in ascending order.
    pub fn keys_sorted(&self) -> Vec<i32> {
        let mut keys = self.keys();
        keys.sort_unstable();
        keys
    }

    /// Values ordered by ascending key.
    pub fn values_sorted_by_key(&self) -> Vec<&T> {
        let mut pairs: Vec<(i32, &T)> = self.iter().collect();
        pairs.sort_unstable_by_key(|&(key, _)| key);
        pairs.into_iter().map(|(_, value)| value).collect()
    }

    /// Probe-length statistics of the current layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.table.probe_stats(hash_key)
    }
}

impl<T> Default for UIntMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a UIntMap<T> {
    type IntoIter = Iter<'a, T>;
    type Item = (i32, &'a T);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of a [`UIntMap`].
pub struct Iter<'a, T> {
    slots: LiveSlots<'a, UIntStorage<Option<T>>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (i32, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        let storage = self.slots.storage();
        storage
            .value(slot)
            .as_ref()
            .map(|value| (storage.key(slot), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Set of non-negative `i32`s.
#[derive(Clone)]
pub struct UIntSet {
    table: RawTable<UIntStorage<()>>,
}

impl Debug for UIntSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl UIntSet {
    /// Creates an empty set with the default capacity.
    pub fn new() -> Self {
        Self {
            table: RawTable::allocate(DEFAULT_CAPACITY, LoadPolicy::UNSIGNED),
        }
    }

    /// Creates an empty set with `capacity` slots, rounded up to a power of
    /// two.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            table: RawTable::with_capacity(capacity, LoadPolicy::UNSIGNED)?,
        })
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Adds `key`, returning `true` if it was not already present.
    pub fn add(&mut self, key: i32) -> Result<bool> {
        check_key(key)?;
        match self.table.probe_for_insert(hash_key(&key), &key, hash_key)? {
            Probe::Found(_) => Ok(false),
            Probe::Vacant(slot) => {
                self.table.insert_at(slot, key, ());
                Ok(true)
            }
        }
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: i32) -> bool {
        self.table.find(hash_key(&key), &key).is_some()
    }

    /// Removes `key`, returning `true` if it was present.
    pub fn remove(&mut self, key: i32) -> bool {
        self.table.remove(hash_key(&key), &key).is_some()
    }

    /// Drops every key, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Iterates over keys in slot order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = i32> + '_ {
        let storage = self.table.storage();
        self.table.live_slots().map(move |slot| storage.key(slot))
    }

    /// Keys in slot order.
    pub fn keys(&self) -> Vec<i32> {
        self.iter().collect()
    }

    /// Keys in ascending order.
    pub fn keys_sorted(&self) -> Vec<i32> {
        let mut keys = self.keys();
        keys.sort_unstable();
        keys
    }

    /// Probe-length statistics of the current layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.table.probe_stats(hash_key)
    }
}

impl Default for UIntSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Map from non-negative `i32` keys to `i32` values.
///
/// Absent keys read as the map's *no value*, `-1` unless configured with
/// [`with_no_value`](Self::with_no_value).
#[derive(Clone)]
pub struct UIntIntMap {
    table: RawTable<UIntStorage<i32>>,
    no_value: i32,
}

impl Debug for UIntIntMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl UIntIntMap {
    /// Default value returned for absent keys.
    pub const DEFAULT_NO_VALUE: i32 = -1;

    /// Creates an empty map with the default capacity.
    pub fn new() -> Self {
        Self {
            table: RawTable::allocate(DEFAULT_CAPACITY, LoadPolicy::UNSIGNED),
            no_value: Self::DEFAULT_NO_VALUE,
        }
    }

    /// Creates an empty map with `capacity` slots, rounded up to a power of
    /// two.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            table: RawTable::with_capacity(capacity, LoadPolicy::UNSIGNED)?,
            no_value: Self::DEFAULT_NO_VALUE,
        })
    }

    /// Sets the value [`get`](Self::get) returns for absent keys.
    pub fn with_no_value(mut self, no_value: i32) -> Self {
        self.no_value = no_value;
        self
    }

    /// Value returned by [`get`](Self::get) for absent keys.
    pub fn no_value(&self) -> i32 {
        self.no_value
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

    /// Stores `value` under `key`, returning the previous value if any.
    pub fn put(&mut self, key: i32, value: i32) -> Result<Option<i32>> {
        check_key(key)?;
        match self.table.probe_for_insert(hash_key(&key), &key, hash_key)? {
            Probe::Found(slot) => Ok(Some(core::mem::replace(
                self.table.storage_mut().value_mut(slot),
                value,
            ))),
            Probe::Vacant(slot) => {
                self.table.insert_at(slot, key, value);
                Ok(None)
            }
        }
    }

    /// Value stored under `key`, or the map's no value.
    pub fn get(&self, key: i32) -> Result<i32> {
        check_key(key)?;
        Ok(self
            .table
            .find(hash_key(&key), &key)
            .map_or(self.no_value, |slot| *self.table.storage().value(slot)))
    }

    /// Adds `amount` to the value under `key`, inserting `amount` if the key
    /// is absent. Returns the new value; arithmetic wraps.
    pub fn increment(&mut self, key: i32, amount: i32) -> Result<i32> {
        check_key(key)?;
        match self.table.probe_for_insert(hash_key(&key), &key, hash_key)? {
            Probe::Found(slot) => {
                let value = self.table.storage_mut().value_mut(slot);
                *value = value.wrapping_add(amount);
                Ok(*value)
            }
            Probe::Vacant(slot) => {
                self.table.insert_at(slot, key, amount);
                Ok(amount)
            }
        }
    }

    /// Subtracts one from the value under `key`, inserting `-1` if the key
    /// is absent. Returns the new value.
    pub fn decrement(&mut self, key: i32) -> Result<i32> {
        self.increment(key, -1)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: i32) -> Option<i32> {
        self.table
            .remove(hash_key(&key), &key)
            .map(|(_, value)| value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: i32) -> bool {
        self.table.find(hash_key(&key), &key).is_some()
    }

    /// Drops every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Iterates over `(key, value)` pairs in slot order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (i32, i32)> + '_ {
        let storage = self.table.storage();
        self.table
            .live_slots()
            .map(move |slot| (storage.key(slot), *storage.value(slot)))
    }

    /// Live keys in ascending order.
    pub fn keys_sorted(&self) -> Vec<i32> {
        let mut keys: Vec<i32> = self.iter().map(|(key, _)| key).collect();
        keys.sort_unstable();
        keys
    }

    /// Snapshot of the live values in slot order.
    pub fn copy_of_values(&self) -> Vec<i32> {
        self.iter().map(|(_, value)| value).collect()
    }

    /// Probe-length statistics of the current layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.table.probe_stats(hash_key)
    }
}

impl Default for UIntIntMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;

    use super::*;
    use crate::error::Error;

    #[test]
    fn negative_keys_rejected() {
        let mut map = UIntMap::new();
        assert_eq!(map.put(-1, "x"), Err(Error::IllegalKey { key: -1 }));
        assert_eq!(map.put(-2, "x"), Err(Error::IllegalKey { key: -2 }));
        assert!(map.get(-5).is_err());
        assert!(!map.contains_key(-1));
        assert_eq!(map.remove(-2), None);
        assert_eq!(map.put(0, "zero"), Ok(None));
        assert_eq!(map.get(0), Ok(Some(&"zero")));
        assert_eq!(map.put(i32::MAX, "max"), Ok(None));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn map_put_replace_remove() {
        let mut map: UIntMap<String> = UIntMap::new();
        assert_eq!(map.put(3, "a".to_string()), Ok(None));
        assert_eq!(map.put(3, "b".to_string()), Ok(Some("a".to_string())));
        if let Ok(Some(value)) = map.get_mut(3) {
            value.push('!');
        }
        assert_eq!(map.get(3), Ok(Some(&"b!".to_string())));
        assert_eq!(map.remove(3), Some("b!".to_string()));
        assert_eq!(map.remove(3), None);
        assert_eq!(map.get(3), Ok(None));
        assert!(map.is_empty());
    }

    #[test]
    fn map_sorted_views() {
        let mut map = UIntMap::new();
        for key in [30, 10, 20] {
            map.put(key, key * 2).unwrap();
        }
        assert_eq!(map.keys_sorted(), vec![10, 20, 30]);
        assert_eq!(map.values_sorted_by_key(), vec![&20, &40, &60]);
        assert_eq!(map.values().count(), 3);
    }

    #[test]
    fn map_survives_growth_from_one_slot() {
        let mut keys: Vec<i32> = (0..10_000).collect();
        keys.shuffle(&mut SmallRng::seed_from_u64(7));
        let mut map = UIntMap::with_capacity(1).unwrap();
        for &key in &keys {
            map.put(key, key as i64 * 3).unwrap();
        }
        assert_eq!(map.len(), 10_000);
        for key in 0..10_000 {
            assert_eq!(map.get(key), Ok(Some(&(key as i64 * 3))));
        }
        assert!(map.len() * 100 <= map.capacity() * 55);
    }

    #[test]
    fn set_operations() {
        let mut set = UIntSet::new();
        assert_eq!(set.add(4), Ok(true));
        assert_eq!(set.add(4), Ok(false));
        assert_eq!(set.add(0), Ok(true));
        assert!(set.add(-3).is_err());
        assert!(set.contains(4));
        assert!(!set.contains(-1));
        assert_eq!(set.keys_sorted(), vec![0, 4]);
        assert!(set.remove(4));
        assert!(!set.remove(4));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn int_map_no_value() {
        let map = UIntIntMap::new();
        assert_eq!(map.get(9), Ok(-1));
        let custom = UIntIntMap::new().with_no_value(i32::MIN);
        assert_eq!(custom.get(9), Ok(i32::MIN));
        assert_eq!(custom.no_value(), i32::MIN);
        assert!(map.get(-1).is_err());
    }

    #[test]
    fn int_map_counting() {
        let mut map = UIntIntMap::new();
        assert_eq!(map.increment(1, 5), Ok(5));
        assert_eq!(map.increment(1, 5), Ok(10));
        assert_eq!(map.decrement(1), Ok(9));
        assert_eq!(map.decrement(2), Ok(-1));
        assert_eq!(map.put(3, 30), Ok(None));
        assert_eq!(map.put(3, 31), Ok(Some(30)));
        assert_eq!(map.keys_sorted(), vec![1, 2, 3]);
        let mut values = map.copy_of_values();
        values.sort_unstable();
        assert_eq!(values, vec![-1, 9, 31]);
        assert_eq!(map.remove(2), Some(-1));
        assert!(!map.contains_key(2));
        assert_eq!(map.get(2), Ok(-1));
    }

    #[test]
    fn tombstone_churn_keeps_capacity() {
        let mut map = UIntIntMap::with_capacity(64).unwrap();
        for key in 0..20 {
            map.put(key, key).unwrap();
        }
        let capacity = map.capacity();
        for round in 0..1_000 {
            let key = round % 20;
            map.remove(key);
            map.put(key, round).unwrap();
        }
        assert_eq!(map.capacity(), capacity);
        assert_eq!(map.len(), 20);
    }
}
