use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::Error;
use crate::error::Result;
use crate::value_map::Entry;
use crate::value_map::Iter;
use crate::value_map::Keys;
use crate::value_map::ValueMap;

/// Value returned for absent keys.
pub const NO_VALUE: i32 = -1;

/// Narrows a computed count back to `i32`, rejecting negatives and anything
/// past `i32::MAX`.
#[inline(always)]
pub(crate) fn check_count(value: i64) -> Result<i32> {
    if value < 0 {
        return Err(Error::NegativeValue { value });
    }
    i32::try_from(value).map_err(|_| Error::ValueOverflow { value })
}

/// Map from hashable keys to non-negative `i32` counts.
///
/// Absent keys read as [`NO_VALUE`] (`-1`), which no stored value can equal.
/// Every operation that would store a negative value fails with
/// [`Error::NegativeValue`], and one that would count past `i32::MAX` fails
/// with [`Error::ValueOverflow`]. Either way the map is left unchanged.
#[derive(Clone)]
pub struct UIntValueMap<K, S = DefaultHashBuilder> {
    map: ValueMap<K, i32, S>,
}

impl<K, S> Debug for UIntValueMap<K, S>
where
    K: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.map.fmt(f)
    }
}

impl<K, S> UIntValueMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty map with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            map: ValueMap::with_hasher(hash_builder).with_no_value(NO_VALUE),
        }
    }

    /// Creates an empty map with `capacity` slots, rounded up to a power of
    /// two.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        Ok(Self {
            map: ValueMap::with_capacity_and_hasher(capacity, hash_builder)?
                .with_no_value(NO_VALUE),
        })
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Value stored for `key`, or [`NO_VALUE`].
    pub fn get(&self, key: &K) -> i32 {
        self.map.get(key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains(key)
    }

    /// Returns the stored key equal to `key`.
    pub fn lookup(&self, key: &K) -> Option<&K> {
        self.map.lookup(key)
    }

    /// Stores `value` under `key`, returning the previous value if any.
    ///
    /// # Panics
    ///
    /// Panics if the map would need more than `1 << 30` slots.
    pub fn put(&mut self, key: K, value: i32) -> Result<Option<i32>> {
        check_count(value as i64)?;
        Ok(self.map.put(key, value))
    }

    /// Adds one to the count of `key`, starting from zero. Fails without
    /// modifying the map if the count is already `i32::MAX`.
    pub fn increment(&mut self, key: K) -> Result<i32> {
        self.increment_by_amount(key, 1)
    }

    /// Adds `amount`, which may be negative, to the count of `key`, starting
    /// from zero. Fails without modifying the map if the result would be
    /// negative or overflow.
    pub fn increment_by_amount(&mut self, key: K, amount: i32) -> Result<i32> {
        self.map.upsert(key, |current| {
            check_count(current.unwrap_or(0) as i64 + amount as i64)
        })
    }

    /// Subtracts one from the count of `key`. Fails if the count would drop
    /// below zero, including when `key` is absent.
    pub fn decrement(&mut self, key: K) -> Result<i32> {
        self.increment_by_amount(key, -1)
    }

    /// Increments every key yielded by `keys` once. Stops at the first key
    /// whose count would overflow; keys before it stay counted.
    pub fn increment_all<I: IntoIterator<Item = K>>(&mut self, keys: I) -> Result<()> {
        for key in keys {
            self.increment(key)?;
        }
        Ok(())
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<i32> {
        self.map.remove(key)
    }

    /// Removes every entry for which `keep` returns `false`. Returns the
    /// number removed.
    pub fn retain(&mut self, keep: impl FnMut(&K, i32) -> bool) -> usize {
        self.map.retain(keep)
    }

    /// Drops every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterates over `(key, value)` pairs in slot order.
    pub fn entries(&self) -> Iter<'_, K, i32> {
        self.map.entries()
    }

    /// Iterates over keys in slot order.
    pub fn keys(&self) -> Keys<'_, K, i32> {
        self.map.keys()
    }

    /// Snapshot of the live values in slot order.
    pub fn copy_of_values(&self) -> Vec<i32> {
        self.map.copy_of_values()
    }

    /// Entries in slot order.
    pub fn entry_list(&self) -> Vec<Entry<'_, K, i32>> {
        self.map.entry_list()
    }

    /// Entries ordered by descending value.
    pub fn sorted_entry_list(&self) -> Vec<Entry<'_, K, i32>> {
        self.map.sorted_entry_list()
    }

    /// Number of entries with a value strictly greater than `value`.
    pub fn size_larger(&self, value: i32) -> usize {
        self.entries().filter(|&(_, v)| v > value).count()
    }

    /// Number of entries with a value strictly less than `value`.
    pub fn size_smaller(&self, value: i32) -> usize {
        self.entries().filter(|&(_, v)| v < value).count()
    }

    /// Largest stored value, or `0` when empty.
    pub fn max_value(&self) -> i32 {
        self.entries().map(|(_, v)| v).max().unwrap_or(0)
    }

    /// Smallest stored value, or `i32::MAX` when empty.
    pub fn min_value(&self) -> i32 {
        self.entries().map(|(_, v)| v).min().unwrap_or(i32::MAX)
    }

    /// Sum of every value.
    pub fn sum_of_values(&self) -> i64 {
        self.map.sum_of_values()
    }

    /// Sum of the values within `min..=max`.
    pub fn sum_of_values_in(&self, min: i32, max: i32) -> i64 {
        self.entries()
            .map(|(_, v)| v)
            .filter(|v| (min..=max).contains(v))
            .map(i64::from)
            .sum()
    }

    /// Probe-length statistics of the current layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.map.probe_stats()
    }
}

impl<K, S> UIntValueMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty map using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::UIntValueMap;
    ///
    /// let mut map: UIntValueMap<&str> = UIntValueMap::new();
    /// assert_eq!(map.get(&"a"), -1);
    /// map.put("a", 2).unwrap();
    /// assert!(map.put("b", -3).is_err());
    /// assert!(map.increment_by_amount("a", -5).is_err());
    /// assert_eq!(map.get(&"a"), 2);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty map with `capacity` slots using the default hasher
    /// builder.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, S> Default for UIntValueMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, S> IntoIterator for &'a UIntValueMap<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, K, i32>;
    type Item = (&'a K, i32);

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}
