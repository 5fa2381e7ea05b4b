use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::Result;
use crate::uint_value_map::UIntValueMap;
use crate::uint_value_map::check_count;
use crate::value_map::Entry;
use crate::value_map::Keys;

/// Frequency counter over hashable items.
///
/// Counts are non-negative. Absent items have a count of `0`.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use probe_hash::Histogram;
///
/// let histogram: Histogram<&str> = "to be or not to be".split(' ').collect();
/// assert_eq!(histogram.count(&"be"), 2);
/// assert_eq!(histogram.count(&"maybe"), 0);
/// assert_eq!(histogram.total_count(), 6);
/// assert_eq!(histogram.top(2).len(), 2);
/// # }
/// ```
#[derive(Clone)]
pub struct Histogram<T, S = DefaultHashBuilder> {
    map: UIntValueMap<T, S>,
}

impl<T, S> Debug for Histogram<T, S>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.map.entries()).finish()
    }
}

impl<T, S> Histogram<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty histogram with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            map: UIntValueMap::with_hasher(hash_builder),
        }
    }

    /// Creates an empty histogram with `capacity` slots, rounded up to a
    /// power of two.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        Ok(Self {
            map: UIntValueMap::with_capacity_and_hasher(capacity, hash_builder)?,
        })
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Counts one occurrence of `item` and returns its new count. Fails
    /// without effect if the count is already `i32::MAX`.
    pub fn add(&mut self, item: T) -> Result<i32> {
        self.map.increment(item)
    }

    /// Adds `count` occurrences of `item`. A negative `count` subtracts; the
    /// call fails without effect if the result would be negative.
    pub fn add_count(&mut self, item: T, count: i32) -> Result<i32> {
        self.map.increment_by_amount(item, count)
    }

    /// Counts every item yielded by `items`. Stops at the first item whose
    /// count would overflow; items before it stay counted.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, items: I) -> Result<()> {
        self.map.increment_all(items)
    }

    /// Adds every count of `other` into this histogram.
    ///
    /// All sums are checked before any is stored, so a merge that would
    /// overflow a count fails and leaves this histogram untouched.
    pub fn merge<S2: BuildHasher>(&mut self, other: &Histogram<T, S2>) -> Result<()>
    where
        T: Clone,
    {
        for (item, count) in other.map.entries() {
            check_count(self.count(item) as i64 + count as i64)?;
        }
        for (item, count) in other.map.entries() {
            self.add_count(item.clone(), count)?;
        }
        Ok(())
    }

    /// Overwrites the count of `item`, returning the previous count if any.
    pub fn set(&mut self, item: T, count: i32) -> Result<Option<i32>> {
        self.map.put(item, count)
    }

    /// Decrements the count of `item` if it is positive. Returns the new
    /// count, or `0` if there was nothing to decrement.
    pub fn decrement_if_positive(&mut self, item: T) -> i32 {
        self.map.decrement(item).unwrap_or(0)
    }

    /// Count of `item`, `0` if it was never added.
    pub fn count(&self, item: &T) -> i32 {
        self.map.get(item).max(0)
    }

    /// Returns `true` if `item` has an entry, even one with a zero count.
    pub fn contains(&self, item: &T) -> bool {
        self.map.contains(item)
    }

    /// Returns the stored item equal to `item`.
    pub fn lookup(&self, item: &T) -> Option<&T> {
        self.map.lookup(item)
    }

    /// Removes `item`, returning its count.
    pub fn remove(&mut self, item: &T) -> Option<i32> {
        self.map.remove(item)
    }

    /// Removes each item yielded by `items`.
    pub fn remove_all<'a, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        for item in items {
            self.map.remove(item);
        }
    }

    /// Removes items counted fewer than `min_count` times. Returns how many
    /// were removed.
    pub fn remove_smaller(&mut self, min_count: i32) -> usize {
        self.map.retain(|_, count| count >= min_count)
    }

    /// Removes items counted more than `max_count` times. Returns how many
    /// were removed.
    pub fn remove_larger(&mut self, max_count: i32) -> usize {
        self.map.retain(|_, count| count <= max_count)
    }

    /// Number of items counted fewer than `amount` times.
    pub fn size_smaller(&self, amount: i32) -> usize {
        self.map.size_smaller(amount)
    }

    /// Number of items counted more than `amount` times.
    pub fn size_larger(&self, amount: i32) -> usize {
        self.map.size_larger(amount)
    }

    /// Sum of every count.
    pub fn total_count(&self) -> i64 {
        self.map.sum_of_values()
    }

    /// Sum of the counts that lie within `min..=max`.
    pub fn total_count_in(&self, min: i32, max: i32) -> i64 {
        self.map.sum_of_values_in(min, max)
    }

    /// Sum of the counts of each item yielded by `items`, duplicates
    /// included.
    pub fn total_count_of<'a, I>(&self, items: I) -> i64
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        items.into_iter().map(|item| self.count(item) as i64).sum()
    }

    /// Largest count, `0` when empty.
    pub fn max_value(&self) -> i32 {
        self.map.max_value()
    }

    /// Smallest count, `i32::MAX` when empty.
    pub fn min_value(&self) -> i32 {
        self.map.min_value()
    }

    /// Items counted exactly `count` times.
    pub fn items_with_count(&self, count: i32) -> Vec<&T> {
        self.items_with_count_in(count, count)
    }

    /// Items whose count lies within `min..=max`.
    pub fn items_with_count_in(&self, min: i32, max: i32) -> Vec<&T> {
        self.map
            .entries()
            .filter(|&(_, count)| (min..=max).contains(&count))
            .map(|(item, _)| item)
            .collect()
    }

    /// Percentage of the total count contributed by counts within
    /// `min..=max`. `0.0` for an empty histogram.
    pub fn count_percent(&self, min: i32, max: i32) -> f64 {
        let total = self.total_count();
        if total == 0 {
            return 0.0;
        }
        (self.total_count_in(min, max) as f64 * 100.0) / total as f64
    }

    /// The `n` most frequent items, most frequent first.
    pub fn top(&self, n: usize) -> Vec<&T> {
        let mut items = self.sorted_list();
        items.truncate(n);
        items
    }

    /// Items by descending count.
    pub fn sorted_list(&self) -> Vec<&T> {
        self.sorted_entry_list()
            .into_iter()
            .map(|entry| entry.key)
            .collect()
    }

    /// Items ordered by `compare`.
    pub fn sorted_list_by(&self, mut compare: impl FnMut(&T, &T) -> Ordering) -> Vec<&T> {
        let mut items: Vec<&T> = self.iter().collect();
        items.sort_by(|a, b| compare(*a, *b));
        items
    }

    /// Entries by descending count.
    pub fn sorted_entry_list(&self) -> Vec<Entry<'_, T, i32>> {
        self.map.sorted_entry_list()
    }

    /// Entries in slot order.
    pub fn entry_list(&self) -> Vec<Entry<'_, T, i32>> {
        self.map.entry_list()
    }

    /// Iterates over the distinct items in slot order.
    pub fn iter(&self) -> Keys<'_, T, i32> {
        self.map.keys()
    }

    /// Drops every count, keeping the current capacity.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Probe-length statistics of the current layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.map.probe_stats()
    }
}

impl<T, S> Histogram<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty histogram using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty histogram with `capacity` slots using the default
    /// hasher builder.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<T, S> Default for Histogram<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// # Panics
///
/// Panics if a count would pass `i32::MAX`. Use
/// [`add_all`](Histogram::add_all) to handle that as an error.
impl<T, S> Extend<T> for Histogram<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    #[track_caller]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.add_all(iter) {
            panic!("{err}");
        }
    }
}

/// # Panics
///
/// Panics if a count would pass `i32::MAX`.
impl<T, S> FromIterator<T> for Histogram<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    #[track_caller]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut histogram = Self::new();
        histogram.extend(iter);
        histogram
    }
}

impl<'a, T, S> IntoIterator for &'a Histogram<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Keys<'a, T, i32>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
