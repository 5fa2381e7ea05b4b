use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

use crate::DefaultHashBuilder;
use crate::error::Result;
use crate::hash::DEFAULT_CAPACITY;
use crate::hash::LoadPolicy;
use crate::object_slots::ObjectStorage;
use crate::object_slots::hash_key;
use crate::object_slots::or_capacity_overflow;
use crate::raw_table::LiveSlots;
use crate::raw_table::Probe;
use crate::raw_table::RawTable;
use crate::value::Numeric;

/// A key and its value, borrowed from a table.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<'a, K, V> {
    /// The stored key.
    pub key: &'a K,
    /// The value stored with it.
    pub value: V,
}

/// Sorts entries by descending value. Ties keep slot order.
pub(crate) fn sort_descending<K, V: Numeric>(entries: &mut [Entry<'_, K, V>]) {
    entries.sort_by(|a, b| b.value.order(&a.value));
}

/// Map from hashable keys to a numeric value, with counting operations.
///
/// Absent keys read as the map's *no value*, `0` unless configured with
/// [`with_no_value`](Self::with_no_value). Integer arithmetic wraps.
///
/// See the [`CountSet`], [`IntValueMap`], [`FloatValueMap`] and
/// [`DoubleValueMap`] aliases.
#[derive(Clone)]
pub struct ValueMap<K, V, S = DefaultHashBuilder> {
    table: RawTable<ObjectStorage<K, V>>,
    hash_builder: S,
    no_value: V,
}

/// Counts occurrences of keys.
pub type CountSet<K, S = DefaultHashBuilder> = ValueMap<K, i32, S>;

/// Keys to `i32` values.
pub type IntValueMap<K, S = DefaultHashBuilder> = ValueMap<K, i32, S>;

/// Keys to `f32` values.
pub type FloatValueMap<K, S = DefaultHashBuilder> = ValueMap<K, f32, S>;

/// Keys to `f64` values.
pub type DoubleValueMap<K, S = DefaultHashBuilder> = ValueMap<K, f64, S>;

impl<K, V, S> Debug for ValueMap<K, V, S>
where
    K: Debug + Hash + Eq,
    V: Numeric,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

impl<K, V, S> ValueMap<K, V, S>
where
    K: Hash + Eq,
    V: Numeric,
    S: BuildHasher,
{
    /// Creates an empty map with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: RawTable::allocate(DEFAULT_CAPACITY, LoadPolicy::OBJECT),
            hash_builder,
            no_value: V::ZERO,
        }
    }

    /// Creates an empty map with `capacity` slots, rounded up to a power of
    /// two.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        Ok(Self {
            table: RawTable::with_capacity(capacity, LoadPolicy::OBJECT)?,
            hash_builder,
            no_value: V::ZERO,
        })
    }

    /// Sets the value [`get`](Self::get) returns for absent keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::IntValueMap;
    ///
    /// let map: IntValueMap<&str> = IntValueMap::new().with_no_value(-1);
    /// assert_eq!(map.get(&"missing"), -1);
    /// # }
    /// ```
    pub fn with_no_value(mut self, no_value: V) -> Self {
        self.no_value = no_value;
        self
    }

    /// Value returned by [`get`](Self::get) for absent keys.
    pub fn no_value(&self) -> V {
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

    #[inline(always)]
    fn slot_of(&self, key: &K) -> Option<usize> {
        self.table.find(hash_key(&self.hash_builder, key), key)
    }

    /// Value stored for `key`, or the map's no value.
    pub fn get(&self, key: &K) -> V {
        self.slot_of(key)
            .map_or(self.no_value, |slot| *self.table.storage().value(slot))
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.slot_of(key).is_some()
    }

    /// Returns the stored key equal to `key`.
    pub fn lookup(&self, key: &K) -> Option<&K> {
        let slot = self.slot_of(key)?;
        self.table.storage().key(slot)
    }

    /// Single-probe read-modify-write. `f` sees the current value, if any,
    /// and returns the value to store. When `f` fails, nothing is written.
    ///
    /// Panics if the map would need more than `1 << 30` slots.
    pub(crate) fn upsert<E>(
        &mut self,
        key: K,
        f: impl FnOnce(Option<V>) -> Result<V, E>,
    ) -> Result<V, E> {
        let hash = hash_key(&self.hash_builder, &key);
        let hash_builder = &self.hash_builder;
        let probe = or_capacity_overflow(
            self.table
                .probe_for_insert(hash, &key, |k| hash_key(hash_builder, k)),
        );
        match probe {
            Probe::Found(slot) => {
                let value = self.table.storage_mut().value_mut(slot);
                let next = f(Some(*value))?;
                *value = next;
                Ok(next)
            }
            Probe::Vacant(slot) => {
                let next = f(None)?;
                self.table.insert_at(slot, key, next);
                Ok(next)
            }
        }
    }

    /// Stores `value` under `key`, returning the previous value if any.
    ///
    /// # Panics
    ///
    /// Panics if the map would need more than `1 << 30` slots.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let mut previous = None;
        let Ok(_) = self.upsert::<Infallible>(key, |current| {
            previous = current;
            Ok(value)
        });
        previous
    }

    /// Adds `amount` to the value under `key`, starting from zero if the key
    /// is absent. Returns the new value.
    ///
    /// # Panics
    ///
    /// Panics if the map would need more than `1 << 30` slots.
    pub fn increment_by_amount(&mut self, key: K, amount: V) -> V {
        let Ok(next) = self.upsert::<Infallible>(key, |current| {
            Ok(current.map_or(amount, |value| value.plus(amount)))
        });
        next
    }

    /// Adds one to the value under `key`. Returns the new value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::CountSet;
    ///
    /// let mut counts: CountSet<&str> = CountSet::new();
    /// counts.increment("a");
    /// assert_eq!(counts.increment("a"), 2);
    /// assert_eq!(counts.get(&"b"), 0);
    /// # }
    /// ```
    pub fn increment(&mut self, key: K) -> V {
        self.increment_by_amount(key, V::ONE)
    }

    /// Subtracts one from the value under `key`, starting from zero if the
    /// key is absent. Returns the new value.
    pub fn decrement(&mut self, key: K) -> V {
        let Ok(next) = self.upsert::<Infallible>(key, |current| {
            Ok(current.unwrap_or(V::ZERO).minus(V::ONE))
        });
        next
    }

    /// Increments every key yielded by `keys` once.
    pub fn increment_all<I: IntoIterator<Item = K>>(&mut self, keys: I) {
        for key in keys {
            self.increment(key);
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = hash_key(&self.hash_builder, key);
        self.table.remove(hash, key).map(|(_, value)| value)
    }

    /// Removes every entry for which `keep` returns `false`. Returns the
    /// number removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&K, V) -> bool) -> usize {
        self.table.retain(|storage, slot| match storage.entry(slot) {
            Some((key, value)) => keep(key, *value),
            None => true,
        })
    }

    /// Drops every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Iterates over `(key, value)` pairs in slot order.
    ///
    /// The borrow on the map prevents mutation while the iterator is alive.
    pub fn entries(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.table.live_slots(),
        }
    }

    /// Iterates over keys in slot order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            slots: self.table.live_slots(),
        }
    }

    /// Snapshot of the live values in slot order.
    pub fn copy_of_values(&self) -> Vec<V> {
        self.entries().map(|(_, value)| value).collect()
    }

    /// Entries in slot order.
    pub fn entry_list(&self) -> Vec<Entry<'_, K, V>> {
        self.entries()
            .map(|(key, value)| Entry { key, value })
            .collect()
    }

    /// Entries ordered by descending value.
    pub fn sorted_entry_list(&self) -> Vec<Entry<'_, K, V>> {
        let mut entries = self.entry_list();
        sort_descending(&mut entries);
        entries
    }

    /// Sum of every value, accumulated in the wider type.
    pub fn sum_of_values(&self) -> V::Sum {
        self.entries()
            .fold(V::Sum::default(), |sum, (_, value)| sum + value.widen())
    }

    /// Probe-length statistics of the current layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.table
            .probe_stats(|k| hash_key(&self.hash_builder, k))
    }
}

impl<K, V, S> ValueMap<K, V, S>
where
    K: Hash + Eq,
    V: Numeric,
    S: BuildHasher + Default,
{
    /// Creates an empty map using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty map with `capacity` slots using the default hasher
    /// builder.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S> Default for ValueMap<K, V, S>
where
    K: Hash + Eq,
    V: Numeric,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, V, S> IntoIterator for &'a ValueMap<K, V, S>
where
    K: Hash + Eq,
    V: Numeric,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, V);

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

/// Iterator over the entries of a [`ValueMap`].
pub struct Iter<'a, K, V> {
    slots: LiveSlots<'a, ObjectStorage<K, V>>,
}

impl<'a, K: Eq, V: Numeric> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        let (key, value) = self.slots.storage().entry(slot)?;
        Some((key, *value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<K: Eq, V: Numeric> ExactSizeIterator for Iter<'_, K, V> {}

impl<K: Eq, V: Numeric> FusedIterator for Iter<'_, K, V> {}

/// Iterator over the keys of a [`ValueMap`].
pub struct Keys<'a, K, V> {
    slots: LiveSlots<'a, ObjectStorage<K, V>>,
}

impl<'a, K: Eq, V: Numeric> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        self.slots.storage().key(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<K: Eq, V: Numeric> ExactSizeIterator for Keys<'_, K, V> {}

impl<K: Eq, V: Numeric> FusedIterator for Keys<'_, K, V> {}
