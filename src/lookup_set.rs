use alloc::vec::Vec;
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

/// A set that hands back the canonical stored instance of a key.
///
/// Useful for interning: [`get_or_add`](Self::get_or_add) returns the stored
/// value that equals the argument, inserting the argument if there was none.
///
/// Keys are compared with `Eq` and hashed with `S`. The table expands when
/// live plus removed entries reach 70% of its slots.
#[derive(Clone)]
pub struct LookupSet<T, S = DefaultHashBuilder> {
    table: RawTable<ObjectStorage<T, ()>>,
    hash_builder: S,
}

impl<T, S> Debug for LookupSet<T, S>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> LookupSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty set with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: RawTable::allocate(DEFAULT_CAPACITY, LoadPolicy::OBJECT),
            hash_builder,
        }
    }

    /// Creates an empty set with `capacity` slots, rounded up to a power of
    /// two.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self> {
        Ok(Self {
            table: RawTable::with_capacity(capacity, LoadPolicy::OBJECT)?,
            hash_builder,
        })
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Adds `key`, returning `true` if it was not already present. An equal
    /// stored key is kept, and `key` is dropped.
    ///
    /// # Panics
    ///
    /// Panics if the set would need more than `1 << 30` slots.
    pub fn add(&mut self, key: T) -> bool {
        let hash = hash_key(&self.hash_builder, &key);
        let hash_builder = &self.hash_builder;
        let probe = or_capacity_overflow(
            self.table
                .probe_for_insert(hash, &key, |k| hash_key(hash_builder, k)),
        );
        match probe {
            Probe::Found(_) => false,
            Probe::Vacant(slot) => {
                self.table.insert_at(slot, key, ());
                true
            }
        }
    }

    /// Returns the stored key equal to `key`, inserting `key` first if there
    /// is none.
    ///
    /// # Panics
    ///
    /// Panics if the set would need more than `1 << 30` slots.
    pub fn get_or_add(&mut self, key: T) -> &T {
        let hash = hash_key(&self.hash_builder, &key);
        let hash_builder = &self.hash_builder;
        let probe = or_capacity_overflow(
            self.table
                .probe_for_insert(hash, &key, |k| hash_key(hash_builder, k)),
        );
        let slot = match probe {
            Probe::Found(slot) => slot,
            Probe::Vacant(slot) => {
                self.table.insert_at(slot, key, ());
                slot
            }
        };
        match self.table.storage().key(slot) {
            Some(stored) => stored,
            None => unreachable!("slot {slot} was just probed or filled"),
        }
    }

    /// Returns the stored key equal to `key`.
    pub fn lookup(&self, key: &T) -> Option<&T> {
        let slot = self.table.find(hash_key(&self.hash_builder, key), key)?;
        self.table.storage().key(slot)
    }

    /// Returns `true` if a key equal to `key` is stored.
    pub fn contains(&self, key: &T) -> bool {
        self.table
            .find(hash_key(&self.hash_builder, key), key)
            .is_some()
    }

    /// Removes and returns the stored key equal to `key`.
    pub fn remove(&mut self, key: &T) -> Option<T> {
        let hash = hash_key(&self.hash_builder, key);
        self.table.remove(hash, key).map(|(stored, ())| stored)
    }

    /// Drops every key, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Iterates over the stored keys in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.table.live_slots(),
        }
    }

    /// Stored keys in slot order.
    pub fn key_list(&self) -> Vec<&T> {
        self.iter().collect()
    }

    /// Probe-length statistics of the current layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.table
            .probe_stats(|k| hash_key(&self.hash_builder, k))
    }
}

impl<T, S> LookupSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty set using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::LookupSet;
    ///
    /// let mut words: LookupSet<String> = LookupSet::new();
    /// let first = words.get_or_add("tree".to_string()) as *const String;
    /// let second = words.get_or_add("tree".to_string()) as *const String;
    /// assert_eq!(first, second);
    /// assert_eq!(words.len(), 1);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty set with `capacity` slots using the default hasher
    /// builder.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<T, S> Default for LookupSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> Extend<T> for LookupSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.add(key);
        }
    }
}

impl<T, S> FromIterator<T> for LookupSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, T, S> IntoIterator for &'a LookupSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the keys of a [`LookupSet`].
pub struct Iter<'a, T> {
    slots: LiveSlots<'a, ObjectStorage<T, ()>>,
}

impl<'a, T: Eq> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        self.slots.storage().key(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<T: Eq> ExactSizeIterator for Iter<'_, T> {}

impl<T: Eq> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone, Default)]
    struct SipBuilder;

    impl BuildHasher for SipBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new()
        }
    }

    #[test]
    fn get_or_add_returns_canonical_instance() {
        let mut set: LookupSet<String, SipBuilder> = LookupSet::new();
        let first = set.get_or_add("apple".to_string()) as *const String;
        let again = set.get_or_add("apple".to_string()) as *const String;
        assert_eq!(first, again);
        assert_eq!(set.len(), 1);
        assert_eq!(set.lookup(&"apple".to_string()), Some(&"apple".to_string()));
        assert_eq!(set.lookup(&"pear".to_string()), None);
    }

    #[test]
    fn add_reports_novelty() {
        let mut set: LookupSet<u64, SipBuilder> = LookupSet::new();
        assert!(set.add(1));
        assert!(!set.add(1));
        assert!(set.add(2));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert_eq!(set.remove(&1), Some(1));
        assert_eq!(set.remove(&1), None);
        assert!(!set.contains(&1));
        assert!(set.add(1));
    }

    #[test]
    fn grows_and_keeps_everything() {
        let mut set: LookupSet<u32, SipBuilder> = LookupSet::new();
        for i in 0..5000 {
            set.add(i);
        }
        assert_eq!(set.len(), 5000);
        assert!(set.capacity().is_power_of_two());
        assert!(set.len() * 10 <= set.capacity() * 7);
        for i in 0..5000 {
            assert!(set.contains(&i));
        }
        let mut keys: Vec<u32> = set.iter().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..5000).collect::<Vec<_>>());
    }

    #[test]
    fn collect_and_extend() {
        let mut set: LookupSet<&str, SipBuilder> = ["a", "b", "a"].into_iter().collect();
        assert_eq!(set.len(), 2);
        set.extend(["c", "b"]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.key_list().len(), 3);
    }

    #[test]
    fn with_capacity_rejects_zero() {
        assert!(LookupSet::<u8, SipBuilder>::with_capacity(0).is_err());
        assert_eq!(
            LookupSet::<u8, SipBuilder>::with_capacity(9)
                .unwrap()
                .capacity(),
            16
        );
    }
}
