//! Map from signed `i32` keys to values of any type.
//!
//! Every key except `i32::MIN` is legal. A map can be created *managed*, in
//! which case it never expands by itself: an insert that would need a new
//! slot past the threshold fails with [`Error::TableFull`] and the caller
//! decides when to call [`IntMap::expand`].

use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::error::Error;
use crate::error::Result;
use crate::hash::DEFAULT_CAPACITY;
use crate::hash::LoadPolicy;
use crate::int_slots::IntStorage;
use crate::int_slots::check_key;
use crate::raw_table::LiveSlots;
use crate::raw_table::Probe;
use crate::raw_table::RawTable;
use crate::uint_slots::hash_key;

/// Map from `i32` keys, `i32::MIN` excluded, to values of any type.
///
/// # Examples
///
/// ```rust
/// use probe_hash::IntMap;
///
/// let mut offsets = IntMap::new();
/// offsets.put(-3, "left").unwrap();
/// offsets.put(3, "right").unwrap();
/// assert_eq!(offsets.get(-3), Ok(Some(&"left")));
/// assert_eq!(offsets.get(0), Ok(None));
/// assert!(offsets.put(i32::MIN, "nowhere").is_err());
/// ```
#[derive(Clone)]
pub struct IntMap<T> {
    table: RawTable<IntStorage<T>>,
    managed: bool,
}

impl<T: Debug> Debug for IntMap<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T> IntMap<T> {
    /// Creates an empty map with the default capacity.
    pub fn new() -> Self {
        Self {
            table: RawTable::allocate(DEFAULT_CAPACITY, LoadPolicy::UNSIGNED),
            managed: false,
        }
    }

    /// Creates an empty map with `capacity` slots, rounded up to a power of
    /// two.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            table: RawTable::with_capacity(capacity, LoadPolicy::UNSIGNED)?,
            managed: false,
        })
    }

    /// Creates an empty map that only grows through [`expand`](Self::expand).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::Error;
    /// use probe_hash::IntMap;
    ///
    /// let mut map = IntMap::managed(4)?;
    /// map.put(1, 'a')?;
    /// map.put(2, 'b')?;
    /// assert_eq!(map.put(3, 'c'), Err(Error::TableFull { capacity: 4 }));
    ///
    /// map.expand()?;
    /// assert_eq!(map.put(3, 'c')?, None);
    /// # Ok::<(), Error>(())
    /// ```
    pub fn managed(capacity: usize) -> Result<Self> {
        Ok(Self {
            table: RawTable::with_capacity(capacity, LoadPolicy::UNSIGNED)?,
            managed: true,
        })
    }

    /// Returns `true` if the map only grows when [`expand`](Self::expand) is
    /// called.
    pub fn is_managed(&self) -> bool {
        self.managed
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

    /// Live entries plus tombstones at which a new key needs more slots.
    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    /// Stores `value` under `key`, returning the previous value if any.
    ///
    /// Replacing the value of a present key always succeeds. A managed map
    /// at its threshold rejects new keys with [`Error::TableFull`] unless the
    /// key can reuse a tombstone.
    pub fn put(&mut self, key: i32, value: T) -> Result<Option<T>> {
        check_key(key)?;
        let hash = hash_key(&key);
        let probe = if self.managed {
            match self.table.locate(hash, &key) {
                Probe::Vacant(slot) if self.table.must_expand_before(slot) => {
                    return Err(Error::TableFull {
                        capacity: self.capacity(),
                    });
                }
                probe => probe,
            }
        } else {
            self.table.probe_for_insert(hash, &key, hash_key)?
        };

        match probe {
            Probe::Found(slot) => Ok(self
                .table
                .storage_mut()
                .value_mut(slot)
                .map(|current| core::mem::replace(current, value))),
            Probe::Vacant(slot) => {
                self.table.insert_at(slot, key, value);
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
            .and_then(|slot| self.table.storage().value(slot)))
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut(&mut self, key: i32) -> Result<Option<&mut T>> {
        check_key(key)?;
        Ok(match self.table.find(hash_key(&key), &key) {
            Some(slot) => self.table.storage_mut().value_mut(slot),
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
            .map(|(_, value)| value)
    }

    /// Doubles the slot count and drops every tombstone. Unmanaged maps call
    /// this on their own; managed ones rely on the caller.
    pub fn expand(&mut self) -> Result<()> {
        self.table.grow(hash_key)
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

    /// Probe-length statistics of the current layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.table.probe_stats(hash_key)
    }
}

impl<T> Default for IntMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a IntMap<T> {
    type IntoIter = Iter<'a, T>;
    type Item = (i32, &'a T);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of an [`IntMap`].
pub struct Iter<'a, T> {
    slots: LiveSlots<'a, IntStorage<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (i32, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        let storage = self.slots.storage();
        storage.value(slot).map(|value| (storage.key(slot), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
