//! Primitive-keyed maps that pack each key/value pair into one `u64`.
//!
//! The key occupies the low 32 bits and the value's raw bits the high 32.
//! Keys `i32::MIN` and `i32::MIN + 1` are reserved as the empty and tombstone
//! markers; every other `i32` is a legal key.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use crate::error::Error;
use crate::error::Result;
use crate::hash::DEFAULT_CAPACITY;
use crate::hash::LoadPolicy;
use crate::raw_table::LiveSlots;
use crate::raw_table::Probe;
use crate::raw_table::RawTable;
use crate::raw_table::SlotState;
use crate::raw_table::Storage;
use crate::value::PackedValue;

/// Key marking a never-used slot.
pub const EMPTY: i32 = i32::MIN;
/// Key marking a tombstone.
pub const DELETED: i32 = i32::MIN + 1;

const KEY_MASK: u64 = 0x0000_0000_FFFF_FFFF;
const VALUE_MASK: u64 = 0xFFFF_FFFF_0000_0000;

/// Packs `key` into the low half and `value` into the high half.
#[inline(always)]
pub const fn pack(key: i32, value: u32) -> u64 {
    (key as u32 as u64) | ((value as u64) << 32)
}

/// Key half of a packed slot, sign-restored.
#[inline(always)]
pub const fn key_of(slot: u64) -> i32 {
    slot as u32 as i32
}

/// Value half of a packed slot.
#[inline(always)]
pub const fn value_of(slot: u64) -> u32 {
    (slot >> 32) as u32
}

/// Replaces the key half, keeping the value half.
#[inline(always)]
pub const fn with_key(slot: u64, key: i32) -> u64 {
    (slot & VALUE_MASK) | (key as u32 as u64)
}

/// Replaces the value half, keeping the key half.
#[inline(always)]
pub const fn with_value(slot: u64, value: u32) -> u64 {
    (slot & KEY_MASK) | ((value as u64) << 32)
}

#[inline(always)]
fn check_key(key: i32) -> Result<()> {
    if key <= DELETED {
        return Err(Error::IllegalKey { key: key as i64 });
    }
    Ok(())
}

#[inline(always)]
fn hash_key(key: &i32) -> u32 {
    *key as u32
}

#[derive(Clone)]
pub(crate) struct PackedStorage<V> {
    slots: Vec<u64>,
    _value: PhantomData<V>,
}

impl<V: PackedValue> PackedStorage<V> {
    #[inline(always)]
    fn read(&self, slot: usize) -> V {
        V::from_bits(value_of(self.slots[slot]))
    }

    #[inline(always)]
    fn write(&mut self, slot: usize, value: V) {
        self.slots[slot] = with_value(self.slots[slot], value.to_bits());
    }

    #[inline(always)]
    fn pair(&self, slot: usize) -> (i32, V) {
        let packed = self.slots[slot];
        (key_of(packed), V::from_bits(value_of(packed)))
    }
}

impl<V: PackedValue> Storage for PackedStorage<V> {
    type Key = i32;
    type Value = V;

    fn allocate(slots: usize) -> Self {
        Self {
            slots: vec![pack(EMPTY, 0); slots],
            _value: PhantomData,
        }
    }

    #[inline(always)]
    fn slots(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    fn state(&self, slot: usize) -> SlotState {
        match key_of(self.slots[slot]) {
            EMPTY => SlotState::Empty,
            DELETED => SlotState::Tombstone,
            _ => SlotState::Live,
        }
    }

    #[inline(always)]
    fn with_key<R>(&self, slot: usize, f: impl FnOnce(&i32) -> R) -> Option<R> {
        let key = key_of(self.slots[slot]);
        (key > DELETED).then(|| f(&key))
    }

    #[inline(always)]
    fn holds(&self, slot: usize, key: &i32) -> bool {
        key_of(self.slots[slot]) == *key && *key > DELETED
    }

    #[inline(always)]
    fn fill(&mut self, slot: usize, key: i32, value: V) {
        self.slots[slot] = pack(key, value.to_bits());
    }

    fn bury(&mut self, slot: usize) -> Option<(i32, V)> {
        let packed = self.slots[slot];
        let key = key_of(packed);
        if key <= DELETED {
            return None;
        }
        self.slots[slot] = with_key(packed, DELETED);
        Some((key, V::from_bits(value_of(packed))))
    }
}

/// Open-addressing map from `i32` keys to 32-bit values, one `u64` per slot.
///
/// Absent keys read as [`PackedValue::NO_RESULT`] (`i32::MIN`, or
/// `i32::MIN as f32`). That value is also a storable value, so use
/// [`contains_key`](Self::contains_key) when the distinction matters.
///
/// Keys `i32::MIN` and `i32::MIN + 1` are reserved: inserting or reading
/// them fails with [`Error::IllegalKey`].
///
/// Smaller tables are kept denser than larger ones; the load factor falls
/// from 0.90 at four slots to 0.50 past 2048.
#[derive(Clone)]
pub struct PackedMap<V> {
    table: RawTable<PackedStorage<V>>,
}

/// `i32` to `i32` packed map.
pub type IntIntMap = PackedMap<i32>;

/// `i32` to `f32` packed map.
pub type IntFloatMap = PackedMap<f32>;

impl<V: PackedValue> PackedMap<V> {
    /// Value returned by [`get`](Self::get) for absent keys.
    pub const NO_RESULT: V = V::NO_RESULT;

    /// Creates an empty map with the default capacity.
    pub fn new() -> Self {
        Self {
            table: RawTable::allocate(DEFAULT_CAPACITY, LoadPolicy::Scaled),
        }
    }

    /// Creates an empty map with `capacity` slots, rounded up to a power of
    /// two.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            table: RawTable::with_capacity(capacity, LoadPolicy::Scaled)?,
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

    /// Live plus tombstoned slots at which the next insert expands the map.
    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    /// Tombstoned slots awaiting reuse or the next expansion.
    pub fn tombstones(&self) -> usize {
        self.table.removed()
    }

    /// Value stored for `key`, or [`NO_RESULT`](Self::NO_RESULT).
    pub fn get(&self, key: i32) -> Result<V> {
        check_key(key)?;
        Ok(self
            .table
            .find(hash_key(&key), &key)
            .map_or(V::NO_RESULT, |slot| self.table.storage().read(slot)))
    }

    /// Stores `value` under `key`, returning the previous value if any.
    pub fn put(&mut self, key: i32, value: V) -> Result<Option<V>> {
        check_key(key)?;
        match self.table.probe_for_insert(hash_key(&key), &key, hash_key)? {
            Probe::Found(slot) => {
                let previous = self.table.storage().read(slot);
                self.table.storage_mut().write(slot, value);
                Ok(Some(previous))
            }
            Probe::Vacant(slot) => {
                self.table.insert_at(slot, key, value);
                Ok(None)
            }
        }
    }

    /// Adds `delta` to the value under `key`, inserting `delta` if the key is
    /// absent, in a single probe. Returns the new value. Integer values wrap
    /// on overflow.
    pub fn increment(&mut self, key: i32, delta: V) -> Result<V> {
        check_key(key)?;
        match self.table.probe_for_insert(hash_key(&key), &key, hash_key)? {
            Probe::Found(slot) => {
                let next = self.table.storage().read(slot).plus(delta);
                self.table.storage_mut().write(slot, next);
                Ok(next)
            }
            Probe::Vacant(slot) => {
                self.table.insert_at(slot, key, delta);
                Ok(delta)
            }
        }
    }

    /// Removes `key`, returning its value. Reserved keys are never present.
    pub fn remove(&mut self, key: i32) -> Option<V> {
        self.table.remove(hash_key(&key), &key).map(|(_, value)| value)
    }

    /// Returns `true` if `key` is present. Reserved keys are never present.
    pub fn contains_key(&self, key: i32) -> bool {
        self.table.find(hash_key(&key), &key).is_some()
    }

    /// Drops every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Live keys in slot order.
    pub fn keys(&self) -> Vec<i32> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Live values in slot order.
    pub fn values(&self) -> Vec<V> {
        self.iter().map(|(_, value)| value).collect()
    }

    /// Live pairs in slot order.
    pub fn pairs(&self) -> Vec<(i32, V)> {
        self.iter().collect()
    }

    /// Iterates over live pairs in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.table.live_slots(),
        }
    }

    /// Probe-length statistics of the current layout.
    #[cfg(feature = "stats")]
    pub fn probe_stats(&self) -> crate::ProbeStats {
        self.table.probe_stats(hash_key)
    }
}

impl<V: PackedValue> Default for PackedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PackedValue> Debug for PackedMap<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V: PackedValue> IntoIterator for &'a PackedMap<V> {
    type IntoIter = Iter<'a, V>;
    type Item = (i32, V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the pairs of a [`PackedMap`].
pub struct Iter<'a, V> {
    slots: LiveSlots<'a, PackedStorage<V>>,
}

impl<V: PackedValue> Iterator for Iter<'_, V> {
    type Item = (i32, V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        Some(self.slots.storage().pair(slot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<V: PackedValue> ExactSizeIterator for Iter<'_, V> {}

impl<V: PackedValue> FusedIterator for Iter<'_, V> {}
