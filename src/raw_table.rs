//! The linear-probing engine behind every table in the crate.
//!
//! [`RawTable`] owns the probe loop, the tombstone bookkeeping and the
//! expansion policy. How a slot is laid out in memory is left to a
//! [`Storage`] strategy, so `locate` and `expand` are written once for the
//! object-key, sentinel-integer and bit-packed layouts alike.

#[cfg(feature = "stats")]
use alloc::vec::Vec;

use crate::error::Error;
use crate::error::Result;
use crate::hash::LoadPolicy;
use crate::hash::MAX_CAPACITY;
use crate::hash::first_probe;
use crate::hash::next_probe;
use crate::hash::slot_count;

/// What a single slot currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SlotState {
    Empty,
    Tombstone,
    Live,
}

/// Outcome of walking a probe sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Probe {
    /// The key lives in this slot.
    Found(usize),
    /// The key is absent; this is where it should be inserted. Points at the
    /// first tombstone on the probe path if one was passed, otherwise at the
    /// terminating empty slot.
    Vacant(usize),
}

/// Slot layout strategy.
///
/// Implementations only move keys and values in and out of slots; they never
/// decide where a key goes.
pub(crate) trait Storage: Sized {
    type Key: Eq;
    type Value;

    /// Allocates `slots` empty slots. `slots` is a power of two.
    fn allocate(slots: usize) -> Self;

    fn slots(&self) -> usize;

    fn state(&self, slot: usize) -> SlotState;

    /// Runs `f` on the key in `slot`, or returns `None` if the slot is not
    /// live.
    fn with_key<R>(&self, slot: usize, f: impl FnOnce(&Self::Key) -> R) -> Option<R>;

    /// Writes a key and value into an empty or tombstoned slot.
    fn fill(&mut self, slot: usize, key: Self::Key, value: Self::Value);

    /// Marks a live slot as a tombstone and hands back what it held.
    fn bury(&mut self, slot: usize) -> Option<(Self::Key, Self::Value)>;

    #[inline(always)]
    fn holds(&self, slot: usize, key: &Self::Key) -> bool {
        self.with_key(slot, |k| k == key).unwrap_or(false)
    }
}

/// Open-addressing table with linear probing and tombstone deletion.
///
/// Invariants, holding between calls:
/// - the slot count is a power of two;
/// - `live + removed <= threshold < slot count`, so every probe sequence
///   reaches an empty slot;
/// - `live` and `removed` match the number of live and tombstoned slots.
#[derive(Clone)]
pub(crate) struct RawTable<S> {
    storage: S,
    live: usize,
    removed: usize,
    threshold: usize,
    policy: LoadPolicy,
}

impl<S: Storage> RawTable<S> {
    /// Creates a table with `requested` slots rounded up to a power of two.
    pub(crate) fn with_capacity(requested: usize, policy: LoadPolicy) -> Result<Self> {
        let slots = slot_count(requested)?;
        Ok(Self::allocate(slots, policy))
    }

    /// `slots` must already be a power of two no larger than `MAX_CAPACITY`.
    pub(crate) fn allocate(slots: usize, policy: LoadPolicy) -> Self {
        debug_assert!(slots.is_power_of_two() && slots <= MAX_CAPACITY);
        Self {
            storage: S::allocate(slots),
            live: 0,
            removed: 0,
            threshold: policy.threshold_for(slots),
            policy,
        }
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.storage.slots()
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Tombstoned slots accumulated since the last expansion.
    #[inline(always)]
    pub(crate) fn removed(&self) -> usize {
        self.removed
    }

    #[inline(always)]
    pub(crate) fn threshold(&self) -> usize {
        self.threshold
    }

    #[inline(always)]
    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }

    #[inline(always)]
    pub(crate) fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.capacity() - 1
    }

    /// Walks the probe sequence for `key`. Tombstones are stepped over, but
    /// the first one seen is remembered so an insert can reuse it.
    pub(crate) fn locate(&self, hash: u32, key: &S::Key) -> Probe {
        let mask = self.mask();
        let mut slot = first_probe(hash, mask);
        let mut tombstone = None;
        loop {
            match self.storage.state(slot) {
                SlotState::Empty => return Probe::Vacant(tombstone.unwrap_or(slot)),
                SlotState::Tombstone => {
                    if tombstone.is_none() {
                        tombstone = Some(slot);
                    }
                }
                SlotState::Live => {
                    if self.storage.holds(slot, key) {
                        return Probe::Found(slot);
                    }
                }
            }
            slot = next_probe(slot, mask);
        }
    }

    /// Lookup-only probe.
    pub(crate) fn find(&self, hash: u32, key: &S::Key) -> Option<usize> {
        let mask = self.mask();
        let mut slot = first_probe(hash, mask);
        loop {
            match self.storage.state(slot) {
                SlotState::Empty => return None,
                SlotState::Live if self.storage.holds(slot, key) => return Some(slot),
                _ => slot = next_probe(slot, mask),
            }
        }
    }

    /// Probes for `key` ahead of an insert.
    ///
    /// A live match or a reusable tombstone is returned as is. Only when the
    /// insert would consume a fresh empty slot and the table is at its
    /// threshold does the table expand first, in which case the returned
    /// vacancy refers to the expanded table.
    pub(crate) fn probe_for_insert(
        &mut self,
        hash: u32,
        key: &S::Key,
        hasher: impl Fn(&S::Key) -> u32,
    ) -> Result<Probe> {
        match self.locate(hash, key) {
            Probe::Vacant(slot) if self.must_expand_before(slot) => {
                self.expand(hasher)?;
                Ok(Probe::Vacant(self.first_empty(hash)))
            }
            probe => Ok(probe),
        }
    }

    /// Whether filling the vacant `slot` would push the table past its
    /// threshold. Reused tombstones never do.
    #[inline(always)]
    pub(crate) fn must_expand_before(&self, slot: usize) -> bool {
        self.storage.state(slot) == SlotState::Empty && self.live + self.removed >= self.threshold
    }

    /// Doubles the slot count on request, for tables that do not expand on
    /// their own.
    pub(crate) fn grow(&mut self, hasher: impl Fn(&S::Key) -> u32) -> Result<()> {
        self.expand(hasher)
    }

    /// Stores `key` in a slot returned as [`Probe::Vacant`].
    pub(crate) fn insert_at(&mut self, slot: usize, key: S::Key, value: S::Value) {
        if self.storage.state(slot) == SlotState::Tombstone {
            log::trace!("reusing tombstone at slot {slot}");
            self.removed -= 1;
        }
        self.storage.fill(slot, key, value);
        self.live += 1;
        debug_assert!(self.live + self.removed <= self.threshold.max(1));
    }

    /// Tombstones the slot holding `key`. Never shrinks the table.
    pub(crate) fn remove(&mut self, hash: u32, key: &S::Key) -> Option<(S::Key, S::Value)> {
        let slot = self.find(hash, key)?;
        self.remove_at(slot)
    }

    pub(crate) fn remove_at(&mut self, slot: usize) -> Option<(S::Key, S::Value)> {
        let buried = self.storage.bury(slot)?;
        self.live -= 1;
        self.removed += 1;
        Some(buried)
    }

    /// Tombstones every live slot for which `keep` returns `false` and
    /// returns how many were removed.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&S, usize) -> bool) -> usize {
        let mut dropped = 0;
        for slot in 0..self.capacity() {
            if self.storage.state(slot) == SlotState::Live
                && !keep(&self.storage, slot)
                && self.remove_at(slot).is_some()
            {
                dropped += 1;
            }
        }
        dropped
    }

    /// Drops every entry while keeping the current slot count.
    pub(crate) fn clear(&mut self) {
        *self = Self::allocate(self.capacity(), self.policy);
    }

    /// Live slot indices in array order.
    pub(crate) fn live_slots(&self) -> LiveSlots<'_, S> {
        LiveSlots {
            storage: &self.storage,
            next: 0,
            remaining: self.live,
        }
    }

    /// First empty slot on `hash`'s probe path. Only valid right after an
    /// expansion, when the table holds no tombstones.
    fn first_empty(&self, hash: u32) -> usize {
        let mask = self.mask();
        let mut slot = first_probe(hash, mask);
        while self.storage.state(slot) != SlotState::Empty {
            slot = next_probe(slot, mask);
        }
        slot
    }

    /// Doubles the slot count and re-inserts every live entry. Tombstones are
    /// not carried over. The new storage is fully built before it replaces
    /// the old one.
    #[cold]
    fn expand(&mut self, hasher: impl Fn(&S::Key) -> u32) -> Result<()> {
        let old_capacity = self.capacity();
        let new_capacity = old_capacity
            .checked_mul(2)
            .filter(|&slots| slots <= MAX_CAPACITY)
            .ok_or(Error::IllegalCapacity {
                requested: old_capacity.saturating_mul(2),
                max: MAX_CAPACITY,
            })?;

        let mut grown = Self::allocate(new_capacity, self.policy);
        let mut remaining = self.live;
        for slot in 0..old_capacity {
            if remaining == 0 {
                break;
            }
            if self.storage.state(slot) != SlotState::Live {
                continue;
            }
            if let Some((key, value)) = self.storage.bury(slot) {
                let hash = hasher(&key);
                let target = grown.first_empty(hash);
                grown.storage.fill(target, key, value);
                grown.live += 1;
                remaining -= 1;
            }
        }
        debug_assert_eq!(grown.live, self.live);

        log::debug!(
            "expanded table from {old_capacity} to {new_capacity} slots ({} live, {} tombstones dropped)",
            self.live,
            self.removed,
        );
        *self = grown;
        Ok(())
    }

    /// Probe-length statistics, computed by re-hashing every live key.
    #[cfg(feature = "stats")]
    pub(crate) fn probe_stats(&self, hasher: impl Fn(&S::Key) -> u32) -> ProbeStats {
        let mask = self.mask();
        let mut histogram: Vec<usize> = Vec::new();
        let mut total = 0usize;
        for slot in self.live_slots() {
            let Some(hash) = self.storage.with_key(slot, &hasher) else {
                continue;
            };
            let distance = slot.wrapping_sub(first_probe(hash, mask)) & mask;
            if histogram.len() <= distance {
                histogram.resize(distance + 1, 0);
            }
            histogram[distance] += 1;
            total += distance;
        }

        ProbeStats {
            live: self.live,
            tombstones: self.removed,
            capacity: self.capacity(),
            threshold: self.threshold,
            max_probe: histogram.len().saturating_sub(1),
            mean_probe: if self.live == 0 {
                0.0
            } else {
                total as f64 / self.live as f64
            },
            histogram,
        }
    }
}

/// Iterator over live slot indices. Stops as soon as the table's live count
/// has been yielded instead of scanning the rest of the array.
pub(crate) struct LiveSlots<'a, S> {
    storage: &'a S,
    next: usize,
    remaining: usize,
}

impl<'a, S: Storage> LiveSlots<'a, S> {
    #[inline(always)]
    pub(crate) fn storage(&self) -> &'a S {
        self.storage
    }
}

impl<S: Storage> Iterator for LiveSlots<'_, S> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        while self.storage.state(self.next) != SlotState::Live {
            self.next += 1;
        }
        let slot = self.next;
        self.next += 1;
        self.remaining -= 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<S: Storage> ExactSizeIterator for LiveSlots<'_, S> {}

/// Probe-length statistics for a table.
///
/// Available with the `stats` feature.
#[cfg(feature = "stats")]
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeStats {
    /// Live entries.
    pub live: usize,
    /// Tombstoned slots.
    pub tombstones: usize,
    /// Allocated slots.
    pub capacity: usize,
    /// Live plus tombstoned slots at which the table expands.
    pub threshold: usize,
    /// `histogram[d]` is the number of keys sitting `d` slots past their home
    /// slot.
    pub histogram: Vec<usize>,
    /// Longest displacement of any key.
    pub max_probe: usize,
    /// Mean displacement over all live keys.
    pub mean_probe: f64,
}

#[cfg(feature = "stats")]
impl ProbeStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Probe Statistics ===");
        println!(
            "Population: {} live, {} tombstones, {}/{} slots before expansion",
            self.live,
            self.tombstones,
            self.live + self.tombstones,
            self.threshold
        );
        println!(
            "Load: {:.2}% of {} slots",
            if self.capacity == 0 {
                0.0
            } else {
                (self.live as f64 / self.capacity as f64) * 100.0
            },
            self.capacity
        );
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe, self.mean_probe
        );
        for (distance, count) in self.histogram.iter().enumerate() {
            if *count > 0 {
                println!("{distance:>4}: {count}");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    /// Minimal storage over `Option<u32>` slots with a separate tombstone
    /// flag, used to exercise the engine in isolation.
    #[derive(Clone)]
    pub(crate) struct TestStorage {
        keys: Vec<Option<u32>>,
        dead: Vec<bool>,
        values: Vec<u64>,
    }

    impl Storage for TestStorage {
        type Key = u32;
        type Value = u64;

        fn allocate(slots: usize) -> Self {
            Self {
                keys: vec![None; slots],
                dead: vec![false; slots],
                values: vec![0; slots],
            }
        }

        fn slots(&self) -> usize {
            self.keys.len()
        }

        fn state(&self, slot: usize) -> SlotState {
            match (self.keys[slot], self.dead[slot]) {
                (Some(_), _) => SlotState::Live,
                (None, true) => SlotState::Tombstone,
                (None, false) => SlotState::Empty,
            }
        }

        fn with_key<R>(&self, slot: usize, f: impl FnOnce(&u32) -> R) -> Option<R> {
            self.keys[slot].as_ref().map(f)
        }

        fn fill(&mut self, slot: usize, key: u32, value: u64) {
            self.keys[slot] = Some(key);
            self.dead[slot] = false;
            self.values[slot] = value;
        }

        fn bury(&mut self, slot: usize) -> Option<(u32, u64)> {
            let key = self.keys[slot].take()?;
            self.dead[slot] = true;
            Some((key, self.values[slot]))
        }
    }

    /// Every key hashes to the same home slot.
    fn colliding(_: &u32) -> u32 {
        0
    }

    fn identity(key: &u32) -> u32 {
        *key
    }

    fn insert(table: &mut RawTable<TestStorage>, key: u32, hasher: fn(&u32) -> u32) {
        match table.probe_for_insert(hasher(&key), &key, hasher).unwrap() {
            Probe::Found(slot) => table.storage_mut().values[slot] = key as u64,
            Probe::Vacant(slot) => table.insert_at(slot, key, key as u64),
        }
    }

    fn check_invariants(table: &RawTable<TestStorage>) {
        let storage = table.storage();
        let live = (0..table.capacity())
            .filter(|&s| storage.state(s) == SlotState::Live)
            .count();
        let dead = (0..table.capacity())
            .filter(|&s| storage.state(s) == SlotState::Tombstone)
            .count();
        assert!(table.capacity().is_power_of_two());
        assert_eq!(live, table.len());
        assert_eq!(dead, table.removed());
        assert!(table.len() + table.removed() <= table.threshold().max(1));
        assert!(table.threshold() < table.capacity() || table.capacity() == 1);
    }

    #[test]
    fn rejects_bad_capacities() {
        assert!(RawTable::<TestStorage>::with_capacity(0, LoadPolicy::OBJECT).is_err());
        assert!(
            RawTable::<TestStorage>::with_capacity(MAX_CAPACITY + 1, LoadPolicy::OBJECT).is_err()
        );
        let table = RawTable::<TestStorage>::with_capacity(5, LoadPolicy::OBJECT).unwrap();
        assert_eq!(table.capacity(), 8);
        assert_eq!(table.threshold(), 5);
    }

    #[test]
    fn locate_reports_first_tombstone() {
        let mut table = RawTable::<TestStorage>::with_capacity(16, LoadPolicy::OBJECT).unwrap();
        for key in 1..=4 {
            insert(&mut table, key, colliding);
        }
        let home = first_probe(0, 15);
        assert_eq!(table.locate(0, &1), Probe::Found(home));
        assert_eq!(table.locate(0, &4), Probe::Found((home + 3) & 15));

        table.remove(0, &2);
        table.remove(0, &3);
        // The chain stays intact past the tombstones.
        assert_eq!(table.locate(0, &4), Probe::Found((home + 3) & 15));
        // An absent key is directed to the first tombstone, not the empty slot.
        assert_eq!(table.locate(0, &9), Probe::Vacant((home + 1) & 15));
        check_invariants(&table);
    }

    #[test]
    fn tombstone_reuse_does_not_expand() {
        let mut table = RawTable::<TestStorage>::with_capacity(8, LoadPolicy::OBJECT).unwrap();
        let threshold = table.threshold();
        for key in 0..threshold as u32 {
            insert(&mut table, key, identity);
        }
        assert_eq!(table.capacity(), 8);

        for _ in 0..100 {
            table.remove(0, &0);
            assert_eq!(table.removed(), 1);
            insert(&mut table, 0, identity);
            assert_eq!(table.removed(), 0);
            assert_eq!(table.capacity(), 8);
            check_invariants(&table);
        }
    }

    #[test]
    fn expansion_drops_tombstones() {
        let mut table = RawTable::<TestStorage>::with_capacity(8, LoadPolicy::OBJECT).unwrap();
        for key in 0..5 {
            insert(&mut table, key, identity);
        }
        table.remove(identity(&0), &0);
        table.remove(identity(&1), &1);
        assert_eq!(table.removed(), 2);

        let mut key = 100;
        while table.capacity() == 8 {
            insert(&mut table, key, identity);
            key += 1;
        }
        assert_eq!(table.capacity(), 16);
        assert_eq!(table.removed(), 0);
        for k in 2..5 {
            assert!(table.find(k, &k).is_some());
        }
        check_invariants(&table);
    }

    #[test]
    fn single_slot_table_expands_on_first_insert() {
        let mut table = RawTable::<TestStorage>::with_capacity(1, LoadPolicy::Scaled).unwrap();
        assert_eq!(table.capacity(), 1);
        assert_eq!(table.threshold(), 0);
        insert(&mut table, 5, identity);
        assert_eq!(table.capacity(), 2);
        assert_eq!(table.len(), 1);
        assert!(table.find(5, &5).is_some());
        assert!(table.find(6, &6).is_none());
        check_invariants(&table);
    }

    #[test]
    fn explicit_grow_keeps_entries() {
        let mut table = RawTable::<TestStorage>::with_capacity(4, LoadPolicy::UNSIGNED).unwrap();
        assert_eq!(table.threshold(), 2);
        insert(&mut table, 1, colliding);
        insert(&mut table, 2, colliding);
        let Probe::Vacant(fresh) = table.locate(0, &3) else {
            panic!("3 was never inserted");
        };
        assert!(table.must_expand_before(fresh));

        table.remove(0, &1);
        let Probe::Vacant(reused) = table.locate(0, &3) else {
            panic!("3 was never inserted");
        };
        assert!(!table.must_expand_before(reused));

        table.grow(colliding).unwrap();
        assert_eq!(table.capacity(), 8);
        assert_eq!(table.removed(), 0);
        assert!(table.find(0, &2).is_some());
        assert!(table.find(0, &1).is_none());
        check_invariants(&table);
    }

    #[test]
    fn many_collisions_survive_growth() {
        let mut table = RawTable::<TestStorage>::with_capacity(1, LoadPolicy::OBJECT).unwrap();
        for key in 0..500 {
            insert(&mut table, key, colliding);
        }
        assert_eq!(table.len(), 500);
        for key in 0..500 {
            let slot = table.find(0, &key).unwrap();
            assert_eq!(table.storage().values[slot], key as u64);
        }
        check_invariants(&table);
    }

    #[test]
    fn retain_tombstones_rejected_slots() {
        let mut table = RawTable::<TestStorage>::with_capacity(4, LoadPolicy::OBJECT).unwrap();
        for key in 0..100 {
            insert(&mut table, key, identity);
        }
        let dropped = table.retain(|storage, slot| storage.values[slot] % 2 == 0);
        assert_eq!(dropped, 50);
        assert_eq!(table.len(), 50);
        assert_eq!(table.removed(), 50);
        for key in 0..100u32 {
            assert_eq!(table.find(key, &key).is_some(), key % 2 == 0);
        }
        check_invariants(&table);
    }

    #[test]
    fn live_slots_yields_exactly_live_count() {
        let mut table = RawTable::<TestStorage>::with_capacity(64, LoadPolicy::OBJECT).unwrap();
        for key in 0..30 {
            insert(&mut table, key, identity);
        }
        for key in (0..30).step_by(3) {
            table.remove(key, &key);
        }
        let slots = table.live_slots();
        assert_eq!(slots.len(), 20);
        let mut keys: Vec<u32> = table
            .live_slots()
            .filter_map(|slot| table.storage().with_key(slot, |k| *k))
            .collect();
        keys.sort_unstable();
        let expected: Vec<u32> = (0..30).filter(|k| k % 3 != 0).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut table = RawTable::<TestStorage>::with_capacity(4, LoadPolicy::OBJECT).unwrap();
        for key in 0..40 {
            insert(&mut table, key, identity);
        }
        let capacity = table.capacity();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.live_slots().count(), 0);
        check_invariants(&table);
    }

    #[cfg(feature = "stats")]
    #[test]
    fn probe_stats_counts_displacement() {
        let mut table = RawTable::<TestStorage>::with_capacity(16, LoadPolicy::OBJECT).unwrap();
        for key in 0..4 {
            insert(&mut table, key, colliding);
        }
        let stats = table.probe_stats(colliding);
        assert_eq!(stats.live, 4);
        assert_eq!(stats.histogram, vec![1, 1, 1, 1]);
        assert_eq!(stats.max_probe, 3);
        assert!((stats.mean_probe - 1.5).abs() < 1e-9);
    }
}
