//! OpenHashMap: open addressing with linear probing and tombstone deletion.
//!
//! Every slot is a tagged record, so slot state and payload change together.
//! A probe starts at `slot_index(key, capacity)` and advances by one slot,
//! wrapping, for at most `capacity` steps.
//!
//! Invariants
//! - `count` is the number of `Occupied` slots; `tombstones` the number of
//!   `Tombstone` slots.
//! - Keys are distinct across `Occupied` slots. Inserts keep probing past
//!   tombstones until a match or an `Empty` slot, then reuse the first
//!   tombstone seen.
//! - Deleting leaves a `Tombstone`, never `Empty`, so keys that probed past
//!   the slot stay reachable.
//! - Capacity only doubles. A rebuild reinserts live entries and discards
//!   every tombstone.

use crate::config::TableConfig;
use crate::error::{MapError, Result};
use crate::probe_guard::ProbeGuard;
use crate::slot_hash::SlotHash;
use crate::KeyValueMap;
use core::borrow::Borrow;
use core::fmt;
use core::mem;

#[derive(Clone, Debug)]
enum Slot<K, V> {
    Empty,
    Occupied { key: K, value: V },
    Tombstone,
}

impl<K, V> Slot<K, V> {
    fn state(&self) -> SlotState {
        match self {
            Slot::Empty => SlotState::Empty,
            Slot::Occupied { .. } => SlotState::Occupied,
            Slot::Tombstone => SlotState::Tombstone,
        }
    }

    fn value(&self) -> Option<&V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    fn value_mut(&mut self) -> Option<&mut V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    fn into_value(self) -> Option<V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Observable state of one slot, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    Empty,
    Occupied,
    Tombstone,
}

/// Outcome of an insertion probe.
enum Probe {
    /// Occupied slot holding an equal key.
    Found(usize),
    /// First tombstone on the path, or the terminating empty slot.
    Vacant(usize),
    /// Wrapped around without a match or a reusable slot.
    Full,
}

fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    std::iter::repeat_with(|| Slot::Empty).take(capacity).collect()
}

#[derive(Clone)]
pub struct OpenHashMap<K, V> {
    slots: Vec<Slot<K, V>>,
    count: usize,
    tombstones: usize,
    max_load_factor: f64,
    guard: ProbeGuard,
}

impl<K, V> OpenHashMap<K, V> {
    /// Empty map with the default capacity and load factor.
    pub fn new() -> Self {
        Self::from_config(&TableConfig::default())
    }

    /// Empty map with `capacity` slots and the default load factor.
    ///
    /// # Panics
    /// If `capacity` is zero. Use [`try_with_capacity`](Self::try_with_capacity)
    /// to get an error instead.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "OpenHashMap capacity must be positive");
        Self::from_config(&TableConfig::default().with_initial_capacity(capacity))
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(&TableConfig::default().with_initial_capacity(capacity))
    }

    pub fn with_config(config: &TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: &TableConfig) -> Self {
        log::trace!(
            "open-address map created with {} slots, max load factor {}",
            config.initial_capacity,
            config.max_load_factor
        );
        Self {
            slots: empty_slots(config.initial_capacity),
            count: 0,
            tombstones: 0,
            max_load_factor: config.max_load_factor,
            guard: ProbeGuard::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Number of tombstoned slots awaiting the next rebuild.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// State of slot `index`, or `None` past the end.
    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.slots.get(index).map(Slot::state)
    }

    /// Empties every slot, tombstones included. Capacity is kept.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = Slot::Empty);
        self.count = 0;
        self.tombstones = 0;
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
            remaining: self.count,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.iter_mut(),
            remaining: self.count,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn items(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    fn needs_growth(&self) -> bool {
        self.count as f64 >= self.max_load_factor * self.capacity() as f64
    }

    fn exhausted(&self) -> MapError {
        log::error!(
            "open-address table exhausted: {} live, {} tombstones, capacity {}",
            self.count,
            self.tombstones,
            self.capacity()
        );
        MapError::CapacityExhausted {
            capacity: self.capacity(),
        }
    }
}

impl<K, V> OpenHashMap<K, V>
where
    K: SlotHash + Eq,
{
    /// Slot holding a key equal to `q`. Tombstones are stepped over; the
    /// first empty slot, or a full wrap, ends the search.
    fn find_index<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        let cap = self.slots.len();
        let start = q.slot_index(cap);
        for step in 0..cap {
            let i = (start + step) % cap;
            match &self.slots[i] {
                Slot::Empty => return None,
                Slot::Occupied { key, .. } if key.borrow() == q => return Some(i),
                Slot::Occupied { .. } | Slot::Tombstone => {}
            }
        }
        None
    }

    fn probe_for_insert(&self, key: &K) -> Probe {
        let cap = self.slots.len();
        let start = key.slot_index(cap);
        let mut reusable = None;
        for step in 0..cap {
            let i = (start + step) % cap;
            match &self.slots[i] {
                Slot::Empty => return Probe::Vacant(reusable.unwrap_or(i)),
                Slot::Tombstone => {
                    reusable.get_or_insert(i);
                }
                Slot::Occupied { key: k, .. } if k == key => return Probe::Found(i),
                Slot::Occupied { .. } => {}
            }
        }
        reusable.map_or(Probe::Full, Probe::Vacant)
    }

    /// Replaces the slot array with `new_capacity` empty slots and reinserts
    /// every live entry at its index for the new capacity. Tombstones are
    /// not carried over.
    fn rebuild(&mut self, new_capacity: usize) -> Result<()> {
        debug_assert!(new_capacity > self.count);
        let _probe = self.guard.enter();
        log::debug!(
            "rebuilding open-address table: capacity {} -> {}, {} live, {} tombstones dropped",
            self.slots.len(),
            new_capacity,
            self.count,
            self.tombstones
        );
        let old = mem::replace(&mut self.slots, empty_slots(new_capacity));
        self.count = 0;
        self.tombstones = 0;
        for slot in old {
            if let Slot::Occupied { key, value } = slot {
                let cap = self.slots.len();
                let start = key.slot_index(cap);
                // Live keys are distinct, so the first empty slot is the spot.
                let i = (0..cap)
                    .map(|step| (start + step) % cap)
                    .find(|&i| matches!(self.slots[i], Slot::Empty))
                    .ok_or(MapError::CapacityExhausted { capacity: cap })?;
                self.slots[i] = Slot::Occupied { key, value };
                self.count += 1;
            }
        }
        Ok(())
    }

    /// Stores `value` under `key`, returning the previous value on overwrite.
    ///
    /// If the live count has reached `max_load_factor × capacity`, the table
    /// first doubles. `CapacityExhausted` means the probe wrapped fully or
    /// the capacity cannot double; the table is left unchanged in both cases.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        if self.needs_growth() {
            let grown = match self.capacity().checked_mul(2) {
                Some(c) => c,
                None => return Err(self.exhausted()),
            };
            self.rebuild(grown)?;
        }

        let _probe = self.guard.enter();
        match self.probe_for_insert(&key) {
            Probe::Found(i) => match &mut self.slots[i] {
                Slot::Occupied { value: slot_value, .. } => {
                    Ok(Some(mem::replace(slot_value, value)))
                }
                Slot::Empty | Slot::Tombstone => {
                    unreachable!("insert probe matched a slot that is not occupied")
                }
            },
            Probe::Vacant(i) => {
                if matches!(self.slots[i], Slot::Tombstone) {
                    self.tombstones -= 1;
                }
                self.slots[i] = Slot::Occupied { key, value };
                self.count += 1;
                Ok(None)
            }
            Probe::Full => Err(self.exhausted()),
        }
    }

    pub fn get<Q>(&self, q: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        let _probe = self.guard.enter();
        let i = self.find_index(q).ok_or(MapError::KeyNotFound)?;
        self.slots[i].value().ok_or(MapError::KeyNotFound)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        let _probe = self.guard.enter();
        let i = self.find_index(q).ok_or(MapError::KeyNotFound)?;
        self.slots[i].value_mut().ok_or(MapError::KeyNotFound)
    }

    /// Tombstones the slot holding `q` and returns its value.
    pub fn delete<Q>(&mut self, q: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        let _probe = self.guard.enter();
        let i = self.find_index(q).ok_or(MapError::KeyNotFound)?;
        let value = mem::replace(&mut self.slots[i], Slot::Tombstone)
            .into_value()
            .ok_or(MapError::KeyNotFound)?;
        self.count -= 1;
        self.tombstones += 1;
        Ok(value)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        self.get(q).is_ok()
    }
}

impl<K, V> Default for OpenHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for OpenHashMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> KeyValueMap<K, V> for OpenHashMap<K, V>
where
    K: SlotHash + Eq,
{
    fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        OpenHashMap::put(self, key, value)
    }

    fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        OpenHashMap::get(self, key)
    }

    fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        OpenHashMap::get_mut(self, key)
    }

    fn delete<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        OpenHashMap::delete(self, key)
    }

    fn len(&self) -> usize {
        OpenHashMap::len(self)
    }

    fn capacity(&self) -> usize {
        OpenHashMap::capacity(self)
    }

    fn items<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
    {
        self.iter()
    }
}

/// Iterator over live entries in slot order.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let item = self.it.by_ref().find_map(|s| match s {
            Slot::Occupied { key, value } => Some((key, value)),
            _ => None,
        })?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over live entries with mutable values, in slot order.
pub struct IterMut<'a, K, V> {
    it: core::slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let item = self.it.by_ref().find_map(|s| match s {
            Slot::Occupied { key, value } => Some((&*key, value)),
            _ => None,
        })?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: growth is checked before each put against the live count,
    /// so capacity 7 holds six entries and doubles on the seventh put.
    #[test]
    fn resize_threshold_is_checked_before_insert() {
        let mut m: OpenHashMap<i32, String> = OpenHashMap::with_capacity(7);
        for i in 0..5 {
            m.put(i * 10, format!("value_{}", i)).unwrap();
        }
        assert_eq!(m.len(), 5);
        assert_eq!(m.capacity(), 7);

        // 5 < 0.75 * 7 = 5.25: no growth yet.
        m.put(50, "value_5".to_string()).unwrap();
        assert_eq!(m.capacity(), 7);
        assert_eq!(m.len(), 6);

        // 6 >= 5.25: doubles first.
        m.put(60, "value_6".to_string()).unwrap();
        assert_eq!(m.capacity(), 14);
        assert_eq!(m.len(), 7);
        for i in 0..7 {
            assert_eq!(m.get(&(i * 10)), Ok(&format!("value_{}", i)));
        }
    }

    /// Invariant: deleting a key in the middle of a probe chain leaves a
    /// tombstone that later lookups step over.
    #[test]
    fn probe_passes_through_tombstone() {
        let mut m: OpenHashMap<i32, i32> = OpenHashMap::with_capacity(7);
        for k in [1, 8, 15] {
            m.put(k, k * 100).unwrap();
        }
        assert_eq!(m.slot_state(1), Some(SlotState::Occupied));
        assert_eq!(m.slot_state(2), Some(SlotState::Occupied));
        assert_eq!(m.slot_state(3), Some(SlotState::Occupied));

        assert_eq!(m.delete(&8), Ok(800));
        assert_eq!(m.slot_state(2), Some(SlotState::Tombstone));
        assert_eq!(m.tombstones(), 1);
        assert_eq!(m.get(&15), Ok(&1500));
        assert!(!m.contains(&8));
        assert_eq!(m.get(&8), Err(MapError::KeyNotFound));
        assert_eq!(m.delete(&8), Err(MapError::KeyNotFound));
    }

    /// Invariant: re-inserting a deleted key reuses the first tombstone and
    /// the new value is returned.
    #[test]
    fn reinsert_reuses_tombstone() {
        let mut m: OpenHashMap<i32, &'static str> = OpenHashMap::with_capacity(7);
        m.put(1, "a").unwrap();
        m.put(8, "b").unwrap();
        m.delete(&8).unwrap();
        assert_eq!(m.put(8, "c").unwrap(), None);
        assert_eq!(m.slot_state(2), Some(SlotState::Occupied));
        assert_eq!(m.tombstones(), 0);
        assert_eq!(m.get(&8), Ok(&"c"));
        assert_eq!(m.len(), 2);
    }

    /// Invariant: overwriting a key that sits past a tombstone updates it in
    /// place instead of creating a second copy in the tombstone.
    #[test]
    fn overwrite_past_tombstone_does_not_duplicate() {
        let mut m: OpenHashMap<i32, i32> = OpenHashMap::with_capacity(7);
        for k in [1, 8, 15] {
            m.put(k, k).unwrap();
        }
        m.delete(&8).unwrap();
        assert_eq!(m.put(15, -15).unwrap(), Some(15));
        assert_eq!(m.len(), 2);
        assert_eq!(m.slot_state(2), Some(SlotState::Tombstone));
        assert_eq!(m.keys().filter(|&&k| k == 15).count(), 1);
        m.delete(&15).unwrap();
        assert!(!m.contains(&15));
    }

    /// Invariant: a rebuild drops every tombstone and keeps every live entry.
    #[test]
    fn rebuild_discards_tombstones() {
        let mut m: OpenHashMap<i32, i32> = OpenHashMap::with_capacity(4);
        m.put(0, 0).unwrap();
        m.put(1, 1).unwrap();
        m.delete(&0).unwrap();
        m.put(2, 2).unwrap();
        m.put(3, 3).unwrap();
        assert_eq!((m.capacity(), m.len(), m.tombstones()), (4, 3, 1));

        m.put(5, 5).unwrap();
        assert_eq!((m.capacity(), m.len(), m.tombstones()), (8, 4, 0));
        assert!((0..8).all(|i| m.slot_state(i) != Some(SlotState::Tombstone)));
        for k in [1, 2, 3, 5] {
            assert_eq!(m.get(&k), Ok(&k));
        }
        assert!(!m.contains(&0));
    }

    /// Invariant: a miss terminates even when no slot is empty.
    #[test]
    fn miss_terminates_without_empty_slots() {
        let mut m: OpenHashMap<i32, i32> = OpenHashMap::with_capacity(4);
        for k in 0..3 {
            m.put(k, k).unwrap();
        }
        m.delete(&0).unwrap();
        m.delete(&1).unwrap();
        m.put(3, 3).unwrap();
        assert_eq!(m.capacity(), 4);
        assert!((0..4).all(|i| m.slot_state(i) != Some(SlotState::Empty)));
        assert_eq!(m.get(&4), Err(MapError::KeyNotFound));
        assert_eq!(m.delete(&8), Err(MapError::KeyNotFound));
        // A new key still finds a tombstone to reuse.
        m.put(4, 4).unwrap();
        assert_eq!(m.get(&4), Ok(&4));
    }

    /// Invariant: a probe that wraps with no reusable slot reports
    /// `CapacityExhausted` and leaves the table as it was.
    #[test]
    fn full_table_reports_capacity_exhausted() {
        let mut m: OpenHashMap<i32, i32> = OpenHashMap::with_capacity(2);
        // Bypass validation to disable growth and fill every slot.
        m.max_load_factor = 2.0;
        m.put(0, 0).unwrap();
        m.put(1, 1).unwrap();
        assert_eq!(m.put(2, 2), Err(MapError::CapacityExhausted { capacity: 2 }));
        assert_eq!(m.len(), 2);
        assert_eq!(m.capacity(), 2);
        // Overwrites still succeed on a full table.
        assert_eq!(m.put(1, 10), Ok(Some(1)));
    }

    /// Invariant: borrowed lookups (`String` stored, `&str` queried) succeed.
    #[test]
    fn borrowed_lookup_with_str() {
        let mut m: OpenHashMap<String, i32> = OpenHashMap::new();
        m.put("hello".to_string(), 1).unwrap();
        assert!(m.contains("hello"));
        *m.get_mut("hello").unwrap() += 41;
        assert_eq!(m.get("hello"), Ok(&42));
        assert_eq!(m.delete("hello"), Ok(42));
        assert!(m.is_empty());
    }

    /// Invariant: iteration yields live entries only, in slot order.
    #[test]
    fn iteration_skips_tombstones() {
        let mut m: OpenHashMap<i32, i32> = OpenHashMap::with_capacity(10);
        for k in [4, 1, 7, 2] {
            m.put(k, k * k).unwrap();
        }
        m.delete(&7).unwrap();
        let keys: Vec<i32> = m.keys().copied().collect();
        assert_eq!(keys, vec![1, 2, 4]);
        assert_eq!(m.iter().len(), 3);
        for (_, v) in m.iter_mut() {
            *v += 1;
        }
        assert_eq!(m.values().copied().collect::<Vec<_>>(), vec![2, 5, 17]);
    }

    /// Invariant: construction validates capacity and load factor; `clear`
    /// resets counts but keeps capacity.
    #[test]
    fn construction_and_clear() {
        assert_eq!(
            OpenHashMap::<i32, i32>::try_with_capacity(0).err(),
            Some(MapError::InvalidCapacity)
        );
        let cfg = TableConfig::new().with_max_load_factor(1.0);
        assert!(matches!(
            OpenHashMap::<i32, i32>::with_config(&cfg),
            Err(MapError::InvalidLoadFactor { .. })
        ));

        let cfg = TableConfig::new()
            .with_initial_capacity(3)
            .with_max_load_factor(0.5);
        let mut m: OpenHashMap<i32, i32> = OpenHashMap::with_config(&cfg).unwrap();
        assert_eq!(m.max_load_factor(), 0.5);
        m.put(1, 1).unwrap();
        m.put(2, 2).unwrap();
        // 2 >= 1.5 -> grows to 6 before the third insert
        m.put(3, 3).unwrap();
        assert_eq!(m.capacity(), 6);
        m.delete(&1).unwrap();
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.tombstones(), 0);
        assert_eq!(m.capacity(), 6);
    }

    #[test]
    #[should_panic]
    fn with_capacity_zero_panics() {
        let _ = OpenHashMap::<i32, i32>::with_capacity(0);
    }

    /// Invariant: capacity is always the initial capacity times a power of
    /// two, and the bound `count <= max_load_factor * capacity + 1` holds.
    #[test]
    fn capacity_doubles_from_initial() {
        let mut m: OpenHashMap<u32, u32> = OpenHashMap::with_capacity(3);
        for k in 0..500 {
            m.put(k, k).unwrap();
            let ratio = m.capacity() / 3;
            assert_eq!(m.capacity() % 3, 0);
            assert!(ratio.is_power_of_two());
            assert!(m.len() as f64 <= 0.75 * m.capacity() as f64 + 1.0);
        }
        assert!((0..500).all(|k| m.get(&k) == Ok(&k)));
    }
}
