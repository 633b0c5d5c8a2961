//! ChainedHashMap: separate chaining over a generational entry arena.
//!
//! Each bucket is an ordered list of arena keys, head first. Entries live in
//! a `SlotMap`, so unlinking from a chain never moves other entries and a
//! `Handle` to a deleted entry can never resolve to a later one. The table
//! never resizes; chains grow without bound and only lookup cost degrades.

use crate::config::TableConfig;
use crate::error::{MapError, Result};
use crate::probe_guard::ProbeGuard;
use crate::slot_hash::SlotHash;
use crate::KeyValueMap;
use core::borrow::Borrow;
use core::fmt;
use slotmap::{DefaultKey, SlotMap};

/// Generational reference to an entry of a [`ChainedHashMap`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub fn key<'a, K, V>(&self, map: &'a ChainedHashMap<K, V>) -> Option<&'a K> {
        map.entries.get(self.0).map(|e| &e.key)
    }

    pub fn value<'a, K, V>(&self, map: &'a ChainedHashMap<K, V>) -> Option<&'a V> {
        map.entries.get(self.0).map(|e| &e.value)
    }

    pub fn value_mut<'a, K, V>(&self, map: &'a mut ChainedHashMap<K, V>) -> Option<&'a mut V> {
        map.entries.get_mut(self.0).map(|e| &mut e.value)
    }
}

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

#[derive(Clone)]
pub struct ChainedHashMap<K, V> {
    buckets: Vec<Vec<DefaultKey>>,
    entries: SlotMap<DefaultKey, Entry<K, V>>,
    guard: ProbeGuard,
}

impl<K, V> ChainedHashMap<K, V> {
    /// Empty map with the default bucket count.
    pub fn new() -> Self {
        Self::from_capacity(TableConfig::default().initial_capacity)
    }

    /// Empty map with `capacity` buckets.
    ///
    /// # Panics
    /// If `capacity` is zero. Use [`try_with_capacity`](Self::try_with_capacity)
    /// to get an error instead.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "ChainedHashMap capacity must be positive");
        Self::from_capacity(capacity)
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MapError::InvalidCapacity);
        }
        Ok(Self::from_capacity(capacity))
    }

    pub fn with_config(config: &TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_capacity(config.initial_capacity))
    }

    fn from_capacity(capacity: usize) -> Self {
        log::trace!("chained map created with {} buckets", capacity);
        Self {
            buckets: std::iter::repeat_with(Vec::new).take(capacity).collect(),
            entries: SlotMap::with_key(),
            guard: ProbeGuard::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of buckets. Fixed for the lifetime of the map.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Length of the chain in bucket `index`, or `None` past the end.
    pub fn chain_len(&self, index: usize) -> Option<usize> {
        self.buckets.get(index).map(Vec::len)
    }

    /// Drops every entry; the bucket count is kept.
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(Vec::clear);
        self.entries.clear();
    }

    /// Entries in bucket order: bucket 0 head to tail, then bucket 1, ...
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            chains: self.buckets.iter().flatten(),
            entries: &self.entries,
            remaining: self.entries.len(),
        }
    }

    /// Mutable access to every value. Visits entries in arena order,
    /// not bucket order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.entries.iter_mut(),
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
}

impl<K, V> ChainedHashMap<K, V>
where
    K: SlotHash + Eq,
{
    /// Bucket, chain position and arena key of `q`, if present.
    fn locate<Q>(&self, q: &Q) -> Option<(usize, usize, DefaultKey)>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        let bucket = q.slot_index(self.buckets.len());
        self.buckets[bucket]
            .iter()
            .position(|&k| {
                self.entries
                    .get(k)
                    .map(|e| e.key.borrow() == q)
                    .unwrap_or(false)
            })
            .map(|pos| (bucket, pos, self.buckets[bucket][pos]))
    }

    /// Stores `value` under `key`. An existing entry is overwritten in place
    /// and its previous value returned; otherwise the entry is appended to
    /// the tail of its chain.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let _probe = self.guard.enter();
        let bucket = key.slot_index(self.buckets.len());
        let existing = self.buckets[bucket].iter().copied().find(|&k| {
            self.entries
                .get(k)
                .map(|e| e.key == key)
                .unwrap_or(false)
        });
        if let Some(e) = existing.and_then(|k| self.entries.get_mut(k)) {
            return Some(core::mem::replace(&mut e.value, value));
        }
        let k = self.entries.insert(Entry { key, value });
        self.buckets[bucket].push(k);
        None
    }

    pub fn get<Q>(&self, q: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        let _probe = self.guard.enter();
        let (_, _, k) = self.locate(q).ok_or(MapError::KeyNotFound)?;
        self.entries
            .get(k)
            .map(|e| &e.value)
            .ok_or(MapError::KeyNotFound)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        let _probe = self.guard.enter();
        let (_, _, k) = self.locate(q).ok_or(MapError::KeyNotFound)?;
        self.entries
            .get_mut(k)
            .map(|e| &mut e.value)
            .ok_or(MapError::KeyNotFound)
    }

    /// Unlinks the entry for `q` and returns its value. The rest of the
    /// chain keeps its order.
    pub fn delete<Q>(&mut self, q: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        let _probe = self.guard.enter();
        let (bucket, pos, k) = self.locate(q).ok_or(MapError::KeyNotFound)?;
        self.buckets[bucket].remove(pos);
        self.entries
            .remove(k)
            .map(|e| e.value)
            .ok_or(MapError::KeyNotFound)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        self.get(q).is_ok()
    }

    /// Handle to the entry for `q`. The handle stops resolving once the
    /// entry is deleted.
    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        let _probe = self.guard.enter();
        self.locate(q).map(|(_, _, k)| Handle(k))
    }
}

impl<K, V> Default for ChainedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ChainedHashMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Extend<(K, V)> for ChainedHashMap<K, V>
where
    K: SlotHash + Eq,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ChainedHashMap<K, V>
where
    K: SlotHash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

impl<K, V> KeyValueMap<K, V> for ChainedHashMap<K, V>
where
    K: SlotHash + Eq,
{
    fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        Ok(ChainedHashMap::put(self, key, value))
    }

    fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        ChainedHashMap::get(self, key)
    }

    fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        ChainedHashMap::get_mut(self, key)
    }

    fn delete<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        ChainedHashMap::delete(self, key)
    }

    fn len(&self) -> usize {
        ChainedHashMap::len(self)
    }

    fn capacity(&self) -> usize {
        ChainedHashMap::capacity(self)
    }

    fn items<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
    {
        self.iter()
    }
}

/// Iterator over entries in bucket order.
pub struct Iter<'a, K, V> {
    chains: core::iter::Flatten<core::slice::Iter<'a, Vec<DefaultKey>>>,
    entries: &'a SlotMap<DefaultKey, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        let e = self.chains.by_ref().find_map(|&k| entries.get(k))?;
        self.remaining -= 1;
        Some((&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over mutable values in arena order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}
