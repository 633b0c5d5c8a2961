//! ChainedSet: set semantics over a `ChainedHashMap` with a unit sentinel.

use crate::chained_hash_map::{self, ChainedHashMap};
use crate::error::Result;
use crate::slot_hash::SlotHash;
use core::borrow::Borrow;
use core::fmt;

/// Members are stored as keys of a chained map whose values are `()`.
#[derive(Clone)]
pub struct ChainedSet<T> {
    map: ChainedHashMap<T, ()>,
}

impl<T> ChainedSet<T> {
    pub fn new() -> Self {
        Self {
            map: ChainedHashMap::new(),
        }
    }

    /// # Panics
    /// If `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: ChainedHashMap::with_capacity(capacity),
        }
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            map: ChainedHashMap::try_with_capacity(capacity)?,
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Members in the underlying map's bucket order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            it: self.map.iter(),
        }
    }
}

impl<T> ChainedSet<T>
where
    T: SlotHash + Eq,
{
    /// Returns `true` if `item` was not already a member.
    pub fn add(&mut self, item: T) -> bool {
        self.map.put(item, ()).is_none()
    }

    /// Fails with `KeyNotFound` when `item` is not a member.
    pub fn remove<Q>(&mut self, item: &Q) -> Result<()>
    where
        T: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        self.map.delete(item)
    }

    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        self.map.contains(item)
    }
}

impl<T> ChainedSet<T>
where
    T: SlotHash + Eq + Clone,
{
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Members of either set.
    pub fn union(&self, other: &Self) -> Self {
        self.iter().chain(other.iter()).cloned().collect()
    }

    /// Members of both sets.
    pub fn intersection(&self, other: &Self) -> Self {
        self.iter().filter(|x| other.contains(*x)).cloned().collect()
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.iter().filter(|x| !other.contains(*x)).cloned().collect()
    }
}

impl<T> Default for ChainedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SlotHash + Eq> PartialEq for ChainedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|x| other.contains(x))
    }
}

impl<T: SlotHash + Eq> Eq for ChainedSet<T> {}

impl<T: fmt::Debug> fmt::Debug for ChainedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: SlotHash + Eq> Extend<T> for ChainedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T: SlotHash + Eq> FromIterator<T> for ChainedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut s = Self::new();
        s.extend(iter);
        s
    }
}

impl<'a, T> IntoIterator for &'a ChainedSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over set members.
pub struct Iter<'a, T> {
    it: chained_hash_map::Iter<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use std::collections::BTreeSet;

    fn sorted(s: &ChainedSet<i32>) -> Vec<i32> {
        s.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
    }

    /// Invariant: union, intersection and difference match the textbook
    /// definitions and leave both operands untouched.
    #[test]
    fn set_operations() {
        let a: ChainedSet<i32> = [1, 2, 3, 4, 5].into_iter().collect();
        let b: ChainedSet<i32> = [4, 5, 6, 7, 8].into_iter().collect();

        assert_eq!(sorted(&a.union(&b)), (1..=8).collect::<Vec<_>>());
        assert_eq!(sorted(&a.intersection(&b)), vec![4, 5]);
        assert_eq!(sorted(&a.difference(&b)), vec![1, 2, 3]);
        assert_eq!(sorted(&b.difference(&a)), vec![6, 7, 8]);

        assert_eq!(sorted(&a), vec![1, 2, 3, 4, 5]);
        assert_eq!(sorted(&b), vec![4, 5, 6, 7, 8]);
    }

    /// Invariant: `add` reports novelty; duplicates collapse.
    #[test]
    fn add_is_idempotent() {
        let mut s = ChainedSet::new();
        assert!(s.is_empty());
        assert!(s.add("x".to_string()));
        assert!(!s.add("x".to_string()));
        assert_eq!(s.len(), 1);
        assert!(s.contains("x"));
    }

    /// Invariant: removing a non-member fails with `KeyNotFound`.
    #[test]
    fn remove_member_and_non_member() {
        let mut s: ChainedSet<i32> = [1, 2].into_iter().collect();
        assert_eq!(s.remove(&1), Ok(()));
        assert!(!s.contains(&1));
        assert_eq!(s.remove(&1), Err(MapError::KeyNotFound));
        assert_eq!(s.to_vec(), vec![2]);
    }

    /// Invariant: equality is by membership, independent of bucket count
    /// and insertion order.
    #[test]
    fn equality_ignores_layout() {
        let mut a = ChainedSet::with_capacity(3);
        let mut b = ChainedSet::with_capacity(17);
        for i in [5, 1, 9] {
            a.add(i);
        }
        for i in [9, 5, 1] {
            b.add(i);
        }
        assert_eq!(a, b);
        b.add(2);
        assert_ne!(a, b);
        assert!(ChainedSet::<i32>::try_with_capacity(0).is_err());
    }

    #[test]
    fn debug_renders_as_set() {
        let s: ChainedSet<i32> = [3].into_iter().collect();
        assert_eq!(format!("{:?}", s), "{3}");
    }
}
