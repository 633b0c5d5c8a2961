//! dual-hashmap: one key/value contract, two collision strategies.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: two hash maps with identical observable behavior and different
//!   collision handling, so each strategy's invariants can be checked
//!   against the same contract.
//! - Layers:
//!   - `SlotHash`: reduces a key to a slot index for a given capacity.
//!     Recomputed after every resize; there is no cached 64-bit digest.
//!   - `ChainedHashMap<K, V>`: buckets of ordered arena keys into a
//!     generational `SlotMap`. Never resizes.
//!   - `OpenHashMap<K, V>`: flat array of tagged slots, linear probing,
//!     tombstone deletion, doubling rebuild at a load factor threshold.
//!   - `ChainedSet<T>`: set algebra over `ChainedHashMap<T, ()>`.
//!   - `recipes`: small programs that only use the public contract.
//!
//! Constraints
//! - Single-threaded and synchronous; a rebuild happens inline in the
//!   `put` that triggers it.
//! - Keys are never mutated by a map; lookups accept borrowed forms
//!   (`K: Borrow<Q>`), so `SlotHash` must agree between `K` and `Q`.
//! - Every failure is a `MapError`; nothing is retried and a failed
//!   operation leaves the table as it was.
//!
//! Reentrancy policy
//! - Probing calls user code (`SlotHash`, `Eq`). Each table carries a
//!   debug-only probe guard; nested entry into the same table from that
//!   code panics in debug builds and is a no-op in release builds.
//!
//! Hashing policy
//! - Integers: Euclidean modulo. Strings: `h = (h * 31 + c) mod capacity`.
//! - Other keys opt in explicitly through `SlotHash` or the `Structural`
//!   wrapper; types without an impl do not compile as keys.
//!
//! Notes and non-goals
//! - No persistence, no concurrent writers, no secure hashing.
//! - Open-address capacity never shrinks; `clear` keeps it.
//! - Iteration order is deterministic for one table state and otherwise
//!   unspecified.

pub mod chained_hash_map;
pub mod chained_set;
pub mod config;
pub mod error;
mod map_proptest;
pub mod open_hash_map;
mod probe_guard;
pub mod recipes;
pub mod slot_hash;

use core::borrow::Borrow;

// Public surface
pub use chained_hash_map::{ChainedHashMap, Handle};
pub use chained_set::ChainedSet;
pub use config::TableConfig;
pub use error::{MapError, Result};
pub use open_hash_map::{OpenHashMap, SlotState};
pub use slot_hash::{SlotHash, Structural};

/// Operation contract shared by both map variants.
pub trait KeyValueMap<K, V> {
    /// Inserts or overwrites; returns the previous value on overwrite.
    fn put(&mut self, key: K, value: V) -> Result<Option<V>>;

    fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq;

    fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq;

    /// Removes the entry and returns its value.
    fn delete<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq;

    fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + SlotHash + Eq,
    {
        self.get(key).is_ok()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    fn items<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a V)>
    where
        K: 'a,
        V: 'a;

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K>
    where
        K: 'a,
        V: 'a,
    {
        self.items().map(|(k, _)| k)
    }

    fn values<'a>(&'a self) -> impl Iterator<Item = &'a V>
    where
        K: 'a,
        V: 'a,
    {
        self.items().map(|(_, v)| v)
    }
}
