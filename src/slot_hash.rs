//! Slot hashing: the capacity-dependent key to index reduction both tables use.
//!
//! Policy
//! - Integers reduce by Euclidean modulo, so negative keys stay in range.
//! - Strings accumulate `h = (h * 31 + code_point) mod capacity` left to
//!   right from `h = 0`. `char` hashes as a one-character string.
//! - References, `Box` and `Rc` defer to the pointee so borrowed lookups
//!   (`String` stored, `&str` queried) land in the same slot.
//! - Every other key type has to opt in. Implement `SlotHash` directly, or
//!   wrap the key in [`Structural`], which reduces a fixed-key SipHash digest
//!   modulo capacity. Tuples use the structural fallback. A type with no impl
//!   is rejected at compile time rather than silently hashed.
//!
//! Indices are only meaningful for the capacity they were computed with;
//! tables recompute them after every resize.

use core::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;
use std::rc::Rc;

/// A key type that can be reduced to a slot index for a given capacity.
///
/// Implementations must return a value in `0..capacity` and must be
/// deterministic for a fixed key and capacity. Keys that compare equal must
/// produce the same index, including across `Borrow` forms.
pub trait SlotHash {
    fn slot_index(&self, capacity: usize) -> usize;
}

/// Polynomial string hash reduced at every step.
#[inline]
pub fn polynomial_index<I>(chars: I, capacity: usize) -> usize
where
    I: IntoIterator<Item = char>,
{
    debug_assert!(capacity > 0);
    let cap = capacity as u128;
    // h < cap <= 2^64, so h * 31 + code point fits comfortably in u128.
    chars
        .into_iter()
        .fold(0u128, |h, c| (h * 31 + c as u128) % cap) as usize
}

/// Generic fallback: SipHash with fixed keys, reduced modulo capacity.
#[inline]
pub fn structural_index<T>(value: &T, capacity: usize) -> usize
where
    T: ?Sized + Hash,
{
    debug_assert!(capacity > 0);
    let mut h = DefaultHasher::new();
    value.hash(&mut h);
    (h.finish() % capacity as u64) as usize
}

macro_rules! impl_slot_hash_int {
    ($($t:ty),* $(,)?) => {$(
        impl SlotHash for $t {
            #[inline]
            fn slot_index(&self, capacity: usize) -> usize {
                debug_assert!(capacity > 0);
                (*self as i128).rem_euclid(capacity as i128) as usize
            }
        }
    )*};
}

impl_slot_hash_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl SlotHash for i128 {
    #[inline]
    fn slot_index(&self, capacity: usize) -> usize {
        debug_assert!(capacity > 0);
        self.rem_euclid(capacity as i128) as usize
    }
}

impl SlotHash for u128 {
    #[inline]
    fn slot_index(&self, capacity: usize) -> usize {
        debug_assert!(capacity > 0);
        (*self % capacity as u128) as usize
    }
}

impl SlotHash for bool {
    #[inline]
    fn slot_index(&self, capacity: usize) -> usize {
        (*self as usize) % capacity
    }
}

impl SlotHash for char {
    #[inline]
    fn slot_index(&self, capacity: usize) -> usize {
        polynomial_index([*self], capacity)
    }
}

impl SlotHash for str {
    #[inline]
    fn slot_index(&self, capacity: usize) -> usize {
        polynomial_index(self.chars(), capacity)
    }
}

impl SlotHash for String {
    #[inline]
    fn slot_index(&self, capacity: usize) -> usize {
        self.as_str().slot_index(capacity)
    }
}

impl<T: ?Sized + SlotHash> SlotHash for &T {
    #[inline]
    fn slot_index(&self, capacity: usize) -> usize {
        (**self).slot_index(capacity)
    }
}

impl<T: ?Sized + SlotHash> SlotHash for Box<T> {
    #[inline]
    fn slot_index(&self, capacity: usize) -> usize {
        (**self).slot_index(capacity)
    }
}

impl<T: ?Sized + SlotHash> SlotHash for Rc<T> {
    #[inline]
    fn slot_index(&self, capacity: usize) -> usize {
        (**self).slot_index(capacity)
    }
}

macro_rules! impl_slot_hash_tuple {
    ($($name:ident),+) => {
        impl<$($name: Hash),+> SlotHash for ($($name,)+) {
            #[inline]
            fn slot_index(&self, capacity: usize) -> usize {
                structural_index(self, capacity)
            }
        }
    };
}

impl_slot_hash_tuple!(A);
impl_slot_hash_tuple!(A, B);
impl_slot_hash_tuple!(A, B, C);
impl_slot_hash_tuple!(A, B, C, D);

/// Opt-in wrapper for keys hashed through their `Hash` impl.
///
/// The digest is deterministic across runs. Uniformity after the modulo is
/// only as good as SipHash's low bits, which is adequate for non-adversarial
/// keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Structural<T>(pub T);

impl<T: Hash> SlotHash for Structural<T> {
    #[inline]
    fn slot_index(&self, capacity: usize) -> usize {
        structural_index(&self.0, capacity)
    }
}

impl<T> Structural<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}
