//! Debug-only guard against re-entering a table while it is being probed.
//!
//! Probing calls user code (`SlotHash`, `Eq`). A key whose `eq` reaches back
//! into the same table would observe it mid-operation. Debug builds turn that
//! into a panic; release builds carry a zero-sized field and do nothing.

use core::cell::Cell;
use core::marker::PhantomData;

/// Busy flag embedded in each table. Public entry points call
/// `let _probe = self.guard.enter();` before touching slots.
#[derive(Debug)]
pub struct ProbeGuard {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // Shared references must not cross threads; the flag is not atomic.
    _not_sync: PhantomData<Cell<()>>,
}

impl ProbeGuard {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _not_sync: PhantomData,
        }
    }

    /// Marks the table busy until the returned token drops. Panics in debug
    /// builds if the table is already busy.
    #[inline]
    pub fn enter(&self) -> Probing<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "re-entrant access to a hash table during probing"
            );
        }
        Probing { guard: self }
    }
}

impl Default for ProbeGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ProbeGuard {
    /// A cloned table starts idle regardless of the source's state.
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// RAII token returned by [`ProbeGuard::enter`].
pub struct Probing<'a> {
    #[cfg_attr(not(debug_assertions), allow(dead_code))]
    guard: &'a ProbeGuard,
}

impl Drop for Probing<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.guard.busy.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::ProbeGuard;

    #[test]
    fn sequential_entries_are_fine() {
        let g = ProbeGuard::new();
        drop(g.enter());
        drop(g.enter());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_in_debug() {
        let g = ProbeGuard::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = g.enter();
            let _inner = g.enter();
        }));
        assert!(res.is_err(), "expected nested entry to panic in debug builds");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_entry_is_noop_in_release() {
        let g = ProbeGuard::new();
        let _outer = g.enter();
        let _inner = g.enter();
    }
}
