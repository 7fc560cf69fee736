//! Reference-counted boolean state.
//!
//! A [`Retainable`] is `true` while at least one holder has a reservation on it.
//! Holders are identified by [`HolderId`], so retaining twice with the same
//! holder counts once and releasing an absent holder does nothing.
//!
//! # Events
//!
//! [`Retainable::state_changed`] fires exactly once per edge: `true` when the
//! first holder arrives, `false` when the last one leaves. No-op retains and
//! releases never fire.
//!
//! Calling `retain`/`release` on the same retainable from inside a
//! `state_changed` handler is not supported. The holder set is unlocked while
//! handlers run, so it will not deadlock, but edge notifications may then be
//! observed out of order.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::signal::Signal;

static NEXT_HOLDER_ID: AtomicU64 = AtomicU64::new(1);

// ── HolderId ──────────────────────────────────────────────────────────────

/// Opaque identity of a caller holding a reservation.
///
/// Allocated once per caller via [`HolderId::new()`] and kept for as long as
/// the caller may hold reservations.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct HolderId(u64);

impl HolderId {
    /// Allocate a new, globally unique `HolderId`.
    pub fn new() -> Self {
        HolderId(NEXT_HOLDER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for HolderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "holder#{}", self.0)
    }
}

// ── Retainable ────────────────────────────────────────────────────────────

/// Boolean condition that holds while any reservation is outstanding.
pub struct Retainable {
    name:          &'static str,
    holders:       Mutex<HashSet<HolderId>>,
    state_changed: Signal<bool>,
}

impl Retainable {
    /// Creates an unretained instance; `name` only appears in diagnostics.
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            holders: Mutex::new(HashSet::new()),
            state_changed: Signal::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Adds a reservation for `holder`.
    ///
    /// Returns `true` if the holder was not already present. Fires
    /// `state_changed(true)` on the false → true edge only.
    pub fn retain(&self, holder: HolderId) -> bool {
        let edge = {
            let mut holders = self.holders.lock();
            if !holders.insert(holder) {
                return false;
            }
            holders.len() == 1
        };

        log::trace!("{}: retained by {holder}", self.name);
        if edge {
            log::debug!("{}: retained", self.name);
            self.state_changed.emit(&true);
        }
        true
    }

    /// Removes the reservation held by `holder`, if any.
    ///
    /// Returns `true` if the holder was present. Fires `state_changed(false)`
    /// on the true → false edge only.
    pub fn release(&self, holder: HolderId) -> bool {
        let edge = {
            let mut holders = self.holders.lock();
            if !holders.remove(&holder) {
                return false;
            }
            holders.is_empty()
        };

        log::trace!("{}: released by {holder}", self.name);
        if edge {
            log::debug!("{}: released", self.name);
            self.state_changed.emit(&false);
        }
        true
    }

    /// Drops every outstanding reservation at once.
    ///
    /// Fires a single `state_changed(false)` if the instance was retained.
    pub fn release_all(&self) -> usize {
        let released = {
            let mut holders = self.holders.lock();
            let n = holders.len();
            holders.clear();
            n
        };
        if released > 0 {
            log::debug!("{}: released all ({released} holders)", self.name);
            self.state_changed.emit(&false);
        }
        released
    }

    #[inline]
    pub fn is_retained(&self) -> bool {
        !self.holders.lock().is_empty()
    }

    #[inline]
    pub fn is_held_by(&self, holder: HolderId) -> bool {
        self.holders.lock().contains(&holder)
    }

    #[inline]
    pub fn holder_count(&self) -> usize {
        self.holders.lock().len()
    }

    /// Edge notifications; see the module docs.
    #[inline]
    pub fn state_changed(&self) -> &Signal<bool> {
        &self.state_changed
    }

    /// Retains under a fresh holder that is released when the guard drops.
    pub fn guard(self: &Arc<Self>) -> RetainGuard {
        let holder = HolderId::new();
        self.retain(holder);
        RetainGuard { retainable: Arc::clone(self), holder }
    }
}

impl fmt::Debug for Retainable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retainable")
            .field("name", &self.name)
            .field("holders", &self.holder_count())
            .finish()
    }
}

// ── RetainGuard ───────────────────────────────────────────────────────────

/// Scoped reservation returned by [`Retainable::guard`].
#[must_use = "the reservation is released as soon as the guard is dropped"]
pub struct RetainGuard {
    retainable: Arc<Retainable>,
    holder:     HolderId,
}

impl RetainGuard {
    #[inline]
    pub fn holder(&self) -> HolderId {
        self.holder
    }
}

impl Drop for RetainGuard {
    fn drop(&mut self) {
        self.retainable.release(self.holder);
    }
}
