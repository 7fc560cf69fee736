//! Focus (selection) tracking.
//!
//! One [`FocusManager`] lives inside the [`crate::view_manager::ViewManager`]
//! and holds the single focused element across all views. Views declare the
//! [`FocusId`]s they own; the manager only stores which one is focused.
//!
//! # How focus moves
//!
//! 1. Opening a view focuses its first focusable element.
//! 2. Burying a view records the element focused at that moment.
//! 3. Resuming a view restores that element, or falls back to its first
//!    focusable element.
//! 4. Each frame, [`crate::view_manager::ViewManager::tick`] re-focuses the
//!    fallback if the focused element no longer belongs to the top view and a
//!    gamepad is connected.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FOCUS_ID: AtomicU64 = AtomicU64::new(1);

// ── FocusId ───────────────────────────────────────────────────────────────

/// Unique identifier for a focusable element.
///
/// Allocated once per element via [`FocusId::new()`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FocusId(u64);

impl FocusId {
    /// Allocate a new, globally unique `FocusId`.
    pub fn new() -> Self {
        FocusId(NEXT_FOCUS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for FocusId {
    fn default() -> Self {
        Self::new()
    }
}

// ── FocusManager ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FocusManager {
    focused: Option<FocusId>,
    /// Focus before the most recent change.
    previous: Option<FocusId>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn focused(&self) -> Option<FocusId> {
        self.focused
    }

    #[inline]
    pub fn is_focused(&self, id: FocusId) -> bool {
        self.focused == Some(id)
    }

    /// Moves focus to `id`; returns the element that lost it.
    pub fn focus(&mut self, id: FocusId) -> Option<FocusId> {
        self.set(Some(id))
    }

    /// Clears focus (e.g. a mouse user clicked empty space).
    pub fn clear(&mut self) -> Option<FocusId> {
        self.set(None)
    }

    /// The element focused before the most recent change.
    #[inline]
    pub fn previous(&self) -> Option<FocusId> {
        self.previous
    }

    fn set(&mut self, next: Option<FocusId>) -> Option<FocusId> {
        if self.focused == next {
            return None;
        }
        self.previous = self.focused;
        self.focused = next;
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(FocusId::new(), FocusId::new());
    }

    #[test]
    fn focus_reports_the_element_that_lost_it() {
        let (a, b) = (FocusId::new(), FocusId::new());
        let mut fm = FocusManager::new();

        assert_eq!(fm.focus(a), None);
        assert_eq!(fm.focus(b), Some(a));
        assert!(fm.is_focused(b));
        assert_eq!(fm.previous(), Some(a));
    }

    #[test]
    fn refocusing_the_same_element_is_a_no_op() {
        let a = FocusId::new();
        let mut fm = FocusManager::new();
        fm.focus(a);
        assert_eq!(fm.focus(a), None);
        assert_eq!(fm.previous(), None);
    }

    #[test]
    fn clear_drops_focus() {
        let a = FocusId::new();
        let mut fm = FocusManager::new();
        fm.focus(a);
        assert_eq!(fm.clear(), Some(a));
        assert_eq!(fm.focused(), None);
    }
}
