//! Pointer visibility driven by menu state.
//!
//! Entering a menu shows and frees the cursor, unless a gamepad is driving the
//! UI. Leaving the last menu hides and locks it again. The host applies
//! [`CursorState`] to the real platform cursor; subscribe to
//! [`CursorManager::changed`] or poll [`CursorManager::state`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use keel_engine::blocking::BlockingState;
use keel_engine::registry::{Construct, Constructor, Service};
use keel_engine::signal::{Signal, SubscriptionId};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CursorState {
    pub visible: bool,
    /// Confined to the window center (gameplay look mode).
    pub locked:  bool,
}

impl CursorState {
    pub const SHOWN: Self = Self { visible: true, locked: false };
    pub const HIDDEN: Self = Self { visible: false, locked: true };
}

impl Default for CursorState {
    fn default() -> Self {
        Self::SHOWN
    }
}

/// Shared between the manager and its menu subscription.
struct Shared {
    state:   Mutex<CursorState>,
    gamepad: AtomicBool,
    changed: Signal<CursorState>,
}

impl Shared {
    fn apply(&self, next: CursorState) {
        let prev = std::mem::replace(&mut *self.state.lock(), next);
        if prev != next {
            log::debug!("cursor: visible={} locked={}", next.visible, next.locked);
            self.changed.emit(&next);
        }
    }

    fn show_if_needed(&self) {
        if self.gamepad.load(Ordering::Relaxed) {
            log::debug!("gamepad connected, not showing cursor");
            return;
        }
        self.apply(CursorState::SHOWN);
    }
}

pub struct CursorManager {
    shared:       Arc<Shared>,
    blocking:     Arc<BlockingState>,
    subscription: SubscriptionId,
}

impl CursorManager {
    pub fn new(blocking: Arc<BlockingState>) -> Self {
        let shared = Arc::new(Shared {
            state:   Mutex::new(CursorState::default()),
            gamepad: AtomicBool::new(false),
            changed: Signal::new(),
        });

        let weak = Arc::downgrade(&shared);
        let subscription = blocking.menu().state_changed().subscribe(move |in_menu| {
            let Some(shared) = weak.upgrade() else { return };
            if *in_menu {
                shared.show_if_needed();
            } else {
                shared.apply(CursorState::HIDDEN);
            }
        });

        Self { shared, blocking, subscription }
    }

    pub fn set_gamepad_connected(&self, connected: bool) {
        self.shared.gamepad.store(connected, Ordering::Relaxed);
    }

    #[inline]
    pub fn gamepad_connected(&self) -> bool {
        self.shared.gamepad.load(Ordering::Relaxed)
    }

    /// Shows the cursor unless a gamepad is connected.
    pub fn show_if_needed(&self) {
        self.shared.show_if_needed();
    }

    pub fn hide(&self) {
        self.shared.apply(CursorState::HIDDEN);
    }

    #[inline]
    pub fn state(&self) -> CursorState {
        *self.shared.state.lock()
    }

    #[inline]
    pub fn changed(&self) -> &Signal<CursorState> {
        &self.shared.changed
    }
}

impl Service for CursorManager {
    /// Hands the pointer back to the user on quit.
    fn dispose(&self) {
        self.blocking.menu().state_changed().unsubscribe(self.subscription);
        self.shared.apply(CursorState::SHOWN);
    }
}

impl Construct for CursorManager {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|deps| Ok(Self::new(deps.get()?)))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_engine::retain::HolderId;

    fn setup() -> (CursorManager, Arc<BlockingState>) {
        let blocking = Arc::new(BlockingState::new());
        (CursorManager::new(Arc::clone(&blocking)), blocking)
    }

    #[test]
    fn menu_edges_show_and_hide_the_cursor() {
        let (cursor, blocking) = setup();
        let menu = HolderId::new();

        blocking.menu().retain(menu);
        assert_eq!(cursor.state(), CursorState::SHOWN);

        blocking.menu().release(menu);
        assert_eq!(cursor.state(), CursorState::HIDDEN);
    }

    #[test]
    fn gamepad_keeps_the_cursor_hidden_in_menus() {
        let (cursor, blocking) = setup();
        cursor.hide();
        cursor.set_gamepad_connected(true);

        blocking.menu().retain(HolderId::new());
        assert_eq!(cursor.state(), CursorState::HIDDEN);

        cursor.set_gamepad_connected(false);
        cursor.show_if_needed();
        assert!(cursor.state().visible);
    }

    #[test]
    fn changes_are_reported_once_per_edge() {
        let (cursor, _blocking) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        cursor.changed().subscribe(move |s| sink.lock().push(*s));

        cursor.hide();
        cursor.hide();
        cursor.show_if_needed();

        assert_eq!(*seen.lock(), vec![CursorState::HIDDEN, CursorState::SHOWN]);
    }

    #[test]
    fn dispose_detaches_and_restores_the_cursor() {
        let (cursor, blocking) = setup();
        let menu = HolderId::new();
        blocking.menu().retain(menu);
        cursor.dispose();

        blocking.menu().release(menu);
        assert_eq!(cursor.state(), CursorState::SHOWN);
        assert_eq!(blocking.menu().state_changed().subscriber_count(), 1);
    }
}
