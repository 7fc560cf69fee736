//! "Is the player blocked?" aggregation.
//!
//! [`BlockingState`] composes two independent [`Retainable`]s, one for open
//! menus and one for playing cutscenes, into a single derived flag. Anything
//! that should stop reacting to gameplay input (camera control, interaction
//! prompts, ...) listens to [`BlockingState::changed`].
//!
//! `changed` is re-broadcast on every edge of *either* retainable, even when
//! the OR of both does not change (e.g. a cutscene starts while a menu is
//! already open). Listeners get "something about blocking changed" plus the
//! current aggregate.

use std::sync::{Arc, Weak};

use crate::registry::{Construct, Constructor, Service};
use crate::retain::{HolderId, Retainable};
use crate::signal::Signal;

/// Point-in-time view of both blocking sources.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct BlockingSnapshot {
    pub in_menu:          bool,
    pub playing_cutscene: bool,
}

impl BlockingSnapshot {
    #[inline]
    pub fn any(self) -> bool {
        self.in_menu || self.playing_cutscene
    }

    #[inline]
    pub fn not_in_menu(self) -> bool {
        !self.in_menu
    }

    #[inline]
    pub fn not_playing_cutscene(self) -> bool {
        !self.playing_cutscene
    }

    /// Neither in a menu nor in a cutscene.
    #[inline]
    pub fn neither(self) -> bool {
        !self.any()
    }
}

/// Menu + cutscene blocking coordinator.
pub struct BlockingState {
    menu:     Arc<Retainable>,
    cutscene: Arc<Retainable>,
    changed:  Arc<Signal<bool>>,
}

impl BlockingState {
    pub fn new() -> Self {
        let menu = Arc::new(Retainable::named("menu"));
        let cutscene = Arc::new(Retainable::named("cutscene"));
        let changed = Arc::new(Signal::new());

        relay(&menu, "in_menu", &menu, &cutscene, &changed);
        relay(&cutscene, "playing_cutscene", &menu, &cutscene, &changed);

        Self { menu, cutscene, changed }
    }

    /// Retainable toggled by the navigation stack while any view is open.
    #[inline]
    pub fn menu(&self) -> &Arc<Retainable> {
        &self.menu
    }

    /// Retainable toggled by cutscene players.
    #[inline]
    pub fn cutscene(&self) -> &Arc<Retainable> {
        &self.cutscene
    }

    #[inline]
    pub fn is_in_menu(&self) -> bool {
        self.menu.is_retained()
    }

    #[inline]
    pub fn is_playing_cutscene(&self) -> bool {
        self.cutscene.is_retained()
    }

    #[inline]
    pub fn in_menu_or_playing_cutscene(&self) -> bool {
        self.is_in_menu() || self.is_playing_cutscene()
    }

    pub fn snapshot(&self) -> BlockingSnapshot {
        BlockingSnapshot {
            in_menu:          self.is_in_menu(),
            playing_cutscene: self.is_playing_cutscene(),
        }
    }

    /// Fires once per edge of either source, carrying the aggregate value.
    #[inline]
    pub fn changed(&self) -> &Signal<bool> {
        &self.changed
    }
}

impl Default for BlockingState {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for BlockingState {
    /// Nothing stays blocked past shutdown, even if a view refused to close.
    fn dispose(&self) {
        let released = self.menu.release_all() + self.cutscene.release_all();
        if released > 0 {
            log::debug!("blocking: dropped {released} outstanding holders on shutdown");
        }
    }
}

impl Construct for BlockingState {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Ok(Self::new()))]
    }
}

// Handlers hold weak references: each retainable owns a handler that reads
// both retainables.
fn relay(
    source: &Retainable,
    label: &'static str,
    menu: &Arc<Retainable>,
    cutscene: &Arc<Retainable>,
    changed: &Arc<Signal<bool>>,
) {
    let menu = Arc::downgrade(menu);
    let cutscene = Arc::downgrade(cutscene);
    let changed = Arc::clone(changed);

    source.state_changed().subscribe(move |value| {
        log::info!("{label}: {value}");
        let aggregate = is_retained(&menu) || is_retained(&cutscene);
        changed.emit(&aggregate);
    });
}

fn is_retained(r: &Weak<Retainable>) -> bool {
    r.upgrade().is_some_and(|r| r.is_retained())
}

// ── CutsceneMarker ────────────────────────────────────────────────────────

/// Marks "a cutscene is playing" on behalf of one owner.
///
/// Each marker is its own holder, so several players can overlap without
/// stepping on each other or on the navigation stack. Dropping the marker
/// releases its reservation.
pub struct CutsceneMarker {
    blocking: Arc<BlockingState>,
    holder:   HolderId,
}

impl CutsceneMarker {
    pub fn new(blocking: Arc<BlockingState>) -> Self {
        Self { blocking, holder: HolderId::new() }
    }

    pub fn set_playing(&self, playing: bool) {
        if playing {
            self.blocking.cutscene().retain(self.holder);
        } else {
            self.blocking.cutscene().release(self.holder);
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.blocking.cutscene().is_held_by(self.holder)
    }
}

impl Drop for CutsceneMarker {
    fn drop(&mut self) {
        self.blocking.cutscene().release(self.holder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn observed(state: &BlockingState) -> Arc<Mutex<Vec<bool>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        state.changed().subscribe(move |v| sink.lock().push(*v));
        events
    }

    #[test]
    fn aggregate_is_or_of_sources() {
        let state = BlockingState::new();
        let h = HolderId::new();
        assert!(!state.in_menu_or_playing_cutscene());

        state.cutscene().retain(h);
        assert!(state.in_menu_or_playing_cutscene());
        assert_eq!(state.snapshot(), BlockingSnapshot { in_menu: false, playing_cutscene: true });
    }

    #[test]
    fn fires_on_every_source_edge_even_if_aggregate_is_unchanged() {
        let state = BlockingState::new();
        let events = observed(&state);
        let (menu_holder, scene_holder) = (HolderId::new(), HolderId::new());

        state.menu().retain(menu_holder);       // false -> true
        state.cutscene().retain(scene_holder);  // aggregate stays true
        state.menu().release(menu_holder);      // aggregate stays true
        state.cutscene().release(scene_holder); // true -> false

        assert_eq!(*events.lock(), vec![true, true, true, false]);
    }

    #[test]
    fn dispose_drops_every_holder() {
        let state = BlockingState::new();
        state.menu().retain(HolderId::new());
        state.cutscene().retain(HolderId::new());

        state.dispose();

        assert_eq!(state.snapshot(), BlockingSnapshot::default());
    }

    #[test]
    fn no_op_source_changes_do_not_fire() {
        let state = BlockingState::new();
        let events = observed(&state);
        let h = HolderId::new();

        state.menu().release(h);
        state.menu().retain(h);
        state.menu().retain(h);

        assert_eq!(*events.lock(), vec![true]);
    }

    #[test]
    fn snapshot_inversions() {
        let snap = BlockingSnapshot { in_menu: true, playing_cutscene: false };
        assert!(snap.any());
        assert!(!snap.not_in_menu());
        assert!(snap.not_playing_cutscene());
        assert!(!snap.neither());
        assert!(BlockingSnapshot::default().neither());
    }

    // ── CutsceneMarker ────────────────────────────────────────────────────

    #[test]
    fn markers_compose_with_menu_holders() {
        let state = Arc::new(BlockingState::new());
        let view = HolderId::new();
        let marker = CutsceneMarker::new(Arc::clone(&state));

        state.menu().retain(view);
        marker.set_playing(true);
        assert!(marker.is_playing());

        state.menu().release(view);
        assert!(state.in_menu_or_playing_cutscene());

        drop(marker);
        assert!(!state.in_menu_or_playing_cutscene());
    }
}
