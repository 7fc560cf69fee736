//! Stack-based view navigation.
//!
//! [`ViewManager`] owns the open views as a LIFO stack. Only the top view is
//! shown; everything below it is hidden but alive and keeps its retains on the
//! coordinators, so a buried menu still counts as "in menu" and a buried
//! pausing view still keeps time frozen.
//!
//! Each open view retains [`BlockingState::menu`] under its own holder id and,
//! if it asks for it, the [`PauseCoordinator`]. Code outside the stack (a
//! cutscene player, a scripted event) can retain the same coordinators with
//! its own holder ids; both sources compose because holders are per caller.
//!
//! Handlers subscribed to [`ViewManager::transitions`] run while the manager
//! is borrowed and must not call back into it.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use keel_engine::blocking::BlockingState;
use keel_engine::pause::PauseCoordinator;
use keel_engine::registry::{Construct, Constructor, Service};
use keel_engine::signal::Signal;

use crate::event::ViewTransition;
use crate::focus::{FocusId, FocusManager};
use crate::input::UiInput;
use crate::view::{ConfirmAction, View, ViewId, ViewKind, ViewState};

// ── NavigationError ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("the navigation stack is empty")]
    Empty,

    #[error("{0} is not on the navigation stack")]
    UnknownView(ViewId),

    /// Ordering violation: only the top view may close.
    #[error("{view} cannot close while {top} is on top of the stack")]
    NotTopOfStack { view: ViewId, top: ViewId },

    #[error("{0} refused to close")]
    CloseVetoed(ViewId),

    #[error("{0} has already been opened")]
    AlreadyOpen(ViewId),

    #[error("{0} is not a confirm popup")]
    NotConfirm(ViewId),
}

// ── ViewManager ───────────────────────────────────────────────────────────

pub struct ViewManager {
    stack:       Vec<View>,
    blocking:    Arc<BlockingState>,
    pause:       Arc<PauseCoordinator>,
    focus:       FocusManager,
    transitions: Signal<ViewTransition>,
    violations:  u64,
}

impl ViewManager {
    pub fn new(blocking: Arc<BlockingState>, pause: Arc<PauseCoordinator>) -> Self {
        Self {
            stack: Vec::new(),
            blocking,
            pause,
            focus: FocusManager::new(),
            transitions: Signal::new(),
            violations: 0,
        }
    }

    // ── open ──────────────────────────────────────────────────────────────

    /// Pushes `view` as the new top.
    ///
    /// The previous top is hidden (its retains stay held and its focus is
    /// remembered). The new view retains the menu coordinator, the pause
    /// coordinator if `should_pause_the_game`, and gets focus on its first
    /// focusable element.
    pub fn open(&mut self, mut view: View) -> Result<ViewId, NavigationError> {
        let id = view.id();
        if view.state() != ViewState::Created {
            log::warn!("refusing to reopen {id} '{}' ({:?})", view.name(), view.state());
            return Err(NavigationError::AlreadyOpen(id));
        }

        if let Some(previous) = self.stack.last_mut() {
            previous.bury(self.focus.focused());
            log::debug!("view hidden: {} '{}'", previous.id(), previous.name());
            self.transitions.emit(&ViewTransition::Hidden(previous.id()));
        }

        view.set_state(ViewState::Opened);
        let holder = view.holder();
        let pauses = view.options().should_pause_the_game;
        let first = view.first_focusable();
        log::info!("view opened: {id} '{}'", view.name());
        self.stack.push(view);

        self.blocking.menu().retain(holder);
        if pauses {
            self.pause.retain(holder);
        }
        self.transitions.emit(&ViewTransition::Opened(id));

        match first {
            Some(element) => {
                self.focus.focus(element);
            }
            None => {
                self.focus.clear();
            }
        }
        self.transitions.emit(&ViewTransition::Shown(id));
        Ok(id)
    }

    // ── close ─────────────────────────────────────────────────────────────

    /// Closes `id`, which must be the top view, and hands it back.
    ///
    /// Closing anything else is an ordering violation: it is logged, counted
    /// and reported as [`NavigationError::NotTopOfStack`]; the stack is left
    /// unchanged. On success the new top (if any) is shown again with its
    /// previous focus restored.
    pub fn close(&mut self, id: ViewId) -> Result<View, NavigationError> {
        let Some(top) = self.stack.last() else {
            log::warn!("close requested for {id} but the navigation stack is empty");
            return Err(NavigationError::Empty);
        };

        if top.id() != id {
            let top = top.id();
            if !self.contains(id) {
                return Err(NavigationError::UnknownView(id));
            }
            self.violations += 1;
            log::warn!("ordering violation: {id} asked to close while {top} is on top; ignored");
            return Err(NavigationError::NotTopOfStack { view: id, top });
        }
        if top.is_close_locked() {
            log::warn!("{id} '{}' refused to close", top.name());
            return Err(NavigationError::CloseVetoed(id));
        }

        let Some(mut closed) = self.stack.pop() else {
            return Err(NavigationError::Empty);
        };

        let holder = closed.holder();
        self.blocking.menu().release(holder);
        self.pause.release(holder);

        if self.focus.focused().is_some_and(|f| closed.declares(f)) {
            self.focus.clear();
        }
        closed.set_state(ViewState::Closed);
        log::info!("view closed: {id} '{}'", closed.name());
        self.transitions.emit(&ViewTransition::Closed(id));

        if let Some(next) = self.stack.last_mut() {
            next.set_state(ViewState::Opened);
            if let Some(element) = next.resume_focus() {
                self.focus.focus(element);
            }
            log::debug!("view shown: {} '{}'", next.id(), next.name());
            self.transitions.emit(&ViewTransition::Shown(next.id()));
        }

        Ok(closed)
    }

    /// Closes whatever is on top.
    pub fn close_top(&mut self) -> Result<View, NavigationError> {
        let id = self.top_id().ok_or(NavigationError::Empty)?;
        self.close(id)
    }

    /// Closes views from the top down until the stack is empty.
    ///
    /// The top is re-read before each close. A view that refuses to close
    /// halts the cascade; views closed before it stay closed.
    pub fn close_all(&mut self) -> Result<Vec<View>, NavigationError> {
        let mut closed = Vec::with_capacity(self.stack.len());
        while let Some(top) = self.top_id() {
            match self.close(top) {
                Ok(view) => closed.push(view),
                Err(err) => {
                    log::warn!("close-all halted after {} views: {err}", closed.len());
                    return Err(err);
                }
            }
        }
        log::info!("all views have been closed");
        Ok(closed)
    }

    /// Submits the confirm popup `id`: closes it, then returns its action for
    /// the caller to run once the manager is no longer borrowed.
    pub fn confirm(&mut self, id: ViewId) -> Result<ConfirmAction, NavigationError> {
        match self.view(id).map(View::kind) {
            None => return Err(NavigationError::UnknownView(id)),
            Some(ViewKind::Panel) => return Err(NavigationError::NotConfirm(id)),
            Some(ViewKind::Confirm(_)) => {}
        }

        let mut view = self.close(id)?;
        log::info!("confirm popup submitted: {id} '{}'", view.name());
        match view.kind_mut() {
            ViewKind::Confirm(prompt) => prompt.take_action().ok_or(NavigationError::NotConfirm(id)),
            ViewKind::Panel => Err(NavigationError::NotConfirm(id)),
        }
    }

    // ── per-frame ─────────────────────────────────────────────────────────

    /// Per-frame upkeep for the top view.
    ///
    /// - cancel pressed and `can_close_with_cancel`: the top view closes and
    ///   is returned;
    /// - otherwise, with a gamepad connected, focus that does not belong to
    ///   the top view is replaced by its first focusable element so
    ///   controller navigation never dead-ends.
    pub fn tick(&mut self, input: &UiInput) -> Result<Option<View>, NavigationError> {
        let Some(top) = self.stack.last() else {
            return Ok(None);
        };

        if input.cancel_pressed && top.options().can_close_with_cancel {
            let id = top.id();
            log::debug!("cancel pressed on {id}");
            return self.close(id).map(Some);
        }

        let focus_valid = self.focus.focused().is_some_and(|f| top.declares(f));
        if !focus_valid && input.gamepad_connected {
            if let Some(fallback) = top.first_focusable() {
                log::debug!("restoring controller focus on {}", top.id());
                self.focus.focus(fallback);
            }
        }
        Ok(None)
    }

    /// Moves focus to `element` if the top view declares it.
    pub fn select(&mut self, element: FocusId) -> bool {
        let owned = self.stack.last().is_some_and(|top| top.declares(element));
        if owned {
            self.focus.focus(element);
        }
        owned
    }

    // ── queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn top(&self) -> Option<&View> {
        self.stack.last()
    }

    #[inline]
    pub fn top_id(&self) -> Option<ViewId> {
        self.stack.last().map(View::id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.stack.iter().any(|v| v.id() == id)
    }

    /// Open views, bottom to top.
    pub fn stack(&self) -> impl Iterator<Item = &View> {
        self.stack.iter()
    }

    pub fn stack_ids(&self) -> Vec<ViewId> {
        self.stack.iter().map(View::id).collect()
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.stack.iter().find(|v| v.id() == id)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.stack.iter_mut().find(|v| v.id() == id)
    }

    #[inline]
    pub fn focus(&self) -> &FocusManager {
        &self.focus
    }

    /// Rejected close requests (closing a view that was not on top).
    #[inline]
    pub fn ordering_violations(&self) -> u64 {
        self.violations
    }

    #[inline]
    pub fn transitions(&self) -> &Signal<ViewTransition> {
        &self.transitions
    }

    #[inline]
    pub fn blocking(&self) -> &Arc<BlockingState> {
        &self.blocking
    }

    #[inline]
    pub fn pause(&self) -> &Arc<PauseCoordinator> {
        &self.pause
    }
}

// ── Navigation (registry service) ─────────────────────────────────────────

/// The registered, shareable navigation stack.
///
/// ```rust,ignore
/// let nav = ctx.resolve::<Navigation>()?;
/// let id = nav.lock().open(View::panel("pause menu"))?;
/// ```
pub struct Navigation(Mutex<ViewManager>);

impl Navigation {
    pub fn new(manager: ViewManager) -> Self {
        Self(Mutex::new(manager))
    }

    /// Locks the stack. Do not hold the guard across calls that may re-enter
    /// navigation (e.g. running a [`ConfirmAction`]).
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, ViewManager> {
        self.0.lock()
    }
}

impl Service for Navigation {
    fn dispose(&self) {
        let mut manager = self.lock();
        if manager.is_empty() {
            return;
        }
        log::debug!("closing {} open views on shutdown", manager.len());
        if let Err(err) = manager.close_all() {
            log::warn!("views left open at shutdown: {err}");
        }
    }
}

impl Construct for Navigation {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|deps| {
            Ok(Self::new(ViewManager::new(deps.get()?, deps.get()?)))
        })]
    }
}
