use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use keel_engine::retain::HolderId;

use crate::focus::FocusId;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

// ── ViewId ────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ViewId(u64);

impl ViewId {
    fn next() -> Self {
        ViewId(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

// ── ViewState ─────────────────────────────────────────────────────────────

/// Lifecycle of a view.
///
/// `Created → Opened → (Hidden → Opened)* → Closed`. `Closed` is terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ViewState {
    Created,
    /// Top of the stack: visible and interactive.
    Opened,
    /// Buried under another view; still alive and still blocking.
    Hidden,
    Closed,
}

// ── ViewOptions ───────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ViewOptions {
    /// Freeze simulation time while this view is on the stack.
    pub should_pause_the_game: bool,
    /// The cancel action closes this view when it is on top.
    pub can_close_with_cancel: bool,
}

impl ViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(mut self, pause: bool) -> Self {
        self.should_pause_the_game = pause;
        self
    }

    pub fn close_with_cancel(mut self, enabled: bool) -> Self {
        self.can_close_with_cancel = enabled;
        self
    }
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            should_pause_the_game: true,
            can_close_with_cancel: true,
        }
    }
}

// ── ViewKind ──────────────────────────────────────────────────────────────

/// Deferred work handed back by [`crate::view_manager::ViewManager::confirm`].
pub type ConfirmAction = Box<dyn FnOnce() + Send>;

/// Payload of a confirmation popup.
pub struct ConfirmPrompt {
    title:   String,
    button:  FocusId,
    action:  Option<ConfirmAction>,
}

impl ConfirmPrompt {
    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Focus id of the confirm button.
    #[inline]
    pub fn button(&self) -> FocusId {
        self.button
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.action.is_some()
    }

    pub(crate) fn take_action(&mut self) -> Option<ConfirmAction> {
        self.action.take()
    }
}

impl fmt::Debug for ConfirmPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmPrompt")
            .field("title", &self.title)
            .field("button", &self.button)
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// What a view is, beyond the shared stack behaviour.
#[derive(Debug)]
pub enum ViewKind {
    /// Plain panel (menu, settings page, ...).
    Panel,
    /// Yes/no popup whose confirm button runs an action.
    Confirm(ConfirmPrompt),
}

// ── View ──────────────────────────────────────────────────────────────────

/// One panel of the navigation stack.
///
/// Views are owned by the [`crate::view_manager::ViewManager`] while open and
/// handed back when closed.
#[derive(Debug)]
pub struct View {
    id:             ViewId,
    name:           String,
    holder:         HolderId,
    kind:           ViewKind,
    options:        ViewOptions,
    state:          ViewState,
    focusables:     Vec<FocusId>,
    first_selected: Option<FocusId>,
    last_selected:  Option<FocusId>,
    close_locked:   bool,
}

impl View {
    pub fn panel(name: impl Into<String>) -> Self {
        Self::with_kind(name, ViewKind::Panel)
    }

    /// A confirmation popup. The confirm button is its first focusable
    /// element; `action` runs after the popup closes.
    pub fn confirm<F>(name: impl Into<String>, title: impl Into<String>, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let button = FocusId::new();
        let prompt = ConfirmPrompt {
            title: title.into(),
            button,
            action: Some(Box::new(action)),
        };
        Self::with_kind(name, ViewKind::Confirm(prompt)).with_focusables([button])
    }

    fn with_kind(name: impl Into<String>, kind: ViewKind) -> Self {
        Self {
            id: ViewId::next(),
            name: name.into(),
            holder: HolderId::new(),
            kind,
            options: ViewOptions::default(),
            state: ViewState::Created,
            focusables: Vec::new(),
            first_selected: None,
            last_selected: None,
            close_locked: false,
        }
    }

    pub fn with_options(mut self, options: ViewOptions) -> Self {
        self.options = options;
        self
    }

    /// Declares focusable elements, in navigation order.
    pub fn with_focusables(mut self, ids: impl IntoIterator<Item = FocusId>) -> Self {
        for id in ids {
            if !self.focusables.contains(&id) {
                self.focusables.push(id);
            }
        }
        self
    }

    /// Element focused when the view opens; must be one of its focusables.
    pub fn with_first_selected(mut self, id: FocusId) -> Self {
        self = self.with_focusables([id]);
        self.first_selected = Some(id);
        self
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> ViewId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity used for this view's retains on the coordinators.
    #[inline]
    pub fn holder(&self) -> HolderId {
        self.holder
    }

    #[inline]
    pub fn kind(&self) -> &ViewKind {
        &self.kind
    }

    #[inline]
    pub fn options(&self) -> ViewOptions {
        self.options
    }

    #[inline]
    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Visible and interactive.
    #[inline]
    pub fn is_shown(&self) -> bool {
        self.state == ViewState::Opened
    }

    #[inline]
    pub fn focusables(&self) -> &[FocusId] {
        &self.focusables
    }

    #[inline]
    pub fn declares(&self, id: FocusId) -> bool {
        self.focusables.contains(&id)
    }

    /// Configured first selection, else the first declared focusable.
    pub fn first_focusable(&self) -> Option<FocusId> {
        self.first_selected.or_else(|| self.focusables.first().copied())
    }

    /// Element focused when this view was last buried.
    #[inline]
    pub fn last_selected(&self) -> Option<FocusId> {
        self.last_selected
    }

    /// A locked view refuses to close; this halts `close_all` cascades.
    pub fn set_close_locked(&mut self, locked: bool) {
        self.close_locked = locked;
    }

    #[inline]
    pub fn is_close_locked(&self) -> bool {
        self.close_locked
    }

    // ── transitions (driven by the manager) ───────────────────────────────

    pub(crate) fn set_state(&mut self, state: ViewState) {
        log::trace!("{} '{}': {:?} -> {:?}", self.id, self.name, self.state, state);
        self.state = state;
    }

    pub(crate) fn bury(&mut self, focused: Option<FocusId>) {
        self.last_selected = focused.filter(|id| self.declares(*id));
        self.set_state(ViewState::Hidden);
    }

    /// Where focus goes when this view becomes the top again.
    pub(crate) fn resume_focus(&self) -> Option<FocusId> {
        self.last_selected.or_else(|| self.first_focusable())
    }

    pub(crate) fn kind_mut(&mut self) -> &mut ViewKind {
        &mut self.kind
    }
}
