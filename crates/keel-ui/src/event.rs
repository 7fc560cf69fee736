use crate::view::ViewId;

/// Navigation-stack lifecycle notifications.
///
/// Emitted by [`crate::view_manager::ViewManager::transitions`] in the order
/// the transitions happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTransition {
    /// Pushed onto the stack.
    Opened(ViewId),
    /// Became the interactive top (on open or on resume).
    Shown(ViewId),
    /// Buried under a newly opened view.
    Hidden(ViewId),
    /// Popped and destroyed.
    Closed(ViewId),
}

impl ViewTransition {
    #[inline]
    pub fn view(self) -> ViewId {
        match self {
            Self::Opened(id) | Self::Shown(id) | Self::Hidden(id) | Self::Closed(id) => id,
        }
    }
}
