/// Snapshot of navigation-relevant input for one frame.
///
/// Construct this from the host's input state each frame and pass it to
/// [`crate::view_manager::ViewManager::tick`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UiInput {
    /// A gamepad is connected; focus must never be left empty.
    pub gamepad_connected: bool,
    /// The "cancel" action (Escape / B button) was pressed this frame.
    pub cancel_pressed: bool,
}
