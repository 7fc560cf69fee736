use super::ctx::{AppContext, FrameCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by the host loop.
pub trait App {
    /// Called once per frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Called once after the last frame, before the quit signal fires.
    ///
    /// Services are still resolvable here.
    fn on_quit(&mut self, ctx: &AppContext) {
        let _ = ctx;
    }
}
