//! Keel UI: a navigation stack of views on top of `keel-engine`.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use keel_ui::prelude::*;
//!
//! let ctx = AppContext::new();
//! ctx.install(Bootstrapper::new().with(CoreInstaller).with(UiInstaller))?;
//!
//! let nav = ctx.resolve::<Navigation>()?;
//! let settings = nav.lock().open(View::panel("settings"))?;   // pauses, blocks input
//! let toast = nav.lock().open(
//!     View::panel("toast").with_options(ViewOptions::new().pause(false)),
//! )?;
//!
//! nav.lock().close(toast)?;
//! nav.lock().close(settings)?;                                  // time resumes
//! ```
//!
//! Each frame, feed a [`input::UiInput`] to
//! [`view_manager::ViewManager::tick`] so cancel presses close the top view
//! and gamepad focus never gets lost.

pub mod cursor;
pub mod event;
pub mod focus;
pub mod input;
pub mod install;
pub mod view;
pub mod view_manager;

pub use install::UiInstaller;
pub use view_manager::{Navigation, NavigationError, ViewManager};

/// Everything needed to drive navigation from an app.
pub mod prelude {
    pub use crate::cursor::{CursorManager, CursorState};
    pub use crate::event::ViewTransition;
    pub use crate::focus::{FocusId, FocusManager};
    pub use crate::input::UiInput;
    pub use crate::install::UiInstaller;
    pub use crate::view::{ConfirmAction, View, ViewId, ViewKind, ViewOptions, ViewState};
    pub use crate::view_manager::{Navigation, NavigationError, ViewManager};

    // Engine-side composition root.
    pub use keel_engine::blocking::{BlockingState, CutsceneMarker};
    pub use keel_engine::core::AppContext;
    pub use keel_engine::pause::PauseCoordinator;
    pub use keel_engine::registry::{Bootstrapper, CoreInstaller};
}
