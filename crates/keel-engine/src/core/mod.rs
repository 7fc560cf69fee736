//! Core application contracts.
//!
//! This module defines the interface between the host (frame loop, quit
//! events) and the application: the composition root ([`AppContext`]), the
//! one-shot [`QuitSignal`], the per-frame [`App`] callbacks and a headless
//! [`HostLoop`] that drives them.

mod app;
mod ctx;
mod host;
mod quit;

pub use app::{App, AppControl};
pub use ctx::{AppContext, FrameCtx, RuntimeCtx};
pub use host::{HostConfig, HostLoop};
pub use quit::QuitSignal;
