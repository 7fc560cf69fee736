//! Time subsystem.
//!
//! Provides the global simulation time scale and frame timing utilities.
//! Intended usage:
//! - one shared `TimeScale`, frozen and resumed by the pause coordinator
//! - one `FrameClock` per host loop; call `tick()` once per frame to obtain
//!   `FrameTime` scaled by the current time scale

mod frame_clock;
mod time_scale;

pub use frame_clock::{FrameClock, FrameTime};
pub use time_scale::TimeScale;
