//! Keel engine crate.
//!
//! Runtime coordination primitives shared by the UI layer and gameplay code:
//! reference-counted state, blocking/pause coordinators, the service registry
//! and the application lifecycle they hang off.

pub mod core;
pub mod logging;
pub mod signal;
pub mod retain;
pub mod time;

pub mod blocking;
pub mod pause;
pub mod registry;
