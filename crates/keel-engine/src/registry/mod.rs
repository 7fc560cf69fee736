//! Service registry.
//!
//! A typed service locator owned by the application context. Services are
//! registered once during startup (see [`Bootstrapper`]), resolved by type
//! afterwards, and disposed exactly once when the application quits.
//!
//! Wiring is explicit:
//! - [`Construct`] declares how a service is built from other services
//!   (constructor injection);
//! - [`Inject`] fills in dependencies on objects the host creates without
//!   constructor arguments.

mod container;
mod error;
mod installer;
mod service;

pub use container::ServiceRegistry;
pub use error::RegistryError;
pub use installer::{Bootstrapper, CoreInstaller, Installer};
pub use service::{Construct, Constructor, Dependencies, Inject, Service};
