use std::any::type_name;
use std::sync::Arc;

use super::container::ServiceRegistry;
use super::error::RegistryError;

/// A long-lived object stored in the [`ServiceRegistry`].
pub trait Service: Send + Sync + 'static {
    /// Called once when the application quits, before the registry is
    /// cleared. Services are disposed in reverse registration order.
    fn dispose(&self) {}
}

/// One way of building `T` from registered dependencies.
pub struct Constructor<T> {
    build: Box<dyn FnOnce(&Dependencies<'_>) -> Result<T, RegistryError>>,
}

impl<T> Constructor<T> {
    pub fn new<F>(build: F) -> Self
    where
        F: FnOnce(&Dependencies<'_>) -> Result<T, RegistryError> + 'static,
    {
        Self { build: Box::new(build) }
    }

    pub(crate) fn build(self, deps: &Dependencies<'_>) -> Result<T, RegistryError> {
        (self.build)(deps)
    }
}

/// A service the registry can build itself.
///
/// Registration by type ([`ServiceRegistry::register_constructed`]) requires
/// exactly one declared constructor; zero or several is rejected at
/// registration time.
///
/// ```rust,ignore
/// impl Construct for CursorManager {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|deps| Ok(Self::new(deps.get()?)))]
///     }
/// }
/// ```
pub trait Construct: Service + Sized {
    fn constructors() -> Vec<Constructor<Self>>;
}

/// Post-construction injection for objects created outside the registry.
pub trait Inject {
    fn inject(&mut self, deps: &Dependencies<'_>) -> Result<(), RegistryError>;
}

/// Read access to the registry on behalf of a dependent type.
///
/// Unregistered dependencies surface as [`RegistryError::MissingDependency`]
/// naming both sides.
pub struct Dependencies<'a> {
    registry:  &'a ServiceRegistry,
    requester: &'static str,
}

impl<'a> Dependencies<'a> {
    pub(crate) fn new(registry: &'a ServiceRegistry, requester: &'static str) -> Self {
        Self { registry, requester }
    }

    /// Resolves `D` or reports it as missing for the requester.
    pub fn get<D>(&self) -> Result<Arc<D>, RegistryError>
    where
        D: ?Sized + Send + Sync + 'static,
    {
        match self.registry.resolve::<D>() {
            Err(RegistryError::NotRegistered(_)) => Err(RegistryError::MissingDependency {
                service:    self.requester,
                dependency: type_name::<D>(),
            }),
            other => other,
        }
    }

    /// Resolves `D` into `slot`, logging instead of failing.
    ///
    /// Returns whether the slot was filled; used by [`Inject`] impls that
    /// prefer partially wired objects over none.
    pub fn fill<D>(&self, slot: &mut Option<Arc<D>>) -> bool
    where
        D: ?Sized + Send + Sync + 'static,
    {
        match self.get::<D>() {
            Ok(dep) => {
                *slot = Some(dep);
                true
            }
            Err(err) => {
                log::error!("error injecting dependency into `{}`: {err}", self.requester);
                false
            }
        }
    }

    #[inline]
    pub fn requester(&self) -> &'static str {
        self.requester
    }
}
