/// Errors reported by the [`super::ServiceRegistry`].
///
/// Every variant except `ShuttingDown` and `NotRegistered` is a wiring bug
/// and is expected during startup only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("service `{0}` is not registered")]
    NotRegistered(&'static str),

    #[error("service `{0}` is already registered")]
    AlreadyRegistered(&'static str),

    #[error("`{0}` is too generic to register; use a specific service type")]
    TooGeneric(&'static str),

    #[error("`{service}` must declare exactly one constructor, found {found}")]
    ConstructorCount { service: &'static str, found: usize },

    #[error("dependency `{dependency}` not registered for `{service}`")]
    MissingDependency {
        service:    &'static str,
        dependency: &'static str,
    },

    #[error("`{0}` requested while the application is quitting")]
    ShuttingDown(&'static str),
}
