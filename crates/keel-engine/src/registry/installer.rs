use std::any::type_name;

use crate::blocking::BlockingState;
use crate::pause::PauseCoordinator;
use crate::time::TimeScale;

use super::container::ServiceRegistry;
use super::error::RegistryError;

/// A module that registers its services during startup.
pub trait Installer {
    /// Lower values install first.
    fn priority(&self) -> i32 {
        0
    }

    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn install(&self, registry: &ServiceRegistry) -> Result<(), RegistryError>;
}

/// Runs a set of [`Installer`]s against a registry, in ascending priority.
///
/// Installation stops at the first error: a failed installer means the
/// composition root is miswired and later installers would only cascade.
#[derive(Default)]
pub struct Bootstrapper {
    installers: Vec<Box<dyn Installer>>,
}

impl Bootstrapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, installer: impl Installer + 'static) -> Self {
        self.installers.push(Box::new(installer));
        self
    }

    /// Installs everything; returns the number of installers run.
    pub fn run(mut self, registry: &ServiceRegistry) -> Result<usize, RegistryError> {
        // Stable: equal priorities keep insertion order.
        self.installers.sort_by_key(|i| i.priority());

        for installer in &self.installers {
            log::debug!("installing {} (priority {})", installer.name(), installer.priority());
            installer.install(registry).inspect_err(|err| {
                log::error!("failed to install {}: {err}", installer.name());
            })?;
        }
        log::info!("{} installers completed", self.installers.len());
        Ok(self.installers.len())
    }
}

/// Registers the engine-level coordinators: [`TimeScale`], [`BlockingState`]
/// and [`PauseCoordinator`].
pub struct CoreInstaller;

impl Installer for CoreInstaller {
    fn priority(&self) -> i32 {
        i32::MIN
    }

    fn install(&self, registry: &ServiceRegistry) -> Result<(), RegistryError> {
        registry.register_constructed::<TimeScale>()?;
        registry.register_constructed::<BlockingState>()?;
        registry.register_constructed::<PauseCoordinator>()?;
        Ok(())
    }
}
