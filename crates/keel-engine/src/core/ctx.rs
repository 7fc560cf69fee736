use std::sync::Arc;

use crate::registry::{Bootstrapper, RegistryError, ServiceRegistry};
use crate::time::FrameTime;

use super::quit::QuitSignal;

/// Composition root.
///
/// Owns the long-lived services of one application run: the
/// [`ServiceRegistry`] and the [`QuitSignal`] it is torn down by. Built once
/// per process, populated through [`AppContext::install`] before any feature
/// code runs, and torn down once through [`AppContext::quit`].
pub struct AppContext {
    quit:     Arc<QuitSignal>,
    registry: Arc<ServiceRegistry>,
}

impl AppContext {
    pub fn new() -> Self {
        let quit = Arc::new(QuitSignal::new());
        let registry = ServiceRegistry::new(Arc::clone(&quit));
        Self { quit, registry }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    #[inline]
    pub fn quit_signal(&self) -> &Arc<QuitSignal> {
        &self.quit
    }

    #[inline]
    pub fn is_quitting(&self) -> bool {
        self.quit.is_quitting()
    }

    /// Runs the startup phase.
    pub fn install(&self, bootstrapper: Bootstrapper) -> Result<usize, RegistryError> {
        bootstrapper.run(&self.registry)
    }

    /// Shorthand for `self.registry().resolve::<T>()`.
    #[inline]
    pub fn resolve<T>(&self) -> Result<Arc<T>, RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.registry.resolve::<T>()
    }

    /// Fires the quit signal, disposing every registered service.
    ///
    /// Returns `false` if quitting had already begun.
    pub fn quit(&self) -> bool {
        self.quit.trigger()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Requests issued by the app during a frame.
///
/// Buffered and applied by the host loop after the callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    exit_requested: bool,
}

impl RuntimeCtx {
    /// Asks the host loop to stop after the current frame.
    pub fn exit(&mut self) {
        self.exit_requested = true;
    }

    #[inline]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

/// Per-frame context passed to [`super::App::on_frame`].
pub struct FrameCtx<'a> {
    pub time:    FrameTime,
    pub context: &'a AppContext,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a> FrameCtx<'a> {
    /// Shorthand for `self.context.resolve::<T>()`.
    #[inline]
    pub fn resolve<T>(&self) -> Result<Arc<T>, RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.context.resolve::<T>()
    }
}
