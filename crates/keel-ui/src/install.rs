use keel_engine::registry::{Installer, RegistryError, ServiceRegistry};

use crate::cursor::CursorManager;
use crate::view_manager::Navigation;

/// Registers the UI services: [`Navigation`] and [`CursorManager`].
///
/// Runs right after [`keel_engine::registry::CoreInstaller`], whose
/// coordinators both services depend on.
pub struct UiInstaller;

impl Installer for UiInstaller {
    fn priority(&self) -> i32 {
        i32::MIN + 1
    }

    fn install(&self, registry: &ServiceRegistry) -> Result<(), RegistryError> {
        registry.register_constructed::<Navigation>()?;
        registry.register_constructed::<CursorManager>()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::View;
    use keel_engine::core::AppContext;
    use keel_engine::registry::{Bootstrapper, CoreInstaller};
    use keel_engine::time::TimeScale;

    #[test]
    fn ui_services_resolve_after_core() {
        let ctx = AppContext::new();
        // Registered out of order on purpose; priority sorts it out.
        let n = ctx
            .install(Bootstrapper::new().with(UiInstaller).with(CoreInstaller))
            .unwrap();
        assert_eq!(n, 2);

        let nav = ctx.resolve::<Navigation>().unwrap();
        let cursor = ctx.resolve::<CursorManager>().unwrap();

        nav.lock().open(View::panel("pause menu")).unwrap();
        assert!(ctx.resolve::<TimeScale>().unwrap().is_paused());
        assert!(cursor.state().visible);
    }

    #[test]
    fn ui_without_core_reports_the_missing_dependency() {
        let ctx = AppContext::new();
        let err = ctx.install(Bootstrapper::new().with(UiInstaller)).unwrap_err();
        assert!(matches!(err, RegistryError::MissingDependency { .. }));
    }

    #[test]
    fn quitting_closes_open_views_and_resumes_time() {
        let ctx = AppContext::new();
        ctx.install(Bootstrapper::new().with(CoreInstaller).with(UiInstaller)).unwrap();
        let nav = ctx.resolve::<Navigation>().unwrap();
        nav.lock().open(View::panel("a")).unwrap();
        nav.lock().open(View::panel("b")).unwrap();

        ctx.quit();

        assert!(nav.lock().is_empty());
        assert!(!nav.lock().blocking().is_in_menu());
        assert!(!nav.lock().pause().time_scale().is_paused());
    }

    #[test]
    fn a_view_refusing_to_close_does_not_keep_the_menu_blocked_after_quit() {
        let ctx = AppContext::new();
        ctx.install(Bootstrapper::new().with(CoreInstaller).with(UiInstaller)).unwrap();
        let nav = ctx.resolve::<Navigation>().unwrap();
        let id = nav.lock().open(View::panel("save in progress")).unwrap();
        nav.lock().view_mut(id).unwrap().set_close_locked(true);

        ctx.quit();

        let nav = nav.lock();
        assert_eq!(nav.len(), 1);
        assert!(!nav.blocking().is_in_menu());
        assert!(!nav.pause().time_scale().is_paused());
    }
}
