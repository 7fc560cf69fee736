//! Simulation pause coordination.
//!
//! [`PauseCoordinator`] is a second, independent [`Retainable`] whose edges
//! freeze and resume the shared [`TimeScale`]. It is deliberately separate
//! from [`crate::blocking::BlockingState`]: a view can block input without
//! freezing time.

use std::sync::Arc;

use crate::registry::{Construct, Constructor, Service};
use crate::retain::{HolderId, Retainable};
use crate::time::TimeScale;

pub struct PauseCoordinator {
    retainable: Arc<Retainable>,
    time_scale: Arc<TimeScale>,
}

impl PauseCoordinator {
    pub fn new(time_scale: Arc<TimeScale>) -> Self {
        let retainable = Arc::new(Retainable::named("pause"));

        let target = Arc::clone(&time_scale);
        retainable.state_changed().subscribe(move |paused| {
            log::info!("simulation {}", if *paused { "paused" } else { "resumed" });
            target.set_paused(*paused);
        });

        Self { retainable, time_scale }
    }

    #[inline]
    pub fn retain(&self, holder: HolderId) -> bool {
        self.retainable.retain(holder)
    }

    #[inline]
    pub fn release(&self, holder: HolderId) -> bool {
        self.retainable.release(holder)
    }

    /// `true` while at least one holder requests a pause.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.retainable.is_retained()
    }

    #[inline]
    pub fn retainable(&self) -> &Arc<Retainable> {
        &self.retainable
    }

    #[inline]
    pub fn time_scale(&self) -> &Arc<TimeScale> {
        &self.time_scale
    }
}

impl Service for PauseCoordinator {
    /// Never leave the simulation frozen past shutdown.
    fn dispose(&self) {
        let released = self.retainable.release_all();
        if released > 0 {
            log::debug!("pause: dropped {released} outstanding holders on shutdown");
        }
    }
}

impl Construct for PauseCoordinator {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|deps| Ok(Self::new(deps.get::<TimeScale>()?)))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> (PauseCoordinator, Arc<TimeScale>) {
        let ts = Arc::new(TimeScale::new());
        (PauseCoordinator::new(Arc::clone(&ts)), ts)
    }

    #[test]
    fn retain_freezes_and_last_release_resumes() {
        let (pause, ts) = coordinator();
        let (a, b) = (HolderId::new(), HolderId::new());

        pause.retain(a);
        assert!(ts.is_paused());
        pause.retain(b);
        pause.release(a);
        assert!(ts.is_paused());
        pause.release(b);
        assert!(!ts.is_paused());
        assert_eq!(ts.scale(), 1.0);
    }

    #[test]
    fn dispose_resumes_time() {
        let (pause, ts) = coordinator();
        pause.retain(HolderId::new());
        pause.dispose();
        assert!(!pause.is_paused());
        assert!(!ts.is_paused());
    }
}
