use parking_lot::Mutex;

use crate::registry::{Construct, Constructor, Service};
use crate::signal::Signal;

#[derive(Debug, Copy, Clone)]
struct ScaleState {
    current: f32,
    /// Last non-zero scale; restored on resume.
    resume: f32,
}

/// Global simulation time scale.
///
/// `0.0` means the simulation is frozen. Changes are announced through
/// [`TimeScale::paused_changed`] (frozen/running edges only) and
/// [`TimeScale::scale_changed`] (`(old, new)`, every effective change).
pub struct TimeScale {
    state: Mutex<ScaleState>,
    paused_changed: Signal<bool>,
    scale_changed: Signal<(f32, f32)>,
}

impl TimeScale {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScaleState { current: 1.0, resume: 1.0 }),
            paused_changed: Signal::new(),
            scale_changed: Signal::new(),
        }
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.state.lock().current
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        is_zero(self.scale())
    }

    /// Sets the time scale. Negative and NaN values clamp to `0.0`; setting
    /// the current value is a no-op.
    pub fn set_scale(&self, scale: f32) {
        let scale = scale.max(0.0);
        let old = {
            let mut state = self.state.lock();
            if state.current == scale {
                return;
            }
            let old = state.current;
            state.current = scale;
            if !is_zero(scale) {
                state.resume = scale;
            }
            old
        };

        log::debug!("time scale {old} -> {scale}");
        if is_zero(old) != is_zero(scale) {
            self.paused_changed.emit(&is_zero(scale));
        }
        self.scale_changed.emit(&(old, scale));
    }

    /// Freezes (`true`) or resumes (`false`) the simulation.
    ///
    /// Resuming restores the last non-zero scale.
    pub fn set_paused(&self, paused: bool) {
        if paused {
            self.set_scale(0.0);
        } else {
            let resume = self.state.lock().resume;
            if self.is_paused() {
                self.set_scale(resume);
            }
        }
    }

    #[inline]
    pub fn paused_changed(&self) -> &Signal<bool> {
        &self.paused_changed
    }

    #[inline]
    pub fn scale_changed(&self) -> &Signal<(f32, f32)> {
        &self.scale_changed
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for TimeScale {}

impl Construct for TimeScale {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Ok(Self::new()))]
    }
}

fn is_zero(scale: f32) -> bool {
    scale.abs() <= f32::EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn pause_and_resume_restore_custom_scale() {
        let ts = TimeScale::new();
        ts.set_scale(0.5);
        ts.set_paused(true);
        assert!(ts.is_paused());
        ts.set_paused(false);
        assert_eq!(ts.scale(), 0.5);
    }

    #[test]
    fn paused_changed_fires_on_edges_only() {
        let ts = TimeScale::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        ts.paused_changed().subscribe(move |p| sink.lock().push(*p));

        ts.set_scale(2.0);
        ts.set_paused(true);
        ts.set_paused(true);
        ts.set_paused(false);
        ts.set_paused(false);

        assert_eq!(*events.lock(), vec![true, false]);
    }

    #[test]
    fn scale_changed_reports_old_and_new() {
        let ts = TimeScale::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        ts.scale_changed().subscribe(move |pair| sink.lock().push(*pair));

        ts.set_scale(1.0);
        ts.set_scale(-3.0);

        assert_eq!(*events.lock(), vec![(1.0, 0.0)]);
    }
}
