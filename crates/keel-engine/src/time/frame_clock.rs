use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Simulation time elapsed since the previous tick, in seconds.
    ///
    /// `unscaled_dt` multiplied by the time scale in effect at the tick; zero
    /// while the simulation is frozen.
    pub dt: f32,

    /// Wall-clock time elapsed since the previous tick, in seconds (clamped).
    pub unscaled_dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.dt == 0.0
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped before scaling so that debugger stalls or a
/// minimized window do not produce pathological values.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps (0.1 ms .. 250 ms).
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the clock baseline, e.g. when resuming from suspension.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    ///
    /// `time_scale` is the simulation time scale for this frame; negative
    /// values are treated as zero.
    pub fn tick(&mut self, time_scale: f32) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let unscaled_dt = dt.as_secs_f32();
        let ft = FrameTime {
            dt: unscaled_dt * time_scale.max(0.0),
            unscaled_dt,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_increments() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1.0).frame_index, 0);
        assert_eq!(clock.tick(1.0).frame_index, 1);
    }

    #[test]
    fn dt_is_clamped() {
        let min = Duration::from_millis(10);
        let mut clock = FrameClock::with_clamps(min, Duration::from_millis(20));
        let ft = clock.tick(1.0);
        assert!(ft.unscaled_dt >= min.as_secs_f32());
        assert!(ft.unscaled_dt <= 0.020 + f32::EPSILON);
    }

    #[test]
    fn zero_scale_freezes_simulation_time() {
        let mut clock = FrameClock::new();
        let ft = clock.tick(0.0);
        assert!(ft.is_frozen());
        assert!(ft.unscaled_dt > 0.0);
    }

    #[test]
    fn negative_scale_is_treated_as_frozen() {
        let mut clock = FrameClock::new();
        assert!(clock.tick(-2.0).is_frozen());
    }
}
