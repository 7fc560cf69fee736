use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::time::{FrameClock, TimeScale};

use super::app::{App, AppControl};
use super::ctx::{AppContext, FrameCtx, RuntimeCtx};

/// Host loop configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Stop after this many frames; `None` runs until the app exits.
    pub max_frames: Option<u64>,
    pub dt_min:     Duration,
    pub dt_max:     Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_frames: None,
            dt_min:     Duration::from_micros(100),
            dt_max:     Duration::from_millis(250),
        }
    }
}

/// Headless frame loop.
///
/// Each frame: tick the clock scaled by the registered [`TimeScale`], call
/// [`App::on_frame`], apply buffered runtime requests. On exit the app gets
/// [`App::on_quit`] and then the context's quit signal fires.
pub struct HostLoop;

impl HostLoop {
    /// Runs `app` to completion; returns the number of frames driven.
    pub fn run<A: App>(config: HostConfig, context: &AppContext, app: &mut A) -> Result<u64> {
        if context.is_quitting() {
            bail!("cannot start the host loop: application is already quitting");
        }
        let time_scale = context
            .resolve::<TimeScale>()
            .context("host loop requires a registered TimeScale")?;

        let mut clock = FrameClock::with_clamps(config.dt_min, config.dt_max);
        let mut runtime = RuntimeCtx::default();
        let mut frames = 0u64;

        loop {
            if config.max_frames.is_some_and(|max| frames >= max) {
                log::info!("frame cap reached ({frames} frames)");
                break;
            }

            let time = clock.tick(time_scale.scale());
            let control = {
                let mut ctx = FrameCtx { time, context, runtime: &mut runtime };
                app.on_frame(&mut ctx)
            };
            frames += 1;

            if control == AppControl::Exit || runtime.exit_requested() {
                log::debug!("exit requested at frame {}", time.frame_index);
                break;
            }
        }

        app.on_quit(context);
        context.quit();
        Ok(frames)
    }
}
