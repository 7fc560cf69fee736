use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};

use keel_engine::core::{App, AppContext, AppControl, FrameCtx, HostConfig, HostLoop};
use keel_engine::logging::{LoggingConfig, init_logging};
use keel_engine::time::TimeScale;
use keel_ui::prelude::*;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ┌──────────────────────────────────────┐");
    println!("  │ KEEL STUDIO · navigation walkthrough │");
    println!("  └──────────────────────────────────────┘");
    println!();

    let ctx = AppContext::new();
    ctx.install(Bootstrapper::new().with(CoreInstaller).with(UiInstaller))
        .context("failed to install services")?;

    let mut session = Session::new(&ctx)?;
    let config = HostConfig { max_frames: Some(64), ..HostConfig::default() };
    let frames = HostLoop::run(config, &ctx, &mut session)?;

    if !session.confirmed.load(Ordering::Relaxed) {
        bail!("walkthrough stopped after {frames} frames without confirming quit");
    }
    log::info!("walkthrough finished in {frames} frames");
    Ok(())
}

// ── Session ───────────────────────────────────────────────────────────────

/// Scripted walkthrough: one navigation step per frame.
///
/// settings (pauses) → toast (no pause) → cutscene starts → toast closes →
/// settings closes → cutscene ends → quit prompt → confirm.
struct Session {
    nav:       Arc<Navigation>,
    blocking:  Arc<BlockingState>,
    time:      Arc<TimeScale>,
    cutscene:  Option<CutsceneMarker>,
    settings:  Option<ViewId>,
    toast:     Option<ViewId>,
    prompt:    Option<ViewId>,
    step:      usize,
    confirmed: Arc<AtomicBool>,
}

impl Session {
    fn new(ctx: &AppContext) -> Result<Self> {
        Ok(Self {
            nav:       ctx.resolve::<Navigation>().context("navigation is not installed")?,
            blocking:  ctx.resolve::<BlockingState>()?,
            time:      ctx.resolve::<TimeScale>()?,
            cutscene:  None,
            settings:  None,
            toast:     None,
            prompt:    None,
            step:      0,
            confirmed: Arc::new(AtomicBool::new(false)),
        })
    }

    fn advance(&mut self, ctx: &mut FrameCtx<'_>) -> Result<AppControl> {
        let step = self.step;
        self.step += 1;

        match step {
            0 => {
                let focusables = [FocusId::new(), FocusId::new()];
                let view = View::panel("settings").with_focusables(focusables);
                self.settings = Some(self.nav.lock().open(view)?);
            }
            1 => {
                let view = View::panel("toast").with_options(ViewOptions::new().pause(false));
                self.toast = Some(self.nav.lock().open(view)?);
            }
            2 => {
                let marker = CutsceneMarker::new(Arc::clone(&self.blocking));
                marker.set_playing(true);
                self.cutscene = Some(marker);
            }
            3 => {
                let toast = self.toast.take().context("toast was never opened")?;
                self.nav.lock().close(toast)?;
            }
            4 => {
                let settings = self.settings.take().context("settings were never opened")?;
                self.nav.lock().close(settings)?;
            }
            5 => {
                self.cutscene = None;
            }
            6 => {
                let flag = Arc::clone(&self.confirmed);
                let prompt = View::confirm("quit prompt", "Quit to desktop?", move || {
                    flag.store(true, Ordering::Relaxed);
                })
                .with_options(ViewOptions::new().close_with_cancel(false));
                self.prompt = Some(self.nav.lock().open(prompt)?);
            }
            7 => {
                let prompt = self.prompt.take().context("quit prompt was never opened")?;
                // Run outside the lock: the action may touch navigation.
                let action = self.nav.lock().confirm(prompt)?;
                action();
            }
            _ => {}
        }

        log::info!(
            "frame {:>2}: views={} paused={} blocking={:?} dt={:.4}s",
            ctx.time.frame_index,
            self.nav.lock().len(),
            self.time.is_paused(),
            self.blocking.snapshot(),
            ctx.time.dt,
        );

        if self.confirmed.load(Ordering::Relaxed) {
            ctx.runtime.exit();
        }
        Ok(AppControl::Continue)
    }
}

impl App for Session {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if let Err(err) = self.nav.lock().tick(&UiInput::default()) {
            log::warn!("navigation tick: {err}");
        }

        match self.advance(ctx) {
            Ok(control) => control,
            Err(err) => {
                log::error!("walkthrough step {} failed: {err:#}", self.step - 1);
                AppControl::Exit
            }
        }
    }

    fn on_quit(&mut self, _ctx: &AppContext) {
        let open = self.nav.lock().len();
        if open > 0 {
            log::warn!("{open} views still open at quit");
        }
    }
}
