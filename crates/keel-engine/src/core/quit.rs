use std::time::Instant;

use state::InitCell;

use crate::signal::{Signal, SubscriptionId};

/// One-shot "application is quitting" signal.
///
/// Transitions once, irreversibly. Subscribers (the service registry among
/// them) run synchronously inside the first [`QuitSignal::trigger`] call.
pub struct QuitSignal {
    began:    InitCell<Instant>,
    quitting: Signal<()>,
}

impl QuitSignal {
    pub fn new() -> Self {
        Self {
            began:    InitCell::new(),
            quitting: Signal::new(),
        }
    }

    #[inline]
    pub fn is_quitting(&self) -> bool {
        self.began.try_get().is_some()
    }

    /// When quitting began, if it has.
    #[inline]
    pub fn began_at(&self) -> Option<Instant> {
        self.began.try_get().copied()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&()) + Send + Sync + 'static,
    {
        self.quitting.subscribe(handler)
    }

    #[inline]
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.quitting.unsubscribe(id)
    }

    /// Starts quitting. Returns `false` if quitting had already begun.
    pub fn trigger(&self) -> bool {
        if !self.began.set(Instant::now()) {
            log::debug!("quit already in progress");
            return false;
        }
        log::info!("application is quitting...");
        self.quitting.emit(&());
        true
    }
}

impl Default for QuitSignal {
    fn default() -> Self {
        Self::new()
    }
}
