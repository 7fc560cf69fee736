//! Ordered observer lists.
//!
//! [`Signal`] is the event primitive shared by every coordinator in this crate.
//! Handlers run synchronously, in subscription order, before [`Signal::emit`]
//! returns.
//!
//! The handler list is snapshotted before dispatch, so a handler may subscribe
//! or unsubscribe (itself or others) without deadlocking; such changes take
//! effect on the next emit.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Handle returned by [`Signal::subscribe`], used to unsubscribe.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A synchronous, ordered list of observers for values of type `T`.
pub struct Signal<T> {
    next_id:  AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, Handler<T>)>>,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            next_id:  AtomicU64::new(1),
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Appends `handler` to the observer list.
    ///
    /// Every call yields a fresh [`SubscriptionId`]; subscribing the same
    /// closure twice means it runs twice per emit.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push((id, Arc::new(handler)));
        id
    }

    /// Removes the handler registered under `id`.
    ///
    /// Returns `false` if `id` was never subscribed or was already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    /// Invokes every handler with `value`, in subscription order.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Handler<T>> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in snapshot {
            handler(value);
        }
    }

    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
