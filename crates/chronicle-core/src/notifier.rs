//! Notification channels for Chronicle.
//!
//! This module provides [`Notifier`], the minimal publish/subscribe primitive
//! every Chronicle model is built on. A notifier owns a list of observer
//! callbacks and zero or more *bubble targets*: other notifiers it forwards
//! every notification to. Bubbling lets a composite model surface changes of
//! its sub-models through a single page-level channel without owning the
//! observers themselves.
//!
//! # Key Types
//!
//! - [`Notifier`] - The notification channel
//! - [`ObserverId`] - Unique identifier returned when registering an observer
//! - [`ObserverGuard`] - RAII guard that unregisters when dropped
//!
//! # Delivery Order
//!
//! Delivery is synchronous and depth-first: a [`Notifier::notify`] call
//! invokes every direct observer in registration order, then drains each
//! bubble target the same way before returning. A consumer observing two
//! bubbled sources therefore sees effects in the order the underlying
//! mutations occurred.
//!
//! # Cycles
//!
//! The notifier graph is expected to be a tree: models bubble to the model
//! that owns them. No cycle detection is performed; bubbling a notifier to
//! itself (directly or through intermediates) recurses until the stack
//! overflows. This is a programming error, not a recoverable condition.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chronicle_core::Notifier;
//!
//! let page = Arc::new(Notifier::new());
//! let filter = Notifier::new();
//! filter.bubble_to(&page);
//!
//! page.observe(|| println!("page must re-render"));
//!
//! // Notifying the filter reaches the page-level observers too.
//! filter.notify();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

/// A unique identifier for a registered observer.
///
/// Use this id to unregister a specific observer via [`Notifier::unobserve`].
/// Ids are never reused within a notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Internal storage for a single observer.
struct Observer {
    id: ObserverId,
    /// Arc-wrapped so delivery can run without holding the registry lock.
    callback: Arc<dyn Fn() + Send + Sync>,
}

/// A notification channel with parent-forwarding.
///
/// `Notifier` carries no payload: it signals *that* something changed, and
/// observers pull the current state from the owning model. Models exposing
/// several independent channels (e.g. a value-change channel and a
/// visual-only channel) own several `Notifier`s, each bubbling independently.
///
/// # Thread Safety
///
/// `Notifier` is `Send + Sync`; registration and delivery take an internal
/// lock that is released before callbacks run, so observers may register
/// further observers or notify other channels without deadlocking.
pub struct Notifier {
    /// Registered observers, in registration order.
    observers: Mutex<Vec<Observer>>,
    /// Channels every notification is forwarded to, in registration order.
    bubble_targets: Mutex<Vec<Arc<Notifier>>>,
    /// Whether delivery is temporarily suppressed.
    blocked: AtomicBool,
    /// Source of observer ids, unique per notifier.
    next_id: AtomicU64,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    /// Create a new notifier with no observers and no bubble targets.
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
            bubble_targets: Mutex::new(Vec::new()),
            blocked: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register an observer callback.
    ///
    /// Observers are invoked synchronously, in registration order, every time
    /// [`notify`](Self::notify) is called. Returns an [`ObserverId`] that can
    /// be used to unregister later.
    pub fn observe<F>(&self, callback: F) -> ObserverId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.observers.lock().push(Observer {
            id,
            callback: Arc::new(callback),
        });
        id
    }

    /// Unregister a specific observer by id.
    ///
    /// Returns `true` if the observer was found and removed.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|observer| observer.id != id);
        observers.len() != before
    }

    /// Register an observer that is unregistered when the returned guard drops.
    ///
    /// The guard holds a clone of the notifier, so the registration cannot
    /// outlive the channel.
    pub fn observe_scoped<F>(self: &Arc<Self>, callback: F) -> ObserverGuard
    where
        F: Fn() + Send + Sync + 'static,
    {
        ObserverGuard {
            notifier: Arc::clone(self),
            id: self.observe(callback),
        }
    }

    /// Get the number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Forward all future notifications of this channel to `target`.
    ///
    /// Many channels may bubble to the same target. The target does not own
    /// this notifier; teardown stays with the registering side.
    pub fn bubble_to(&self, target: &Arc<Notifier>) {
        self.bubble_targets.lock().push(Arc::clone(target));
    }

    /// Suppress or restore delivery.
    ///
    /// While blocked, [`notify`](Self::notify) does nothing. Useful during
    /// batch mutations to avoid cascading notifications.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check whether delivery is currently suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Notify every observer, then every bubble target.
    ///
    /// Delivery is synchronous and depth-first: all direct observers run in
    /// registration order before the first bubble target is drained. The
    /// registry lock is released before callbacks are invoked, so observers
    /// may register or notify without deadlocking.
    pub fn notify(&self) {
        if self.is_blocked() {
            tracing::trace!(target: "chronicle_core::notifier", "notifier blocked, skipping delivery");
            return;
        }

        let callbacks: Vec<_> = self
            .observers
            .lock()
            .iter()
            .map(|observer| Arc::clone(&observer.callback))
            .collect();
        tracing::trace!(
            target: "chronicle_core::notifier",
            observer_count = callbacks.len(),
            "delivering notification"
        );
        for callback in callbacks {
            callback();
        }

        let targets: Vec<_> = self.bubble_targets.lock().clone();
        for target in targets {
            target.notify();
        }
    }
}

/// An observer registration that unregisters itself when dropped.
///
/// Created via [`Notifier::observe_scoped`]. Useful for views whose lifetime
/// is shorter than the model they observe.
pub struct ObserverGuard {
    notifier: Arc<Notifier>,
    id: ObserverId,
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        let _ = self.notifier.unobserve(self.id);
    }
}
