//! Debouncing for rapid repeated triggers.
//!
//! [`Debouncer`] coalesces bursts of triggers (typically keystrokes mutating
//! a filter) into a single action fired after a quiescence window. Each
//! trigger supersedes the pending one; only the trigger that is still the
//! latest when its window elapses proceeds.
//!
//! The delay is runtime-configurable. A zero delay disables coalescing
//! entirely, which keeps tests deterministic: every trigger proceeds
//! immediately in call order.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use chronicle_core::Debouncer;
//!
//! # async fn example() {
//! let debouncer = Debouncer::new(Duration::from_millis(200));
//! if debouncer.trigger().await {
//!     // quiescence window elapsed and no newer trigger happened
//! }
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

/// Coalesces rapid successive triggers into one delayed action.
pub struct Debouncer {
    delay: Mutex<Duration>,
    /// Generation counter; each trigger bumps it and a sleeper proceeds only
    /// if its generation is still the latest afterwards.
    generation: AtomicU64,
}

impl Debouncer {
    /// Create a debouncer with the given quiescence window.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: Mutex::new(delay),
            generation: AtomicU64::new(0),
        }
    }

    /// The current quiescence window.
    pub fn delay(&self) -> Duration {
        *self.delay.lock()
    }

    /// Reconfigure the quiescence window at runtime.
    ///
    /// Affects triggers issued after the call; pending windows keep their
    /// original duration.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Register a trigger and wait out the quiescence window.
    ///
    /// Returns `true` if this trigger is still the latest once the window
    /// elapsed, in which case the caller should perform the debounced action.
    /// Returns `false` if a newer trigger superseded it. With a zero delay
    /// every trigger returns `true` without suspending.
    pub async fn trigger(&self) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.delay();
        if delay.is_zero() {
            return true;
        }

        tokio::time::sleep(delay).await;
        let superseded = self.generation.load(Ordering::SeqCst) != generation;
        if superseded {
            tracing::trace!(target: "chronicle_core::debounce", "trigger superseded during quiescence window");
        }
        !superseded
    }
}
