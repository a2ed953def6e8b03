//! Text-based filters with commit-on-blur semantics.
//!
//! Both filters here hold a pending raw input alongside the committed value.
//! Typing updates the pending input and reports a visual change only; the
//! committed value, and with it the primary channel, moves when the input is
//! committed (on blur or enter in a UI).

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use chronicle_core::Notifier;

use super::FilterModel;

/// A free-text filter whose committed value is passed through verbatim.
pub struct RawTextFilterModel {
    pending: Mutex<String>,
    committed: Mutex<String>,
    notifier: Arc<Notifier>,
    visual_change: Arc<Notifier>,
}

impl Default for RawTextFilterModel {
    fn default() -> Self {
        Self::new()
    }
}

impl RawTextFilterModel {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(String::new()),
            committed: Mutex::new(String::new()),
            notifier: Arc::new(Notifier::new()),
            visual_change: Arc::new(Notifier::new()),
        }
    }

    /// The pending, not yet committed input.
    pub fn raw(&self) -> String {
        self.pending.lock().clone()
    }

    /// The committed value.
    pub fn value(&self) -> String {
        self.committed.lock().clone()
    }

    /// Updates the pending input and reports a visual change.
    pub fn set_raw(&self, input: impl Into<String>) {
        *self.pending.lock() = input.into();
        self.visual_change.notify();
    }

    /// Commits the pending input. Notifies only when the committed value
    /// actually changes.
    pub fn commit(&self) {
        let changed = {
            let pending = self.pending.lock().clone();
            let mut committed = self.committed.lock();
            if *committed == pending {
                false
            } else {
                *committed = pending;
                true
            }
        };
        if changed {
            self.notifier.notify();
        }
    }

    /// Sets and commits a value in one step.
    pub fn set_value(&self, value: impl Into<String>) {
        *self.pending.lock() = value.into();
        self.commit();
    }
}

impl FilterModel for RawTextFilterModel {
    fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    fn visual_change(&self) -> &Arc<Notifier> {
        &self.visual_change
    }

    fn is_empty(&self) -> bool {
        self.committed.lock().is_empty()
    }

    fn normalized(&self) -> Value {
        Value::String(self.committed.lock().clone())
    }

    fn reset(&self) {
        self.pending.lock().clear();
        self.committed.lock().clear();
    }
}

/// A text filter whose committed value is a comma-separated token list.
///
/// Normalization splits on commas, trims each token and drops empty ones, so
/// `" run1 , run2 ,"` normalizes to `["run1", "run2"]`.
pub struct TokenListFilterModel {
    inner: RawTextFilterModel,
}

impl Default for TokenListFilterModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenListFilterModel {
    pub fn new() -> Self {
        Self {
            inner: RawTextFilterModel::new(),
        }
    }

    /// The pending, not yet committed input.
    pub fn raw(&self) -> String {
        self.inner.raw()
    }

    /// Updates the pending input and reports a visual change.
    pub fn set_raw(&self, input: impl Into<String>) {
        self.inner.set_raw(input);
    }

    /// Commits the pending input.
    pub fn commit(&self) {
        self.inner.commit();
    }

    /// Sets and commits a value in one step.
    pub fn set_value(&self, value: impl Into<String>) {
        self.inner.set_value(value);
    }

    /// The committed tokens, trimmed, with empty entries dropped.
    pub fn tokens(&self) -> Vec<String> {
        self.inner
            .value()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl FilterModel for TokenListFilterModel {
    fn notifier(&self) -> &Arc<Notifier> {
        self.inner.notifier()
    }

    fn visual_change(&self) -> &Arc<Notifier> {
        self.inner.visual_change()
    }

    fn is_empty(&self) -> bool {
        self.tokens().is_empty()
    }

    fn normalized(&self) -> Value {
        Value::Array(self.tokens().into_iter().map(Value::String).collect())
    }

    fn reset(&self) {
        self.inner.reset();
    }
}
