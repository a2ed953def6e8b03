//! Time range filter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use chronicle_core::Notifier;

use super::FilterModel;

/// Filters a timestamp field against an inclusive-from, exclusive-to range.
///
/// Either bound may be absent. Normalization carries the bounds as epoch
/// milliseconds, omitting absent ones.
pub struct TimeRangeFilterModel {
    from: Mutex<Option<DateTime<Utc>>>,
    to: Mutex<Option<DateTime<Utc>>>,
    notifier: Arc<Notifier>,
    visual_change: Arc<Notifier>,
}

impl Default for TimeRangeFilterModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeRangeFilterModel {
    pub fn new() -> Self {
        Self {
            from: Mutex::new(None),
            to: Mutex::new(None),
            notifier: Arc::new(Notifier::new()),
            visual_change: Arc::new(Notifier::new()),
        }
    }

    pub fn from(&self) -> Option<DateTime<Utc>> {
        *self.from.lock()
    }

    pub fn to(&self) -> Option<DateTime<Utc>> {
        *self.to.lock()
    }

    /// Sets the lower bound. Notifies only on change.
    pub fn set_from(&self, from: Option<DateTime<Utc>>) {
        let changed = {
            let mut current = self.from.lock();
            if *current == from {
                false
            } else {
                *current = from;
                true
            }
        };
        if changed {
            self.notifier.notify();
        }
    }

    /// Sets the upper bound. Notifies only on change.
    pub fn set_to(&self, to: Option<DateTime<Utc>>) {
        let changed = {
            let mut current = self.to.lock();
            if *current == to {
                false
            } else {
                *current = to;
                true
            }
        };
        if changed {
            self.notifier.notify();
        }
    }

    /// Sets both bounds at once, notifying at most once. With `silent` the
    /// bounds change without any notification.
    pub fn set_range(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>, silent: bool) {
        let changed = {
            let mut current_from = self.from.lock();
            let mut current_to = self.to.lock();
            let changed = *current_from != from || *current_to != to;
            *current_from = from;
            *current_to = to;
            changed
        };
        if changed && !silent {
            self.notifier.notify();
        }
    }
}

impl FilterModel for TimeRangeFilterModel {
    fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    fn visual_change(&self) -> &Arc<Notifier> {
        &self.visual_change
    }

    fn is_empty(&self) -> bool {
        self.from.lock().is_none() && self.to.lock().is_none()
    }

    fn normalized(&self) -> Value {
        let mut map = Map::new();
        if let Some(from) = *self.from.lock() {
            map.insert("from".to_string(), json!(from.timestamp_millis()));
        }
        if let Some(to) = *self.to.lock() {
            map.insert("to".to_string(), json!(to.timestamp_millis()));
        }
        Value::Object(map)
    }

    fn reset(&self) {
        *self.from.lock() = None;
        *self.to.lock() = None;
    }
}
