//! Filter models and their aggregate.
//!
//! Each filter kind implements [`FilterModel`]: it reports whether it is
//! empty, produces a normalized JSON value for query construction, and
//! exposes two notification channels. The primary channel fires only when the
//! filtering criteria actually change; [`FilterModel::visual_change`] fires
//! for presentation-only updates (typed-but-uncommitted input, search text)
//! that must never trigger a data reload.
//!
//! [`FilteringModel`] aggregates named filters and exposes the combined
//! normalized object, expanding bracket-style keys (`tags[values]`) into
//! nested objects.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use chronicle_core::Notifier;

use crate::query::expand_bracket_keys;

mod numeric;
mod selection_filter;
mod text;
mod time_range;

pub use numeric::{ComparisonOperator, NumericComparisonFilterModel, NumericFilterOptions};
pub use selection_filter::SelectionFilterModel;
pub use text::{RawTextFilterModel, TokenListFilterModel};
pub use time_range::TimeRangeFilterModel;

/// A single named filter.
pub trait FilterModel: Send + Sync {
    /// Notifier fired when the filtering criteria change.
    fn notifier(&self) -> &Arc<Notifier>;

    /// Notifier fired for presentation-only changes.
    fn visual_change(&self) -> &Arc<Notifier>;

    /// Whether the filter currently constrains anything.
    fn is_empty(&self) -> bool;

    /// The filter's contribution to the query, as a JSON value.
    fn normalized(&self) -> Value;

    /// Restores the filter to its pristine state without notifying.
    fn reset(&self);
}

/// Aggregates named filters into a single normalized filter object.
pub struct FilteringModel {
    entries: Mutex<Vec<(String, Arc<dyn FilterModel>)>>,
    notifier: Arc<Notifier>,
    visual_change: Arc<Notifier>,
}

impl Default for FilteringModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FilteringModel {
    /// Creates an empty aggregate.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            notifier: Arc::new(Notifier::new()),
            visual_change: Arc::new(Notifier::new()),
        }
    }

    /// Notifier fired when any registered filter's criteria change.
    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    /// Notifier fired for presentation-only changes of any registered filter.
    pub fn visual_change(&self) -> &Arc<Notifier> {
        &self.visual_change
    }

    /// Registers a filter under the given key and wires its channels into
    /// the aggregate's.
    ///
    /// Registration is idempotent per key: a second filter under an existing
    /// key is refused and `false` is returned.
    pub fn put(&self, key: impl Into<String>, filter: Arc<dyn FilterModel>) -> bool {
        let key = key.into();
        let mut entries = self.entries.lock();
        if entries.iter().any(|(existing, _)| existing == &key) {
            tracing::debug!(
                target: "chronicle::filtering",
                key = %key,
                "filter already registered, ignoring"
            );
            return false;
        }
        filter.notifier().bubble_to(&self.notifier);
        filter.visual_change().bubble_to(&self.visual_change);
        entries.push((key, filter));
        true
    }

    /// The filter registered under the given key, if any.
    pub fn get(&self, key: &str) -> Option<Arc<dyn FilterModel>> {
        self.entries
            .lock()
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, filter)| filter.clone())
    }

    /// The registered keys, in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(key, _)| key.clone()).collect()
    }

    /// Whether every registered filter is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().iter().all(|(_, filter)| filter.is_empty())
    }

    /// Resets every registered filter without notifying.
    pub fn reset(&self) {
        for (_, filter) in self.entries.lock().iter() {
            filter.reset();
        }
    }

    /// The combined normalized filter object.
    ///
    /// Empty filters are dropped, and bracket-style keys expand into nested
    /// objects, so `tags[values]` and `tags[operation]` merge under `tags`.
    pub fn normalized(&self) -> Value {
        let mut flat = Map::new();
        for (key, filter) in self.entries.lock().iter() {
            if filter.is_empty() {
                continue;
            }
            flat.insert(key.clone(), filter.normalized());
        }
        expand_bracket_keys(&flat)
    }
}
