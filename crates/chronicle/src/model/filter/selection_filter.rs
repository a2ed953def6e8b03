//! Selection-backed filter.

use std::fmt::Display;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use chronicle_core::Notifier;

use super::FilterModel;
use crate::model::selection::SelectionModel;

/// Adapts a [`SelectionModel`] into a filter.
///
/// The filter forwards both of the selection model's channels. A multiple
/// selection normalizes to an array of the selected values, a single
/// selection to the bare value.
pub struct SelectionFilterModel<V> {
    selection: Arc<SelectionModel<V>>,
}

impl<V> SelectionFilterModel<V>
where
    V: Clone + PartialEq + Display + Serialize + Send + Sync + 'static,
{
    pub fn new(selection: Arc<SelectionModel<V>>) -> Self {
        Self { selection }
    }

    /// The wrapped selection model.
    pub fn selection(&self) -> &Arc<SelectionModel<V>> {
        &self.selection
    }
}

impl<V> FilterModel for SelectionFilterModel<V>
where
    V: Clone + PartialEq + Display + Serialize + Send + Sync + 'static,
{
    fn notifier(&self) -> &Arc<Notifier> {
        self.selection.notifier()
    }

    fn visual_change(&self) -> &Arc<Notifier> {
        self.selection.visual_change()
    }

    fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    fn normalized(&self) -> Value {
        let selected = self.selection.selected();
        if self.selection.is_multiple() {
            json!(selected)
        } else {
            selected.first().map(|value| json!(value)).unwrap_or(Value::Null)
        }
    }

    fn reset(&self) {
        self.selection.reset();
    }
}
