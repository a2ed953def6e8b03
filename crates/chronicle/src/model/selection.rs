//! Selection model for picker-style controls.
//!
//! This module provides [`SelectionModel`], which manages a set of selected
//! values chosen from a list of available options. Options may be provided
//! statically or fetched remotely, and the model supports single or multiple
//! selection, a default selection applied on reset, and a search input that
//! narrows the visible options without touching the selection itself.
//!
//! # Example
//!
//! ```
//! use chronicle::model::{SelectionConfig, SelectionModel, SelectionOption};
//!
//! let model = SelectionModel::new(SelectionConfig {
//!     available: vec![
//!         SelectionOption::new("PHYSICS"),
//!         SelectionOption::new("COSMICS"),
//!     ].into(),
//!     multiple: false,
//!     ..SelectionConfig::default()
//! }).unwrap();
//!
//! model.select_value(&"PHYSICS");
//! assert_eq!(model.selected(), vec!["PHYSICS"]);
//! ```
//!
//! # Notification channels
//!
//! The model exposes two channels: the primary [`SelectionModel::notifier`]
//! fires when the selection itself changes, and
//! [`SelectionModel::visual_change`] fires for presentation-only updates such
//! as the search input or remotely fetched options arriving.

use std::fmt::Display;
use std::sync::Arc;

use parking_lot::Mutex;

use chronicle_core::{Notifier, ObservableData, RemoteData};

use crate::data_source::ApiError;
use crate::error::SelectionError;

/// A single selectable option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOption<V> {
    /// The underlying value carried by the option.
    pub value: V,
    /// Optional display label; falls back to the value's `Display` rendition.
    pub label: Option<String>,
    /// Optional plain-text label used for search matching, when the display
    /// label carries markup or is absent.
    pub raw_label: Option<String>,
}

impl<V> SelectionOption<V> {
    /// Creates an option with no explicit labels.
    pub fn new(value: V) -> Self {
        Self {
            value,
            label: None,
            raw_label: None,
        }
    }

    /// Creates an option with a display label.
    pub fn with_label(value: V, label: impl Into<String>) -> Self {
        Self {
            value,
            label: Some(label.into()),
            raw_label: None,
        }
    }
}

/// Where the options of a selection model come from.
#[derive(Clone)]
pub enum AvailableOptions<V> {
    /// A fixed list known at construction.
    Static(Vec<SelectionOption<V>>),
    /// A list fetched remotely; the model observes the cell and reports a
    /// visual change when the fetch lands.
    Remote(Arc<ObservableData<RemoteData<Vec<SelectionOption<V>>, Vec<ApiError>>>>),
}

impl<V> From<Vec<SelectionOption<V>>> for AvailableOptions<V> {
    fn from(options: Vec<SelectionOption<V>>) -> Self {
        AvailableOptions::Static(options)
    }
}

/// Configuration for [`SelectionModel::new`].
#[derive(Clone)]
pub struct SelectionConfig<V> {
    /// The options the user can pick from.
    pub available: AvailableOptions<V>,
    /// Selection applied at construction and restored on reset.
    pub default_selection: Vec<SelectionOption<V>>,
    /// Whether more than one option may be selected at once.
    pub multiple: bool,
    /// Whether the selection may be empty.
    pub allow_empty: bool,
}

impl<V> Default for SelectionConfig<V> {
    fn default() -> Self {
        Self {
            available: AvailableOptions::Static(Vec::new()),
            default_selection: Vec::new(),
            multiple: true,
            allow_empty: true,
        }
    }
}

/// Manages selection state over a list of available options.
pub struct SelectionModel<V> {
    available: AvailableOptions<V>,
    default_selection: Vec<SelectionOption<V>>,
    selected: Mutex<Vec<SelectionOption<V>>>,
    multiple: bool,
    allow_empty: bool,
    search_input: Mutex<String>,
    notifier: Arc<Notifier>,
    visual_change: Arc<Notifier>,
}

impl<V> SelectionModel<V>
where
    V: Clone + PartialEq + Display + Send + Sync + 'static,
{
    /// Creates a selection model.
    ///
    /// Returns [`SelectionError::EmptyDefaultSelection`] when the model
    /// forbids an empty selection but no default selection is provided, since
    /// the model could never reach a valid state.
    pub fn new(config: SelectionConfig<V>) -> Result<Arc<Self>, SelectionError> {
        if !config.allow_empty && config.default_selection.is_empty() {
            return Err(SelectionError::EmptyDefaultSelection);
        }

        let model = Arc::new(Self {
            selected: Mutex::new(config.default_selection.clone()),
            default_selection: config.default_selection,
            multiple: config.multiple,
            allow_empty: config.allow_empty,
            search_input: Mutex::new(String::new()),
            notifier: Arc::new(Notifier::new()),
            visual_change: Arc::new(Notifier::new()),
            available: config.available,
        });

        // Remote options arriving are a presentation concern only: the
        // selection itself is unchanged, so the fetch lands on the visual
        // channel.
        if let AvailableOptions::Remote(cell) = &model.available {
            cell.notifier().bubble_to(&model.visual_change);
        }

        Ok(model)
    }

    /// Notifier fired when the selection changes.
    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    /// Notifier fired for presentation-only changes (search input, remote
    /// options arriving).
    pub fn visual_change(&self) -> &Arc<Notifier> {
        &self.visual_change
    }

    /// Whether more than one option may be selected at once.
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Whether the selection may be empty.
    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }

    /// Selects the given option.
    ///
    /// Selecting an already-selected value is a no-op. In single-selection
    /// mode any previous selection is replaced.
    pub fn select(&self, option: SelectionOption<V>) {
        {
            let mut selected = self.selected.lock();
            if selected.iter().any(|entry| entry.value == option.value) {
                return;
            }
            if !self.multiple {
                selected.clear();
            }
            selected.push(option);
        }
        self.notifier.notify();
    }

    /// Selects the option carrying the given value, if present among the
    /// available options. Unknown values are ignored.
    ///
    /// Resolution goes through the full available list (with defaults
    /// injected), not the search-narrowed view, so an active search input
    /// never blocks a selection.
    pub fn select_value(&self, value: &V) {
        let Some(option) = self
            .available_with_defaults()
            .into_iter()
            .find(|option| &option.value == value)
        else {
            return;
        };
        self.select(option);
    }

    /// Deselects the option carrying the given value.
    ///
    /// Removing the last selected value is refused when the model forbids an
    /// empty selection; values that are not selected are ignored.
    pub fn deselect(&self, value: &V) {
        {
            let mut selected = self.selected.lock();
            let Some(position) = selected.iter().position(|entry| &entry.value == value) else {
                return;
            };
            if !self.allow_empty && self.dedup_len(&selected) == 1 {
                return;
            }
            selected.remove(position);
        }
        self.notifier.notify();
    }

    /// Restores the default selection and clears the search input, without
    /// notifying.
    pub fn reset(&self) {
        *self.selected.lock() = self.default_selection.clone();
        self.search_input.lock().clear();
    }

    /// The selected values, deduplicated in selection order.
    pub fn selected(&self) -> Vec<V> {
        let selected = self.selected.lock();
        let mut values: Vec<V> = Vec::with_capacity(selected.len());
        for entry in selected.iter() {
            if !values.contains(&entry.value) {
                values.push(entry.value.clone());
            }
        }
        values
    }

    /// The selected options, deduplicated by value in selection order.
    pub fn selected_options(&self) -> Vec<SelectionOption<V>> {
        let selected = self.selected.lock();
        let mut options: Vec<SelectionOption<V>> = Vec::with_capacity(selected.len());
        for entry in selected.iter() {
            if !options.iter().any(|kept| kept.value == entry.value) {
                options.push(entry.clone());
            }
        }
        options
    }

    /// The single selected value.
    ///
    /// # Panics
    ///
    /// Panics when the model allows an empty or multiple selection, or when
    /// the selection holds anything other than exactly one value. Callers use
    /// this only on single-selection, non-empty models where exactly one
    /// value is guaranteed.
    pub fn current(&self) -> V {
        assert!(
            !self.allow_empty && !self.multiple,
            "current() requires a single-selection model that forbids an empty selection"
        );
        let values = self.selected();
        assert!(
            values.len() == 1,
            "current() requires exactly one selected value, found {}",
            values.len()
        );
        values.into_iter().next().expect("length checked above")
    }

    /// Whether the given value is selected.
    pub fn is_selected(&self, value: &V) -> bool {
        self.selected.lock().iter().any(|entry| &entry.value == value)
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.lock().is_empty()
    }

    /// The options currently offered, narrowed by the search input.
    ///
    /// Default-selection values missing from the available list are injected
    /// at the end, so defaults remain visible and deselectable even when the
    /// available list does not carry them. The search is a case-insensitive
    /// substring match against the raw label, falling back to the display
    /// label and then the value's `Display` rendition. Remote options that
    /// have not arrived yet yield the injected defaults only.
    pub fn options(&self) -> Vec<SelectionOption<V>> {
        let options = self.available_with_defaults();

        let search = self.search_input.lock().to_lowercase();
        if search.is_empty() {
            return options;
        }
        options
            .into_iter()
            .filter(|option| {
                let text = option
                    .raw_label
                    .clone()
                    .or_else(|| option.label.clone())
                    .unwrap_or_else(|| option.value.to_string());
                text.to_lowercase().contains(&search)
            })
            .collect()
    }

    /// The current search input.
    pub fn search_input(&self) -> String {
        self.search_input.lock().clone()
    }

    /// Sets the search input and reports a visual change.
    pub fn set_search_input(&self, input: impl Into<String>) {
        *self.search_input.lock() = input.into();
        self.visual_change.notify();
    }

    /// The available options with defaulted-but-missing entries injected,
    /// before any search narrowing.
    fn available_with_defaults(&self) -> Vec<SelectionOption<V>> {
        let mut options = match &self.available {
            AvailableOptions::Static(options) => options.clone(),
            AvailableOptions::Remote(cell) => cell
                .with(|data| data.success().cloned())
                .unwrap_or_default(),
        };
        for default in &self.default_selection {
            if !options.iter().any(|option| option.value == default.value) {
                options.push(default.clone());
            }
        }
        options
    }

    fn dedup_len(&self, selected: &[SelectionOption<V>]) -> usize {
        let mut seen: Vec<&V> = Vec::with_capacity(selected.len());
        for entry in selected {
            if !seen.contains(&&entry.value) {
                seen.push(&entry.value);
            }
        }
        seen.len()
    }
}
