//! Pagination model.
//!
//! Tracks the current page, the resolved page size and infinite scroll mode
//! for a paged overview. The model carries two notification channels: the
//! primary [`PaginationModel::notifier`] fires when the window over the data
//! changes and a reload is warranted, while
//! [`PaginationModel::items_per_page_selector`] fires for presentation-only
//! state of the page-size selector (the custom input text, dropdown
//! visibility).
//!
//! Page size resolution is layered: an explicit user choice wins, then a
//! default provided by the embedding page, then
//! [`DEFAULT_ITEMS_PER_PAGE`]. Infinite scroll overrides all of them with
//! [`INFINITE_SCROLL_CHUNK_SIZE`].

use std::sync::Arc;

use parking_lot::Mutex;

use chronicle_core::Notifier;

/// Page size used when neither the user nor the page provided one.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Page size used while infinite scroll is enabled.
pub const INFINITE_SCROLL_CHUNK_SIZE: usize = 19;

#[derive(Debug)]
struct PaginationState {
    explicit_items_per_page: Option<usize>,
    default_items_per_page: Option<usize>,
    custom_items_per_page: String,
    current_page: usize,
    items_count: Option<usize>,
    infinite_scroll: bool,
    amount_dropdown_visible: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            explicit_items_per_page: None,
            default_items_per_page: None,
            custom_items_per_page: String::new(),
            current_page: 1,
            items_count: None,
            infinite_scroll: false,
            amount_dropdown_visible: false,
        }
    }
}

/// Tracks the visible window over a paged collection.
pub struct PaginationModel {
    state: Mutex<PaginationState>,
    notifier: Arc<Notifier>,
    items_per_page_selector: Arc<Notifier>,
}

impl Default for PaginationModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationModel {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PaginationState::default()),
            notifier: Arc::new(Notifier::new()),
            items_per_page_selector: Arc::new(Notifier::new()),
        }
    }

    /// Notifier fired when the visible window changes.
    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    /// Notifier fired for presentation-only selector state.
    pub fn items_per_page_selector(&self) -> &Arc<Notifier> {
        &self.items_per_page_selector
    }

    /// The resolved page size.
    pub fn items_per_page(&self) -> usize {
        let state = self.state.lock();
        if state.infinite_scroll {
            return INFINITE_SCROLL_CHUNK_SIZE;
        }
        state
            .explicit_items_per_page
            .or(state.default_items_per_page)
            .unwrap_or(DEFAULT_ITEMS_PER_PAGE)
    }

    /// Sets an explicit page size, returning to the first page and leaving
    /// infinite scroll mode.
    pub fn set_items_per_page(&self, items_per_page: usize) {
        {
            let mut state = self.state.lock();
            state.explicit_items_per_page = Some(items_per_page);
            state.current_page = 1;
            state.infinite_scroll = false;
        }
        self.notifier.notify();
    }

    /// Provides the page-level default page size. Notifies only when this
    /// changes the resolved page size.
    pub fn provide_default_items_per_page(&self, items_per_page: usize) {
        let changed = {
            let mut state = self.state.lock();
            let before = state
                .explicit_items_per_page
                .or(state.default_items_per_page)
                .unwrap_or(DEFAULT_ITEMS_PER_PAGE);
            state.default_items_per_page = Some(items_per_page);
            let after = state
                .explicit_items_per_page
                .or(state.default_items_per_page)
                .unwrap_or(DEFAULT_ITEMS_PER_PAGE);
            !state.infinite_scroll && before != after
        };
        if changed {
            self.notifier.notify();
        }
    }

    /// The current page, 1-based.
    pub fn current_page(&self) -> usize {
        self.state.lock().current_page
    }

    /// Sets the current page, notifying on change.
    pub fn set_current_page(&self, page: usize) {
        if self.silently_set_current_page(page) {
            self.notifier.notify();
        }
    }

    /// Sets the current page without notifying. Returns whether the page
    /// changed.
    pub fn silently_set_current_page(&self, page: usize) -> bool {
        let mut state = self.state.lock();
        if state.current_page == page {
            return false;
        }
        state.current_page = page;
        true
    }

    /// Advances to the next page when one exists.
    pub fn go_to_next_page(&self) {
        let next = {
            let current = self.current_page();
            if current >= self.pages_count() {
                return;
            }
            current + 1
        };
        self.set_current_page(next);
    }

    /// Total number of items, when known.
    pub fn items_count(&self) -> Option<usize> {
        self.state.lock().items_count
    }

    /// Records the total number of items reported by the data source.
    pub fn set_items_count(&self, items_count: Option<usize>) {
        self.state.lock().items_count = items_count;
    }

    /// Number of pages, never less than one.
    pub fn pages_count(&self) -> usize {
        let items_count = self.items_count().unwrap_or(0);
        items_count.div_ceil(self.items_per_page()).max(1)
    }

    /// Offset of the first item of the current page.
    pub fn first_item_offset(&self) -> usize {
        (self.current_page() - 1) * self.items_per_page()
    }

    /// Whether infinite scroll mode is enabled.
    pub fn is_infinite_scroll_enabled(&self) -> bool {
        self.state.lock().infinite_scroll
    }

    /// Enables infinite scroll mode, returning to the first page.
    pub fn enable_infinite_mode(&self) {
        {
            let mut state = self.state.lock();
            if state.infinite_scroll {
                return;
            }
            state.infinite_scroll = true;
            state.current_page = 1;
        }
        self.notifier.notify();
    }

    /// The text typed into the custom page-size input.
    pub fn custom_items_per_page(&self) -> String {
        self.state.lock().custom_items_per_page.clone()
    }

    /// Updates the custom page-size input, a selector-only change.
    pub fn set_custom_items_per_page(&self, input: impl Into<String>) {
        self.state.lock().custom_items_per_page = input.into();
        self.items_per_page_selector.notify();
    }

    /// Whether the page-size dropdown is open.
    pub fn is_amount_dropdown_visible(&self) -> bool {
        self.state.lock().amount_dropdown_visible
    }

    /// Toggles the page-size dropdown, a selector-only change.
    pub fn toggle_amount_dropdown_visibility(&self) {
        {
            let mut state = self.state.lock();
            state.amount_dropdown_visible = !state.amount_dropdown_visible;
        }
        self.items_per_page_selector.notify();
    }

    /// Restores the pristine state without notifying, keeping the
    /// page-level default page size.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let default_items_per_page = state.default_items_per_page;
        *state = PaginationState {
            default_items_per_page,
            ..PaginationState::default()
        };
    }
}
