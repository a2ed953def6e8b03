//! Overview page model.
//!
//! [`OverviewPageModel`] orchestrates a paginated, filterable overview of
//! remotely fetched items. It owns the collaborators a typical overview page
//! needs: a [`PaginationModel`], a [`FilteringModel`], a race-safe
//! [`RemoteDataSource`] and a debouncer for filter-driven reloads, and wires
//! their notification channels together so a view only ever observes the
//! model's own notifier.
//!
//! # Refresh semantics
//!
//! - A pagination change reloads immediately.
//! - A filter change first returns to the first page silently, then reloads
//!   behind the debouncer, so a burst of filter edits costs one request.
//! - Overlapping requests are superseded by generation: the newest request
//!   wins regardless of response ordering.
//!
//! # Infinite scroll
//!
//! With infinite scroll enabled, pages past the first append to the already
//! visible items instead of replacing them, and the intermediate `Loading`
//! state is skipped so the visible items do not flicker away while the next
//! chunk is in flight.
//!
//! # Reactive wiring and the runtime
//!
//! Pagination and filter observers trigger reloads by spawning onto the
//! ambient tokio runtime. Without a runtime on the current thread the spawn
//! is skipped and the embedder drives [`OverviewPageModel::load`] explicitly;
//! every mutation also has an explicit async counterpart
//! ([`apply_filters`](OverviewPageModel::apply_filters),
//! [`reset`](OverviewPageModel::reset)) for deterministic sequencing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde_json::json;

use chronicle_core::{Debouncer, Notifier, ObservableData, RemoteData};

use crate::data_source::{ApiError, DataSource, RemoteDataSource};
use crate::model::filter::FilteringModel;
use crate::model::pagination::PaginationModel;
use crate::query::build_url;

/// Transformation applied to each incoming page of items before display.
pub type ProcessItems<T> = Box<dyn Fn(Vec<T>) -> Vec<T> + Send + Sync>;

/// Default debounce applied between a filter change and the reload.
const DEFAULT_FILTER_DEBOUNCE: Duration = Duration::from_millis(200);

/// Builder for [`OverviewPageModel`].
pub struct OverviewPageModelBuilder<T> {
    endpoint: String,
    source: Arc<dyn DataSource<T>>,
    filtering: Option<Arc<FilteringModel>>,
    debounce_delay: Duration,
    process_items: Option<ProcessItems<T>>,
}

impl<T: Clone + Send + Sync + 'static> OverviewPageModelBuilder<T> {
    /// Starts a builder for the given endpoint and fetch collaborator.
    pub fn new(endpoint: impl Into<String>, source: Arc<dyn DataSource<T>>) -> Self {
        Self {
            endpoint: endpoint.into(),
            source,
            filtering: None,
            debounce_delay: DEFAULT_FILTER_DEBOUNCE,
            process_items: None,
        }
    }

    /// Uses the given filtering aggregate instead of an empty one.
    pub fn filtering(mut self, filtering: Arc<FilteringModel>) -> Self {
        self.filtering = Some(filtering);
        self
    }

    /// Overrides the filter reload debounce. Zero disables debouncing.
    pub fn debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Installs a transformation applied to each incoming page of items.
    pub fn process_items<F>(mut self, process: F) -> Self
    where
        F: Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static,
    {
        self.process_items = Some(Box::new(process));
        self
    }

    /// Builds the model and wires its collaborators together.
    pub fn build(self) -> Arc<OverviewPageModel<T>> {
        let model = Arc::new(OverviewPageModel {
            endpoint: self.endpoint,
            source: self.source.clone(),
            data_source: Arc::new(RemoteDataSource::new(self.source)),
            pagination: Arc::new(PaginationModel::new()),
            filtering: self.filtering.unwrap_or_default(),
            items: Arc::new(ObservableData::new(RemoteData::NotAsked)),
            export_items: Arc::new(ObservableData::new(RemoteData::NotAsked)),
            export_generation: AtomicU64::new(0),
            export_fetched_generation: AtomicU64::new(u64::MAX),
            debouncer: Debouncer::new(self.debounce_delay),
            process_items: self.process_items,
            notifier: Arc::new(Notifier::new()),
        });
        model.wire();
        model
    }
}

/// Orchestrates a paginated, filterable, remotely fetched overview.
pub struct OverviewPageModel<T> {
    endpoint: String,
    source: Arc<dyn DataSource<T>>,
    data_source: Arc<RemoteDataSource<T>>,
    pagination: Arc<PaginationModel>,
    filtering: Arc<FilteringModel>,
    items: Arc<ObservableData<RemoteData<Vec<T>, Vec<ApiError>>>>,
    export_items: Arc<ObservableData<RemoteData<Vec<T>, Vec<ApiError>>>>,
    export_generation: AtomicU64,
    export_fetched_generation: AtomicU64,
    debouncer: Debouncer,
    process_items: Option<ProcessItems<T>>,
    notifier: Arc<Notifier>,
}

impl<T: Clone + Send + Sync + 'static> OverviewPageModel<T> {
    /// Starts a builder. See [`OverviewPageModelBuilder`].
    pub fn builder(
        endpoint: impl Into<String>,
        source: Arc<dyn DataSource<T>>,
    ) -> OverviewPageModelBuilder<T> {
        OverviewPageModelBuilder::new(endpoint, source)
    }

    fn wire(self: &Arc<Self>) {
        // Raw fetch completions merge into the visible items.
        let weak: Weak<Self> = Arc::downgrade(self);
        self.data_source.data().notifier().observe(move || {
            if let Some(model) = weak.upgrade() {
                model.merge_fetched_data();
            }
        });

        // The view observes the model's notifier only.
        self.items.notifier().bubble_to(&self.notifier);
        self.export_items.notifier().bubble_to(&self.notifier);
        self.pagination.items_per_page_selector().bubble_to(&self.notifier);
        self.filtering.visual_change().bubble_to(&self.notifier);

        // Pagination changes reload immediately.
        let weak: Weak<Self> = Arc::downgrade(self);
        self.pagination.notifier().observe(move || {
            if let Some(model) = weak.upgrade() {
                model.spawn_reload(false);
            }
        });

        // Filter changes return to the first page and reload behind the
        // debouncer.
        let weak: Weak<Self> = Arc::downgrade(self);
        self.filtering.notifier().observe(move || {
            if let Some(model) = weak.upgrade() {
                model.note_filters_changed();
                model.spawn_reload(true);
            }
        });
    }

    /// Merges the latest raw fetch state into the visible items.
    fn merge_fetched_data(&self) {
        let fetched = self.data_source.data().get();
        let infinite = self.pagination.is_infinite_scroll_enabled();

        match fetched {
            RemoteData::NotAsked => self.items.set(RemoteData::NotAsked),
            RemoteData::Loading => {
                // Appending: keep the visible items while the chunk loads.
                if !infinite {
                    self.items.set(RemoteData::Loading);
                }
            }
            RemoteData::Success(page) => {
                self.pagination.set_items_count(Some(page.total_count));
                let keep_existing = infinite && self.pagination.current_page() > 1;
                let mut incoming = match &self.process_items {
                    Some(process) => process(page.items),
                    None => page.items,
                };
                let merged = if keep_existing {
                    let mut existing = self
                        .items
                        .with(|items| items.success().cloned())
                        .unwrap_or_default();
                    existing.append(&mut incoming);
                    existing
                } else {
                    incoming
                };
                self.items.set(RemoteData::Success(merged));
            }
            RemoteData::Failure(errors) => self.items.set(RemoteData::Failure(errors)),
        }
    }

    /// Marks the filtering criteria changed: the export snapshot is stale and
    /// the view returns to the first page.
    fn note_filters_changed(&self) {
        self.export_generation.fetch_add(1, Ordering::SeqCst);
        self.pagination.silently_set_current_page(1);
    }

    /// Spawns a reload onto the ambient runtime, optionally debounced.
    ///
    /// With no runtime on the current thread the reload is skipped and the
    /// embedder drives [`load`](Self::load) explicitly.
    fn spawn_reload(self: &Arc<Self>, debounced: bool) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(
                target: "chronicle::overview",
                endpoint = %self.endpoint,
                "no runtime on this thread, skipping reactive reload"
            );
            return;
        };
        let model = self.clone();
        handle.spawn(async move {
            if debounced && !model.debouncer.trigger().await {
                return;
            }
            model.load().await;
        });
    }

    /// Loads the current window of items.
    pub async fn load(&self) {
        // When an infinite-scroll chunk appends, the offset starts after the
        // items already on screen rather than at the page boundary.
        let offset = if self.pagination.is_infinite_scroll_enabled()
            && self.pagination.current_page() > 1
        {
            self.items
                .with(|items| items.success().map(Vec::len))
                .unwrap_or_default()
        } else {
            self.pagination.first_item_offset()
        };

        let mut params = json!({
            "page": {
                "offset": offset,
                "limit": self.pagination.items_per_page(),
            },
        });
        if !self.filtering.is_empty() {
            params["filter"] = self.filtering.normalized();
        }

        let url = build_url(&self.endpoint, &params);
        self.data_source.fetch(&url).await;
    }

    /// Applies pending filter changes explicitly: returns to the first page
    /// and reloads behind the debouncer.
    pub async fn apply_filters(&self) {
        self.note_filters_changed();
        if self.debouncer.trigger().await {
            self.load().await;
        }
    }

    /// Resets filters to pristine and reloads.
    pub async fn reset_filters(&self) {
        self.filtering.reset();
        self.apply_filters().await;
    }

    /// Restores the whole overview to pristine state and reloads.
    pub async fn reset(&self) {
        self.filtering.reset();
        self.pagination.reset();
        self.items.set_silent(RemoteData::NotAsked);
        self.export_generation.fetch_add(1, Ordering::SeqCst);
        self.load().await;
    }

    /// Loads the full unpaginated snapshot for export.
    ///
    /// The snapshot is cached per filter configuration: a second call without
    /// an intervening filter change reuses the cached items, and a filter
    /// change while the snapshot is in flight discards the stale result.
    pub async fn load_export(&self) -> RemoteData<Vec<T>, Vec<ApiError>> {
        let generation = self.export_generation.load(Ordering::SeqCst);
        if self.export_fetched_generation.load(Ordering::SeqCst) == generation
            && self.export_items.with(RemoteData::is_success)
        {
            return self.export_items.get();
        }

        self.export_items.set(RemoteData::Loading);
        let mut params = json!({});
        if !self.filtering.is_empty() {
            params["filter"] = self.filtering.normalized();
        }
        let url = build_url(&self.endpoint, &params);
        let result = self.source.fetch(&url).await;

        if self.export_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(
                target: "chronicle::overview",
                endpoint = %self.endpoint,
                "filters changed during export fetch, discarding snapshot"
            );
            return RemoteData::NotAsked;
        }

        let data = RemoteData::from_result(result.map(|page| page.items));
        if data.is_success() {
            self.export_fetched_generation.store(generation, Ordering::SeqCst);
        }
        self.export_items.set(data.clone());
        data
    }

    /// Whether the export snapshot holds fewer items than the total the
    /// source reported for the current filters.
    pub fn are_export_items_truncated(&self) -> bool {
        let exported = self.export_items.with(|items| items.success().map(Vec::len));
        match (exported, self.pagination.items_count()) {
            (Some(exported), Some(total)) => exported < total,
            _ => false,
        }
    }

    /// Replaces the filter reload debounce. Zero disables debouncing; a
    /// window already in flight keeps its original duration.
    pub fn set_debounce_delay(&self, delay: Duration) {
        self.debouncer.set_delay(delay);
    }

    /// The current filter reload debounce.
    pub fn debounce_delay(&self) -> Duration {
        self.debouncer.delay()
    }

    /// The visible items.
    pub fn items(&self) -> &Arc<ObservableData<RemoteData<Vec<T>, Vec<ApiError>>>> {
        &self.items
    }

    /// The cached export snapshot.
    pub fn export_items(&self) -> &Arc<ObservableData<RemoteData<Vec<T>, Vec<ApiError>>>> {
        &self.export_items
    }

    /// The pagination collaborator.
    pub fn pagination(&self) -> &Arc<PaginationModel> {
        &self.pagination
    }

    /// The filtering collaborator.
    pub fn filtering(&self) -> &Arc<FilteringModel> {
        &self.filtering
    }

    /// The endpoint this overview fetches from.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Notifier aggregating every observable concern of the overview.
    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{FnDataSource, Page};
    use parking_lot::Mutex;

    fn counting_source(
        pages: Vec<Page<u32>>,
    ) -> (Arc<dyn DataSource<u32>>, Arc<Mutex<Vec<String>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();
        let remaining = Arc::new(Mutex::new(pages));
        let source = Arc::new(FnDataSource::new(move |endpoint: String| {
            seen.lock().push(endpoint);
            let page = {
                let mut remaining = remaining.lock();
                if remaining.len() > 1 {
                    remaining.remove(0)
                } else {
                    remaining[0].clone()
                }
            };
            async move { Ok(page) }
        }));
        (source, requests)
    }

    #[tokio::test]
    async fn test_load_requests_current_window() {
        let (source, requests) = counting_source(vec![Page {
            items: vec![1, 2, 3],
            total_count: 3,
        }]);
        let model = OverviewPageModel::builder("/api/items", source).build();

        model.load().await;
        assert_eq!(
            requests.lock()[0],
            "/api/items?page%5Boffset%5D=0&page%5Blimit%5D=10"
        );
        assert_eq!(model.items().get(), RemoteData::Success(vec![1, 2, 3]));
        assert_eq!(model.pagination().items_count(), Some(3));
    }

    #[tokio::test]
    async fn test_filter_contributes_to_query() {
        let (source, requests) = counting_source(vec![Page {
            items: vec![],
            total_count: 0,
        }]);
        let filtering = Arc::new(FilteringModel::new());
        let names = Arc::new(crate::model::filter::RawTextFilterModel::new());
        filtering.put("names", names.clone());
        let model = OverviewPageModel::builder("/api/items", source)
            .filtering(filtering)
            .debounce_delay(Duration::ZERO)
            .build();

        names.set_value("run1");
        model.apply_filters().await;
        assert!(requests
            .lock()
            .iter()
            .any(|url| url.contains("filter%5Bnames%5D=run1")));
    }

    #[tokio::test]
    async fn test_debounce_delay_adjustable_after_build() {
        let (source, requests) = counting_source(vec![Page {
            items: vec![],
            total_count: 0,
        }]);
        let model = OverviewPageModel::builder("/api/items", source)
            .debounce_delay(Duration::from_secs(60))
            .build();

        model.set_debounce_delay(Duration::ZERO);
        assert_eq!(model.debounce_delay(), Duration::ZERO);

        // With the delay cleared the reload goes out immediately instead of
        // waiting behind the sixty-second window set at build time.
        model.apply_filters().await;
        assert_eq!(requests.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_infinite_scroll_appends_chunks() {
        let (source, _) = counting_source(vec![
            Page {
                items: vec![1, 2],
                total_count: 5,
            },
            Page {
                items: vec![3, 4],
                total_count: 5,
            },
            Page {
                items: vec![5],
                total_count: 5,
            },
        ]);
        let model = OverviewPageModel::builder("/api/items", source).build();

        model.pagination().enable_infinite_mode();
        model.load().await;
        assert_eq!(model.items().get(), RemoteData::Success(vec![1, 2]));

        model.pagination().silently_set_current_page(2);
        model.load().await;
        model.pagination().silently_set_current_page(3);
        model.load().await;
        assert_eq!(
            model.items().get(),
            RemoteData::Success(vec![1, 2, 3, 4, 5])
        );
    }

    #[tokio::test]
    async fn test_page_change_replaces_items_without_infinite_scroll() {
        let (source, _) = counting_source(vec![
            Page {
                items: vec![1, 2],
                total_count: 4,
            },
            Page {
                items: vec![3, 4],
                total_count: 4,
            },
        ]);
        let model = OverviewPageModel::builder("/api/items", source).build();

        model.load().await;
        model.pagination().silently_set_current_page(2);
        model.load().await;
        assert_eq!(model.items().get(), RemoteData::Success(vec![3, 4]));
    }

    #[tokio::test]
    async fn test_process_items_hook_transforms_incoming_page() {
        let (source, _) = counting_source(vec![Page {
            items: vec![1, 2, 3],
            total_count: 3,
        }]);
        let model = OverviewPageModel::builder("/api/items", source)
            .process_items(|items| items.into_iter().filter(|item| item % 2 == 1).collect())
            .build();

        model.load().await;
        assert_eq!(model.items().get(), RemoteData::Success(vec![1, 3]));
    }

    #[tokio::test]
    async fn test_failure_surfaces_api_errors() {
        let source = Arc::new(FnDataSource::new(|_endpoint: String| async move {
            Err(vec![ApiError::new("Service Unavailable", "try again later")])
        }));
        let model = OverviewPageModel::<u32>::builder("/api/items", source).build();

        model.load().await;
        assert_eq!(
            model.items().get(),
            RemoteData::Failure(vec![ApiError::new("Service Unavailable", "try again later")])
        );
    }

    #[tokio::test]
    async fn test_export_snapshot_is_cached_per_filter_config() {
        let (source, requests) = counting_source(vec![Page {
            items: vec![1, 2, 3],
            total_count: 3,
        }]);
        let filtering = Arc::new(FilteringModel::new());
        let names = Arc::new(crate::model::filter::RawTextFilterModel::new());
        filtering.put("names", names.clone());
        let model = OverviewPageModel::builder("/api/items", source)
            .filtering(filtering)
            .debounce_delay(Duration::ZERO)
            .build();

        // Export requests carry no page params, unlike window reloads.
        let export_requests = move || {
            requests
                .lock()
                .iter()
                .filter(|url| !url.contains("page%5B"))
                .count()
        };

        let first = model.load_export().await;
        let second = model.load_export().await;
        assert_eq!(first, RemoteData::Success(vec![1, 2, 3]));
        assert_eq!(second, first);
        assert_eq!(export_requests(), 1);

        names.set_value("run1");
        model.apply_filters().await;
        model.load_export().await;
        // The filter change invalidated the snapshot, forcing a refetch.
        assert_eq!(export_requests(), 2);
    }

    #[tokio::test]
    async fn test_export_truncation_compares_against_total() {
        let (source, _) = counting_source(vec![
            Page {
                items: vec![1, 2],
                total_count: 5,
            },
            Page {
                items: vec![1, 2],
                total_count: 5,
            },
        ]);
        let model = OverviewPageModel::builder("/api/items", source).build();

        model.load().await;
        model.load_export().await;
        assert!(model.are_export_items_truncated());
    }

    #[tokio::test]
    async fn test_reset_returns_to_pristine_and_reloads() {
        let (source, _) = counting_source(vec![Page {
            items: vec![1],
            total_count: 1,
        }]);
        let model = OverviewPageModel::builder("/api/items", source).build();

        model.pagination().silently_set_current_page(3);
        model.reset().await;
        assert_eq!(model.pagination().current_page(), 1);
        assert_eq!(model.items().get(), RemoteData::Success(vec![1]));
    }
}
