//! Data source contracts and fetch helpers.
//!
//! The model layer never talks HTTP itself: it depends on the [`DataSource`]
//! trait, an opaque asynchronous collaborator that resolves an endpoint to a
//! page of items plus a total count, or fails with a list of [`ApiError`]
//! records. The composition root decides what actually backs it (an HTTP
//! client in production, a scripted fake in tests).
//!
//! On top of the raw contract this module provides:
//!
//! - [`RemoteDataSource`] - fetches into an observable [`RemoteData`] cell
//!   with race-safe stale-result discarding
//! - [`CachedDataProvider`] - an explicit cache with explicit invalidation
//!   for remotely-loaded option lists
//! - [`FnDataSource`] - adapts a closure into a [`DataSource`]

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures_util::future::BoxFuture;

use chronicle_core::{ObservableData, RemoteData};

/// A single error record as surfaced by the remote API.
///
/// Fetch failures carry a *list* of these; the view renders them as
/// title/detail pairs. There is no automatic retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Short human-readable summary.
    pub title: String,
    /// Longer explanation of the failure.
    pub detail: String,
}

impl ApiError {
    /// Creates an error record from title and detail.
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.detail)
    }
}

impl std::error::Error for ApiError {}

/// One page of a paginated response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The items of this page.
    pub items: Vec<T>,
    /// The total number of items matching the query, across all pages.
    pub total_count: usize,
}

/// Result type of a data source fetch.
pub type FetchResult<T> = Result<Page<T>, Vec<ApiError>>;

/// The abstract fetch collaborator.
///
/// `endpoint` is a fully built URL (path plus serialized query, see
/// [`crate::query::build_url`]). Implementations must be cheap to share;
/// models hold them behind `Arc`.
pub trait DataSource<T>: Send + Sync {
    /// Resolve the endpoint to a page of items, or a list of error records.
    fn fetch(&self, endpoint: &str) -> BoxFuture<'_, FetchResult<T>>;
}

/// Adapts a closure returning a future into a [`DataSource`].
///
/// Mostly useful for tests and small composition roots:
///
/// ```
/// use chronicle::data_source::{ApiError, FnDataSource, Page};
///
/// let source = FnDataSource::new(|_endpoint: String| async move {
///     Ok::<_, Vec<ApiError>>(Page { items: vec![1, 2, 3], total_count: 3 })
/// });
/// ```
pub struct FnDataSource<F> {
    fetch: F,
}

impl<F> FnDataSource<F> {
    /// Wraps the given closure.
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<T, F, Fut> DataSource<T> for FnDataSource<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = FetchResult<T>> + Send + 'static,
{
    fn fetch(&self, endpoint: &str) -> BoxFuture<'_, FetchResult<T>> {
        Box::pin((self.fetch)(endpoint.to_string()))
    }
}

/// Fetches pages into an observable [`RemoteData`] cell.
///
/// The cell moves to `Loading` before each request and to `Success`/`Failure`
/// on completion. Overlapping fetches on the same source are superseded: each
/// request takes a generation number and a completion is discarded when a
/// newer request has started in the meantime, so the newest request always
/// wins regardless of response ordering.
pub struct RemoteDataSource<T> {
    source: Arc<dyn DataSource<T>>,
    data: Arc<ObservableData<RemoteData<Page<T>, Vec<ApiError>>>>,
    generation: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> RemoteDataSource<T> {
    /// Creates a source wrapping the given fetch collaborator.
    pub fn new(source: Arc<dyn DataSource<T>>) -> Self {
        Self {
            source,
            data: Arc::new(ObservableData::new(RemoteData::NotAsked)),
            generation: AtomicU64::new(0),
        }
    }

    /// The observable remote data this source fills.
    pub fn data(&self) -> &Arc<ObservableData<RemoteData<Page<T>, Vec<ApiError>>>> {
        &self.data
    }

    /// Fetch the given endpoint into the observable cell.
    ///
    /// Returns `true` if the completion was applied, `false` if it was
    /// discarded because a newer fetch started while this one was in flight.
    pub async fn fetch(&self, endpoint: &str) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.data.set(RemoteData::Loading);

        tracing::debug!(target: "chronicle::data_source", endpoint, generation, "fetching");
        let result = self.source.fetch(endpoint).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(
                target: "chronicle::data_source",
                generation,
                "discarding stale response"
            );
            return false;
        }

        self.data.set(RemoteData::from_result(result));
        true
    }
}

/// An explicit cache for a remotely-loaded list.
///
/// Option lists (detectors, tags, run types, ...) are fetched once and reused
/// across the page. The cache is an owned entity with an explicit
/// [`invalidate`](Self::invalidate) call: the next [`load`](Self::load) after
/// invalidation refetches, and consumers observe the items cell for the
/// refresh. There is no module-level state.
pub struct CachedDataProvider<T> {
    endpoint: String,
    source: Arc<dyn DataSource<T>>,
    items: Arc<ObservableData<RemoteData<Vec<T>, Vec<ApiError>>>>,
    stale: AtomicBool,
    generation: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> CachedDataProvider<T> {
    /// Creates a provider caching the given endpoint.
    pub fn new(endpoint: impl Into<String>, source: Arc<dyn DataSource<T>>) -> Self {
        Self {
            endpoint: endpoint.into(),
            source,
            items: Arc::new(ObservableData::new(RemoteData::NotAsked)),
            stale: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// The observable cached items.
    pub fn items(&self) -> &Arc<ObservableData<RemoteData<Vec<T>, Vec<ApiError>>>> {
        &self.items
    }

    /// Marks the cache stale; the next [`load`](Self::load) refetches.
    pub fn invalidate(&self) {
        self.stale.store(true, Ordering::SeqCst);
    }

    /// Loads the list if it is missing or stale.
    ///
    /// A fresh `Success` cache is a no-op. Failures are not cached: a failed
    /// load leaves the cell in `Failure` and the next call retries.
    pub async fn load(&self) {
        let stale = self.stale.swap(false, Ordering::SeqCst);
        if !stale && self.items.with(RemoteData::is_success) {
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.items.set(RemoteData::Loading);
        let result = self.source.fetch(&self.endpoint).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        self.items
            .set(RemoteData::from_result(result.map(|page| page.items)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;

    fn counting_source(counter: Arc<Mutex<usize>>, items: Vec<u32>) -> Arc<dyn DataSource<u32>> {
        Arc::new(FnDataSource::new(move |_endpoint: String| {
            *counter.lock() += 1;
            let items = items.clone();
            async move {
                let total_count = items.len();
                Ok(Page { items, total_count })
            }
        }))
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let calls = Arc::new(Mutex::new(0));
        let source = RemoteDataSource::new(counting_source(calls.clone(), vec![1, 2]));

        assert!(source.data().get().is_not_asked());
        assert!(source.fetch("/api/runs").await);

        let data = source.data().get();
        let page = data.success().unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.total_count, 2);
        assert_eq!(*calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure() {
        let source: RemoteDataSource<u32> =
            RemoteDataSource::new(Arc::new(FnDataSource::new(|_endpoint: String| async move {
                Err(vec![ApiError::new("Service unavailable", "try again later")])
            })));

        assert!(source.fetch("/api/runs").await);
        let data = source.data().get();
        assert_eq!(
            data.failure().unwrap()[0],
            ApiError::new("Service unavailable", "try again later")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_fetch_supersedes_older() {
        // The slow endpoint resolves after the fast one; its completion must
        // be discarded.
        let source = Arc::new(RemoteDataSource::new(Arc::new(FnDataSource::new(
            |endpoint: String| async move {
                if endpoint.contains("slow") {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok(Page {
                        items: vec![1u32],
                        total_count: 1,
                    })
                } else {
                    Ok(Page {
                        items: vec![2u32],
                        total_count: 1,
                    })
                }
            },
        ))));

        let slow = tokio::spawn({
            let source = source.clone();
            async move { source.fetch("/slow").await }
        });
        tokio::task::yield_now().await;
        let fast = tokio::spawn({
            let source = source.clone();
            async move { source.fetch("/fast").await }
        });

        assert!(fast.await.unwrap());
        assert!(!slow.await.unwrap());

        let data = source.data().get();
        assert_eq!(data.success().unwrap().items, vec![2]);
    }

    #[tokio::test]
    async fn test_cached_provider_fetches_once() {
        let calls = Arc::new(Mutex::new(0));
        let provider = CachedDataProvider::new("/api/tags", counting_source(calls.clone(), vec![7]));

        provider.load().await;
        provider.load().await;

        assert_eq!(*calls.lock(), 1);
        assert_eq!(provider.items().get().success().unwrap(), &vec![7]);
    }

    #[tokio::test]
    async fn test_cached_provider_invalidation_refetches() {
        let calls = Arc::new(Mutex::new(0));
        let provider = CachedDataProvider::new("/api/tags", counting_source(calls.clone(), vec![7]));

        provider.load().await;
        provider.invalidate();
        provider.load().await;

        assert_eq!(*calls.lock(), 2);
    }
}
