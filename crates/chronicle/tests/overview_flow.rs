//! End-to-end flows over an overview page: filtering into the query,
//! debounced reloads and race safety between overlapping requests.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::sleep;

use chronicle::RemoteData;
use chronicle::data_source::{DataSource, FnDataSource, Page};
use chronicle::model::{
    FilteringModel, OverviewPageModel, RawTextFilterModel, TokenListFilterModel,
};

/// Surfaces model tracing in test output when `RUST_LOG` asks for it.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A source that records every requested URL and answers with a fixed page.
fn recording_source(
    items: Vec<u32>,
    total_count: usize,
) -> (Arc<dyn DataSource<u32>>, Arc<Mutex<Vec<String>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();
    let source: Arc<dyn DataSource<u32>> = Arc::new(FnDataSource::new(move |endpoint: String| {
        seen.lock().push(endpoint);
        let page = Page {
            items: items.clone(),
            total_count,
        };
        async move { Ok(page) }
    }));
    (source, requests)
}

#[tokio::test]
async fn filters_flow_into_the_query_and_empty_ones_are_dropped() {
    init_tracing();
    let (source, requests) = recording_source(vec![1], 1);

    let filtering = Arc::new(FilteringModel::new());
    let names = Arc::new(TokenListFilterModel::new());
    let titles = Arc::new(RawTextFilterModel::new());
    filtering.put("names", names.clone());
    filtering.put("titles", titles.clone());

    let overview = OverviewPageModel::builder("/api/runs", source)
        .filtering(filtering)
        .debounce_delay(Duration::ZERO)
        .build();

    names.set_value("run1, run2");
    overview.apply_filters().await;

    let last = requests.lock().last().cloned().unwrap();
    assert!(last.contains("filter%5Bnames%5D=run1%2Crun2"), "url: {last}");
    assert!(!last.contains("titles"), "empty filter leaked into url: {last}");
}

#[tokio::test(start_paused = true)]
async fn burst_of_filter_edits_costs_one_reload() {
    init_tracing();
    let (source, requests) = recording_source(vec![1], 1);

    let filtering = Arc::new(FilteringModel::new());
    let names = Arc::new(RawTextFilterModel::new());
    filtering.put("names", names.clone());

    // Kept alive for the reactive wiring; the observers hold it weakly.
    let _overview = OverviewPageModel::builder("/api/runs", source)
        .filtering(filtering)
        .debounce_delay(Duration::from_millis(200))
        .build();

    // Three quick edits, each triggering the reactive debounced reload.
    names.set_value("a");
    sleep(Duration::from_millis(50)).await;
    names.set_value("ab");
    sleep(Duration::from_millis(50)).await;
    names.set_value("abc");

    // Let the debounce window elapse and the spawned reload run.
    sleep(Duration::from_millis(300)).await;

    let requests = requests.lock();
    assert_eq!(requests.len(), 1, "requests: {requests:?}");
    assert!(requests[0].contains("filter%5Bnames%5D=abc"));
}

#[tokio::test(start_paused = true)]
async fn overlapping_loads_resolve_to_the_newest_request() {
    init_tracing();
    // The first request is slow, the second fast; the slow completion must
    // not overwrite the newer one.
    let calls = Arc::new(Mutex::new(0_u32));
    let source = Arc::new(FnDataSource::new(move |_endpoint: String| {
        let call = {
            let mut calls = calls.lock();
            *calls += 1;
            *calls
        };
        async move {
            if call == 1 {
                sleep(Duration::from_secs(5)).await;
                Ok(Page {
                    items: vec![1_u32],
                    total_count: 1,
                })
            } else {
                Ok(Page {
                    items: vec![2_u32],
                    total_count: 1,
                })
            }
        }
    }));

    let overview = OverviewPageModel::builder("/api/runs", source).build();

    let slow = {
        let overview = overview.clone();
        tokio::spawn(async move { overview.load().await })
    };
    tokio::task::yield_now().await;
    overview.load().await;
    slow.await.unwrap();

    assert_eq!(overview.items().get(), RemoteData::Success(vec![2]));
}

#[tokio::test]
async fn page_change_reloads_reactively() {
    init_tracing();
    let (source, requests) = recording_source(vec![1, 2], 25);
    let overview = OverviewPageModel::builder("/api/runs", source).build();

    overview.load().await;
    overview.pagination().set_current_page(2);

    // The reactive reload is spawned onto the runtime; yield so it runs.
    tokio::task::yield_now().await;

    let requests = requests.lock();
    assert_eq!(requests.len(), 2, "requests: {requests:?}");
    assert!(requests[1].contains("page%5Boffset%5D=10"));
}

#[tokio::test]
async fn observers_see_loading_then_success() {
    init_tracing();
    let (source, _) = recording_source(vec![1], 1);
    let overview = OverviewPageModel::builder("/api/runs", source).build();

    let states = Arc::new(Mutex::new(Vec::new()));
    let seen = states.clone();
    let items = overview.items().clone();
    overview.notifier().observe(move || {
        seen.lock().push(items.get());
    });

    overview.load().await;

    let states = states.lock();
    assert!(states.contains(&RemoteData::Loading));
    assert_eq!(states.last(), Some(&RemoteData::Success(vec![1])));
}
