//! Chronicle - reactive models for data-heavy overview pages.
//!
//! Chronicle provides the state layer of a bookkeeping-style front end: pages
//! that fetch, filter, paginate and export collections of remote records. The
//! reactive primitives (notifiers, observable cells, remote data) live in
//! `chronicle-core` and are re-exported here; this crate adds the model layer
//! built on top of them.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chronicle::data_source::{FnDataSource, Page};
//! use chronicle::model::OverviewPageModel;
//!
//! # async fn demo() {
//! let source = Arc::new(FnDataSource::new(|_endpoint: String| async move {
//!     Ok(Page { items: vec!["run1".to_string()], total_count: 1 })
//! }));
//!
//! let overview = OverviewPageModel::builder("/api/runs", source).build();
//! overview.notifier().observe(|| {
//!     // re-render
//! });
//! overview.load().await;
//! # }
//! ```
//!
//! # Key Types
//!
//! - [`model::OverviewPageModel`] - composes pagination, filtering, fetching
//!   and export for one overview page
//! - [`model::FilteringModel`] - aggregates named [`model::FilterModel`]s
//! - [`model::PaginationModel`] - the visible window over the collection
//! - [`model::SelectionModel`] - selection state for picker-style controls
//! - [`data_source::DataSource`] - the abstract fetch collaborator
//! - [`export::DataExportModel`] - renders items to CSV or JSON

pub use chronicle_core::*;

pub mod data_source;
pub mod error;
pub mod export;
pub mod model;
pub mod query;
