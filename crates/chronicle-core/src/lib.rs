//! Core reactive primitives for Chronicle.
//!
//! This crate provides the foundational components of the Chronicle model
//! layer:
//!
//! - **Notification channels**: [`Notifier`] with observer registration and
//!   parent-forwarding ("bubbling")
//! - **Observable data**: [`ObservableData`] value snapshots with change
//!   notification and derived pipelines
//! - **Remote data lifecycle**: [`RemoteData`] tagged union for asynchronous
//!   fetches (not asked / loading / success / failure)
//! - **Debouncing**: [`Debouncer`] quiescence-window coalescing of repeated
//!   triggers
//!
//! # Notification Example
//!
//! ```
//! use std::sync::Arc;
//! use chronicle_core::{Notifier, ObservableData, RemoteData};
//!
//! // A page-level channel that sub-model channels bubble to.
//! let page = Arc::new(Notifier::new());
//! page.observe(|| println!("re-render"));
//!
//! let items: ObservableData<RemoteData<Vec<u32>, String>> =
//!     ObservableData::new(RemoteData::NotAsked);
//! items.notifier().bubble_to(&page);
//!
//! // Replacing the remote data notifies the page.
//! items.set(RemoteData::Loading);
//! ```
//!
//! # Execution Model
//!
//! All types here are `Send + Sync` and usable from any thread, but the
//! intended execution model is a single cooperative loop: model mutations
//! happen between awaited fetch calls, and notification delivery is
//! synchronous and depth-first, so observers see effects in mutation order.

mod debounce;
mod notifier;
mod observable;
mod remote_data;

pub use debounce::Debouncer;
pub use notifier::{Notifier, ObserverGuard, ObserverId};
pub use observable::ObservableData;
pub use remote_data::RemoteData;
