//! Remote data lifecycle.
//!
//! [`RemoteData<T, E>`] captures the four states of an asynchronous fetch:
//! not yet requested, in flight, succeeded, or failed. Models hold their
//! fetched content as `RemoteData` inside an observable cell, so views can
//! render each state explicitly instead of special-casing `None` or sentinel
//! values.
//!
//! Transitions are owner-driven: a cell is created `NotAsked`, moves to
//! `Loading` before a request, then to `Success` or `Failure` on completion,
//! and never reverts except through an explicit reset by its owner.
//!
//! Matching is the native Rust `match` and therefore exhaustive at compile
//! time. The combinators ([`map`](RemoteData::map),
//! [`map_failure`](RemoteData::map_failure)) transform only the matched
//! variant and pass the other variants through unchanged, which lets derived
//! views of a fetch be pipelined without re-fetching.
//!
//! # Example
//!
//! ```
//! use chronicle_core::RemoteData;
//!
//! let data: RemoteData<Vec<u32>, String> = RemoteData::Success(vec![1, 2, 3]);
//!
//! // Derive a filtered view; Loading/Failure would pass through unchanged.
//! let even = data.map(|items| {
//!     items.into_iter().filter(|n| n % 2 == 0).collect::<Vec<_>>()
//! });
//! assert_eq!(even.success(), Some(&vec![2]));
//! ```

/// The lifecycle state of an asynchronously fetched value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteData<T, E> {
    /// No request has been made yet.
    NotAsked,
    /// A request is in flight.
    Loading,
    /// The request completed with a value.
    Success(T),
    /// The request failed.
    Failure(E),
}

impl<T, E> RemoteData<T, E> {
    /// Returns `true` if no request has been made.
    pub fn is_not_asked(&self) -> bool {
        matches!(self, Self::NotAsked)
    }

    /// Returns `true` if a request is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` if the request succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` if the request failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns the success value, if any.
    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the failure value, if any.
    pub fn failure(&self) -> Option<&E> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }

    /// Converts from `&RemoteData<T, E>` to `RemoteData<&T, &E>`.
    pub fn as_ref(&self) -> RemoteData<&T, &E> {
        match self {
            Self::NotAsked => RemoteData::NotAsked,
            Self::Loading => RemoteData::Loading,
            Self::Success(value) => RemoteData::Success(value),
            Self::Failure(error) => RemoteData::Failure(error),
        }
    }

    /// Transforms the success value, passing the other states through.
    pub fn map<U, F>(self, f: F) -> RemoteData<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::NotAsked => RemoteData::NotAsked,
            Self::Loading => RemoteData::Loading,
            Self::Success(value) => RemoteData::Success(f(value)),
            Self::Failure(error) => RemoteData::Failure(error),
        }
    }

    /// Transforms the failure value, passing the other states through.
    pub fn map_failure<F2, F>(self, f: F) -> RemoteData<T, F2>
    where
        F: FnOnce(E) -> F2,
    {
        match self {
            Self::NotAsked => RemoteData::NotAsked,
            Self::Loading => RemoteData::Loading,
            Self::Success(value) => RemoteData::Success(value),
            Self::Failure(error) => RemoteData::Failure(f(error)),
        }
    }

    /// Returns the success value, or `default` for every other state.
    pub fn unwrap_success_or(self, default: T) -> T {
        match self {
            Self::Success(value) => value,
            _ => default,
        }
    }

    /// Builds a `RemoteData` from a completed request result.
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

impl<T, E> Default for RemoteData<T, E> {
    fn default() -> Self {
        Self::NotAsked
    }
}
