//! Observable data snapshots.
//!
//! [`ObservableData<T>`] pairs a current value with a [`Notifier`], notifying
//! every time the value is replaced. It is the data backbone of the Chronicle
//! model layer: models hold their state in observable cells and views observe
//! the page-level channel those cells bubble to.
//!
//! Derived observables recompute their value from a source cell on every
//! source notification, which lets a fetched data set be re-projected (for
//! example filtered by permission) without re-fetching.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chronicle_core::ObservableData;
//!
//! let counter = Arc::new(ObservableData::new(0));
//! counter.notifier().observe(|| println!("value changed"));
//!
//! counter.set(1);
//! assert_eq!(counter.get(), 1);
//!
//! let doubled = ObservableData::derived(&counter, |value| value * 2);
//! counter.set(21);
//! assert_eq!(doubled.get(), 42);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::notifier::Notifier;

/// A value snapshot that notifies on replacement.
///
/// # Thread Safety
///
/// `ObservableData<T>` uses interior mutability with `RwLock` and is
/// `Send + Sync` when `T` is. The value lock is released before observers
/// run, so callbacks may read the cell they observe.
pub struct ObservableData<T> {
    value: RwLock<T>,
    notifier: Arc<Notifier>,
}

impl<T: Clone> ObservableData<T> {
    /// Create a new observable holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            value: RwLock::new(initial),
            notifier: Arc::new(Notifier::new()),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider [`with`](Self::with).
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the current value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Replace the value and notify observers.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
        self.notifier.notify();
    }

    /// Replace the value without notifying.
    ///
    /// Useful during initialization or when the owner coordinates a single
    /// aggregated notification itself.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }

    /// The change channel of this cell.
    ///
    /// Bubble it to a parent channel to surface changes at page level.
    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    /// Create an observable that re-derives its value from `source` on every
    /// source notification.
    ///
    /// The derived cell holds `f(source.get())` and is refreshed (with a
    /// notification of its own) every time the source notifies. The source
    /// keeps the derivation alive through its observer registration.
    pub fn derived<U, F>(source: &Arc<ObservableData<T>>, f: F) -> Arc<ObservableData<U>>
    where
        T: Send + Sync + 'static,
        U: Clone + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let derived = Arc::new(ObservableData::new(source.with(&f)));

        let weak_source = Arc::downgrade(source);
        let derived_clone = Arc::clone(&derived);
        source.notifier().observe(move || {
            if let Some(source) = weak_source.upgrade() {
                derived_clone.set(source.with(&f));
            }
        });

        derived
    }
}

impl<T: Clone + Default> Default for ObservableData<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for ObservableData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableData")
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_get_set() {
        let cell = ObservableData::new(5);
        assert_eq!(cell.get(), 5);
        cell.set(7);
        assert_eq!(cell.get(), 7);
    }

    #[test]
    fn test_set_notifies() {
        let cell = ObservableData::new(String::new());
        let count = Arc::new(Mutex::new(0));

        let count_clone = count.clone();
        cell.notifier().observe(move || *count_clone.lock() += 1);

        cell.set("a".to_string());
        cell.set("b".to_string());
        assert_eq!(*count.lock(), 2);
    }

    #[test]
    fn test_set_silent_does_not_notify() {
        let cell = ObservableData::new(0);
        let count = Arc::new(Mutex::new(0));

        let count_clone = count.clone();
        cell.notifier().observe(move || *count_clone.lock() += 1);

        cell.set_silent(9);
        assert_eq!(cell.get(), 9);
        assert_eq!(*count.lock(), 0);
    }

    #[test]
    fn test_observer_can_read_cell() {
        let cell = Arc::new(ObservableData::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let cell_clone = cell.clone();
        let seen_clone = seen.clone();
        cell.notifier().observe(move || {
            seen_clone.lock().push(cell_clone.get());
        });

        cell.set(1);
        cell.set(2);
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn test_derived_tracks_source() {
        let source = Arc::new(ObservableData::new(2));
        let squared = ObservableData::derived(&source, |value| value * value);
        assert_eq!(squared.get(), 4);

        source.set(3);
        assert_eq!(squared.get(), 9);
    }

    #[test]
    fn test_derived_notifies_own_observers() {
        let source = Arc::new(ObservableData::new(1));
        let negated = ObservableData::derived(&source, |value| -value);

        let count = Arc::new(Mutex::new(0));
        let count_clone = count.clone();
        negated.notifier().observe(move || *count_clone.lock() += 1);

        source.set(5);
        assert_eq!(negated.get(), -5);
        assert_eq!(*count.lock(), 1);
    }
}
