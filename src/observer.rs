//! Diagnostic observers for dependency injection traceability.
//!
//! Observers are told about every resolution and scope change. The built-in
//! [`TracingObserver`] turns those notifications into `tracing` events.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::DiError;
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;
use crate::scope::ScopeId;

/// Observer trait for dependency injection resolution events.
///
/// Calls are made synchronously on the resolving thread, so implementations
/// should stay cheap. Nested resolutions produce nested notifications.
///
/// # Examples
///
/// ```
/// use epoch_di::{Container, DiObserver, Lifetime, Resolver, ServiceKey};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counting(AtomicUsize);
///
/// impl DiObserver for Counting {
///     fn resolving(&self, _key: &ServiceKey, _lifetime: Lifetime) {}
///
///     fn resolved(&self, _key: &ServiceKey, _lifetime: Lifetime, _elapsed: Duration) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let observer = Arc::new(Counting::default());
/// let container = Container::new();
/// container.add_observer(observer.clone());
/// container.add_singleton(5u8).unwrap();
/// container.resolve::<u8>().unwrap();
/// assert_eq!(observer.0.load(Ordering::SeqCst), 1);
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before the cache is consulted for `key`.
    fn resolving(&self, key: &ServiceKey, lifetime: Lifetime);

    /// Called when `key` was resolved, from cache or freshly built.
    fn resolved(&self, key: &ServiceKey, lifetime: Lifetime, elapsed: Duration);

    /// Called when resolving `key` failed.
    fn resolution_failed(&self, key: &ServiceKey, error: &DiError) {
        let _ = (key, error);
    }

    /// Called after the active scope changed.
    fn scope_started(&self, previous: ScopeId, current: ScopeId) {
        let _ = (previous, current);
    }
}

/// Container for registered observers.
///
/// Observer notification is skipped entirely when the list is empty.
#[derive(Default)]
pub(crate) struct Observers {
    observers: RwLock<Vec<Arc<dyn DiObserver>>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, observer: Arc<dyn DiObserver>) {
        self.observers.write().push(observer);
    }

    /// Snapshot of the registered observers, or `None` when there are none.
    #[inline]
    pub(crate) fn snapshot(&self) -> Option<Vec<Arc<dyn DiObserver>>> {
        let observers = self.observers.read();
        if observers.is_empty() {
            None
        } else {
            Some(observers.clone())
        }
    }

    pub(crate) fn scope_started(&self, previous: ScopeId, current: ScopeId) {
        if let Some(observers) = self.snapshot() {
            for observer in &observers {
                observer.scope_started(previous, current);
            }
        }
    }
}

/// Built-in observer that forwards events to `tracing`.
///
/// Resolutions are logged at `TRACE`, failures at `DEBUG` and scope changes
/// at `INFO`, each carrying the container label given at construction.
///
/// ```
/// use epoch_di::{Container, TracingObserver};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// container.add_observer(Arc::new(TracingObserver::new()));
/// ```
#[derive(Debug, Clone)]
pub struct TracingObserver {
    label: &'static str,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self { label: "epoch-di" }
    }

    /// Adds `label` as a `container` field to every event, to tell containers apart.
    pub fn with_label(label: &'static str) -> Self {
        Self { label }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for TracingObserver {
    fn resolving(&self, key: &ServiceKey, lifetime: Lifetime) {
        tracing::trace!(container = self.label, service = %key, %lifetime, "resolving");
    }

    fn resolved(&self, key: &ServiceKey, lifetime: Lifetime, elapsed: Duration) {
        tracing::trace!(
            container = self.label,
            service = %key,
            %lifetime,
            elapsed_us = elapsed.as_micros() as u64,
            "resolved"
        );
    }

    fn resolution_failed(&self, key: &ServiceKey, error: &DiError) {
        tracing::debug!(container = self.label, service = %key, %error, "resolution failed");
    }

    fn scope_started(&self, previous: ScopeId, current: ScopeId) {
        tracing::info!(container = self.label, %previous, %current, "scope started");
    }
}
