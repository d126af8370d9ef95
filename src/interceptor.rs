//! Interceptor registries.
//!
//! An interceptor is a fulfill/reject handler pair spliced into the
//! request or response phase of the pipeline. Registries keep pairs at
//! stable integer handles: removal tombstones the slot instead of
//! shifting later handles, and handles are never reused. Chains snapshot
//! the registry when they are built, so handlers registered afterwards do
//! not retroactively affect in-flight requests.
//!
//! # Example
//!
//! ```rust
//! use courier::interceptor::{InterceptorManager, InterceptorPair};
//! use courier::config::RequestConfig;
//!
//! let registry: InterceptorManager<RequestConfig> = InterceptorManager::new();
//! let handle = registry.add(
//!     InterceptorPair::new().on_fulfilled(|config: RequestConfig| async move {
//!         Ok(config.header("X-Trace", "1"))
//!     }),
//! );
//! registry.eject(handle);
//! ```

use futures_util::future::BoxFuture;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Async handler invoked with the current pipeline value.
pub type Handler<T> = Arc<dyn Fn(T) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Async handler invoked with the current pipeline failure; may recover
/// by returning `Ok`.
pub type ErrorHandler<T> = Arc<dyn Fn(Error) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// A fulfill/reject handler pair.
pub struct InterceptorPair<T> {
    /// Runs when the chain reaches this pair carrying a value.
    pub fulfilled: Option<Handler<T>>,
    /// Runs when the chain reaches this pair carrying a failure.
    pub rejected: Option<ErrorHandler<T>>,
}

impl<T> InterceptorPair<T> {
    /// Creates an empty pair; both slots pass the chain state through.
    pub fn new() -> Self {
        Self {
            fulfilled: None,
            rejected: None,
        }
    }

    /// Sets the fulfill handler.
    pub fn on_fulfilled<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.fulfilled = Some(Arc::new(move |value| -> BoxFuture<'static, Result<T>> {
            Box::pin(handler(value))
        }));
        self
    }

    /// Sets the reject handler.
    pub fn on_rejected<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.rejected = Some(Arc::new(move |error| -> BoxFuture<'static, Result<T>> {
            Box::pin(handler(error))
        }));
        self
    }
}

impl<T> Default for InterceptorPair<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for InterceptorPair<T> {
    fn clone(&self) -> Self {
        Self {
            fulfilled: self.fulfilled.clone(),
            rejected: self.rejected.clone(),
        }
    }
}

/// Ordered, stably-indexed registry of interceptor pairs.
pub struct InterceptorManager<T> {
    handlers: RwLock<Vec<Option<InterceptorPair<T>>>>,
}

impl<T> InterceptorManager<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Appends a pair and returns its handle.
    pub fn add(&self, pair: InterceptorPair<T>) -> usize {
        let mut handlers = self.handlers.write();
        handlers.push(Some(pair));
        handlers.len() - 1
    }

    /// Tombstones the pair at `handle`. Idempotent; out-of-range handles
    /// are ignored.
    pub fn eject(&self, handle: usize) {
        let mut handlers = self.handlers.write();
        if let Some(slot) = handlers.get_mut(handle) {
            *slot = None;
        }
    }

    /// Visits every live pair in registration order.
    pub fn for_each(&self, mut visit: impl FnMut(&InterceptorPair<T>)) {
        for pair in self.handlers.read().iter().flatten() {
            visit(pair);
        }
    }

    /// The live pairs in registration order, as captured at this moment.
    pub fn snapshot(&self) -> Vec<InterceptorPair<T>> {
        self.handlers.read().iter().flatten().cloned().collect()
    }

    /// Number of live (non-tombstoned) pairs.
    pub fn len(&self) -> usize {
        self.handlers.read().iter().flatten().count()
    }

    /// Whether the registry has no live pairs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for InterceptorManager<T> {
    fn default() -> Self {
        Self::new()
    }
}
