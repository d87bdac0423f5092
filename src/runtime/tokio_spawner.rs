//! Tokio runtime spawner implementation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{DispatchError, Spawn};

/// Tokio-based spawner that executes dispatch steps on a tokio runtime.
///
/// Deliveries run on the runtime's blocking pool, so a blocking handler
/// never occupies an async worker and a caller blocked on a flush wait
/// (even on a current-thread runtime) does not starve delivery.
#[derive(Clone, Debug)]
pub struct TokioSpawner {
    handle: Arc<tokio::runtime::Handle>,
}

impl TokioSpawner {
    /// Create a new `TokioSpawner` from a tokio runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Capture the runtime the caller is currently running inside.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Runtime`] when called outside a tokio runtime.
    pub fn try_current() -> Result<Self, DispatchError> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| DispatchError::Runtime(e.to_string()))
    }

    /// The underlying runtime handle.
    #[must_use]
    pub fn handle(&self) -> &tokio::runtime::Handle {
        &self.handle
    }
}

impl Spawn for TokioSpawner {
    type Sleep = tokio::time::Sleep;

    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut);
    }

    fn spawn_blocking<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.spawn_blocking(f);
    }

    fn sleep(&self, duration: Duration) -> Self::Sleep {
        let _guard = self.handle.enter();
        tokio::time::sleep(duration)
    }
}
