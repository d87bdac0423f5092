//! Execution context abstraction for dispatch steps.

use std::future::Future;
use std::time::Duration;

/// Abstraction for launching dispatch work on a runtime.
///
/// A dispatch step must run independently of the producer that triggered
/// it, so the engine never awaits what it spawns. Item handlers are
/// synchronous and may block, so deliveries go through
/// [`spawn_blocking`](Spawn::spawn_blocking); timers and async waits use
/// [`spawn`](Spawn::spawn) and [`sleep`](Spawn::sleep).
pub trait Spawn {
    /// Future returned by [`sleep`](Spawn::sleep).
    type Sleep: Future<Output = ()> + Send + 'static;

    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Run a blocking closure off the async workers.
    fn spawn_blocking<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static;

    /// A future completing after `duration`. Polled from inside a future
    /// passed to [`spawn`](Spawn::spawn).
    fn sleep(&self, duration: Duration) -> Self::Sleep;
}
