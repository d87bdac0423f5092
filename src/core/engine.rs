//! Priority-ordered, throttled, single-consumer dispatch engine.
//!
//! A [`DispatchEngine`] owns a [`PriorityBucketQueue`] and delivers its items
//! to one [`ItemHandler`], one at a time, on a spawned execution context.
//!
//! # Design
//!
//! - **One lock per engine**: queue, run flag, in-flight flag and throttle
//!   duration live behind a single `parking_lot::Mutex`. The handler is the
//!   only code that runs unlocked.
//! - **No dedicated thread**: a dispatch is a blocking task on the
//!   spawner's blocking pool that delivers until the queue drains, the
//!   engine is disabled, or the throttle timer takes over. Handlers may
//!   block without holding an async worker.
//! - **Single consumer**: the in-flight flag is checked and set under the
//!   lock, so at most one dispatch sequence exists per engine.
//! - **Flush gate**: a [`ManualResetEvent`] that is set exactly when the queue
//!   is empty and nothing is in flight. It is only touched under the lock.
//!
//! # Example
//!
//! ```rust,ignore
//! use priority_dispatch::core::{AppResult, DispatchEngine};
//! use std::time::Duration;
//!
//! let engine = DispatchEngine::with_between_time_ms(
//!     |update: String| -> AppResult<()> {
//!         println!("{update}");
//!         Ok(())
//!     },
//!     true,
//!     50,
//! )?;
//!
//! engine.enqueue_with_priority("low".to_string(), 10);
//! engine.enqueue_first("urgent".to_string());
//! assert!(engine.wait_for_flush_timeout(Duration::from_secs(1)));
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::failure::{build_failure, FailureKind, FailureSink};
use crate::core::{DispatchError, ItemHandler, Spawn};
use crate::infra::queue::{Priority, PriorityBucketQueue, LOWEST_PRECEDENCE};
use crate::runtime::TokioSpawner;
use crate::signal::ManualResetEvent;
use crate::timer::DelayTimer;

/// Convert a caller supplied throttle in milliseconds, rejecting negatives.
///
/// # Errors
///
/// Returns [`DispatchError::NegativeBetweenTime`] for `ms < 0`.
pub fn between_time_from_ms(ms: i64) -> Result<Duration, DispatchError> {
    u64::try_from(ms).map(Duration::from_millis).map_err(|_| {
        warn!(between_ms = ms, "rejected negative between time");
        DispatchError::NegativeBetweenTime(ms)
    })
}

/// State guarded by the engine lock.
struct DispatchState<T> {
    queue: PriorityBucketQueue<T>,
    run_enabled: bool,
    in_flight: bool,
    /// The in-flight dispatch is parked on the throttle timer.
    throttle_pending: bool,
    between: Duration,
}

impl<T> DispatchState<T> {
    const fn is_idle(&self) -> bool {
        self.run_enabled && !self.in_flight
    }

    /// Take the dispatch slot and the next item if idle with work queued.
    fn claim_next(&mut self) -> Option<T> {
        if !self.is_idle() {
            return None;
        }
        let item = self.queue.try_dequeue()?;
        self.in_flight = true;
        Some(item)
    }
}

/// What a dispatch does after a delivery or a throttle wait.
enum Step<T> {
    Deliver(T),
    Throttle,
    Stop,
}

struct Shared<T, S> {
    id: Uuid,
    state: Mutex<DispatchState<T>>,
    handler: Box<dyn ItemHandler<T>>,
    flushed: ManualResetEvent,
    throttle: DelayTimer<S>,
    spawner: S,
    failure_sink: RwLock<Option<Arc<dyn FailureSink>>>,
}

impl<T, S> Shared<T, S>
where
    T: Send + 'static,
    S: Spawn + Clone + Send + Sync + 'static,
{
    /// Insert through `place`, dispatching `item` directly when the engine is
    /// idle with an empty queue.
    fn admit_direct(self: &Arc<Self>, item: T, place: impl FnOnce(&mut PriorityBucketQueue<T>, T)) {
        let mut state = self.state.lock();
        self.flushed.reset();
        if state.is_idle() && state.queue.is_empty() {
            state.in_flight = true;
            drop(state);
            debug!(engine_id = %self.id, "idle engine dispatching item directly");
            self.launch(item);
            return;
        }
        place(&mut state.queue, item);
        let next = state.claim_next();
        drop(state);
        if let Some(next) = next {
            self.launch(next);
        }
    }

    /// Mutate the queue through `mutate`, then start a dispatch if idle.
    fn admit<R>(self: &Arc<Self>, mutate: impl FnOnce(&mut PriorityBucketQueue<T>) -> R) -> R {
        let mut state = self.state.lock();
        let out = mutate(&mut state.queue);
        if !state.queue.is_empty() {
            self.flushed.reset();
        }
        let next = state.claim_next();
        drop(state);
        if let Some(next) = next {
            self.launch(next);
        }
        out
    }

    fn launch(self: &Arc<Self>, item: T) {
        let shared = Arc::clone(self);
        self.spawner.spawn_blocking(move || shared.dispatch(item));
    }

    fn dispatch(self: &Arc<Self>, mut item: T) {
        debug!(engine_id = %self.id, "dispatch started");
        loop {
            self.deliver(item);
            match self.next_step(true) {
                Step::Deliver(next) => item = next,
                Step::Throttle | Step::Stop => return,
            }
        }
    }

    /// Decide how the in-flight dispatch continues. With `throttle` set and a
    /// non-zero between time, the throttle timer is armed instead of
    /// dequeuing.
    fn next_step(self: &Arc<Self>, throttle: bool) -> Step<T> {
        let mut state = self.state.lock();
        if state.run_enabled && !state.queue.is_empty() {
            if throttle && !state.between.is_zero() {
                state.throttle_pending = true;
                self.arm_throttle(state.between);
                debug!(
                    engine_id = %self.id,
                    between = ?state.between,
                    count = state.queue.len(),
                    "dispatch throttled"
                );
                return Step::Throttle;
            }
            if let Some(next) = state.queue.try_dequeue() {
                return Step::Deliver(next);
            }
        }
        state.in_flight = false;
        if state.queue.is_empty() {
            self.flushed.set();
        }
        debug!(
            engine_id = %self.id,
            run_enabled = state.run_enabled,
            count = state.queue.len(),
            "dispatch stopped"
        );
        Step::Stop
    }

    fn arm_throttle(self: &Arc<Self>, delay: Duration) {
        let weak = Arc::downgrade(self);
        self.throttle.start(delay, None, move || {
            if let Some(shared) = weak.upgrade() {
                shared.resume();
            }
        });
    }

    /// Throttle expiry: re-check and continue without another delay.
    fn resume(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            if !state.throttle_pending {
                return;
            }
            state.throttle_pending = false;
        }
        if let Step::Deliver(next) = self.next_step(false) {
            self.launch(next);
        }
    }

    /// Run the handler outside the lock, containing any failure.
    fn deliver(&self, item: T) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.handler.handle(item)));
        let (kind, reason) = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => (FailureKind::Error, format!("{e:#}")),
            Err(payload) => (FailureKind::Panic, panic_message(payload.as_ref())),
        };
        error!(engine_id = %self.id, kind = ?kind, error = %reason, "item handler failed");

        let sink = self.failure_sink.read().clone();
        if let Some(sink) = sink {
            sink.record(build_failure(
                kind,
                reason,
                format!("engine {}: item handler failed", self.id),
            ));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Serializes delivery of queued items to one handler.
///
/// Items come out in [`PriorityBucketQueue`] order. At most one handler call
/// is active at a time, consecutive calls are spaced by the configured
/// between time, and processing can be paused and resumed without losing
/// queued items.
///
/// Dropping the engine shuts it down: processing is disabled, the queue is
/// cleared, the throttle timer is stopped, and flush waiters are released.
/// A handler call already in progress still runs to completion.
pub struct DispatchEngine<T, S = TokioSpawner>
where
    T: Send + 'static,
    S: Spawn + Clone + Send + Sync + 'static,
{
    shared: Arc<Shared<T, S>>,
}

impl<T> DispatchEngine<T, TokioSpawner>
where
    T: Send + 'static,
{
    /// Create an unthrottled engine on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Runtime`] when called outside a tokio runtime.
    pub fn new<H>(handler: H, run_enabled: bool) -> Result<Self, DispatchError>
    where
        H: ItemHandler<T>,
    {
        Self::with_between_time_ms(handler, run_enabled, 0)
    }

    /// Create an engine on the current tokio runtime that waits
    /// `between_ms` after each handler call before the next one.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NegativeBetweenTime`] if `between_ms < 0`
    /// - [`DispatchError::Runtime`] when called outside a tokio runtime
    pub fn with_between_time_ms<H>(
        handler: H,
        run_enabled: bool,
        between_ms: i64,
    ) -> Result<Self, DispatchError>
    where
        H: ItemHandler<T>,
    {
        let between = between_time_from_ms(between_ms)?;
        let spawner = TokioSpawner::try_current()?;
        Ok(Self::with_spawner(spawner, handler, run_enabled, between))
    }
}

impl<T, S> DispatchEngine<T, S>
where
    T: Send + 'static,
    S: Spawn + Clone + Send + Sync + 'static,
{
    /// Create an engine that launches dispatches through `spawner`.
    pub fn with_spawner<H>(spawner: S, handler: H, run_enabled: bool, between: Duration) -> Self
    where
        H: ItemHandler<T>,
    {
        let id = Uuid::new_v4();
        info!(
            engine_id = %id,
            run_enabled,
            between = ?between,
            "dispatch engine created"
        );
        Self {
            shared: Arc::new(Shared {
                id,
                state: Mutex::new(DispatchState {
                    queue: PriorityBucketQueue::new(),
                    run_enabled,
                    in_flight: false,
                    throttle_pending: false,
                    between,
                }),
                handler: Box::new(handler),
                flushed: ManualResetEvent::new(true),
                throttle: DelayTimer::new(spawner.clone()),
                spawner,
                failure_sink: RwLock::new(None),
            }),
        }
    }

    /// Attach a sink that receives every handler failure.
    #[must_use]
    pub fn with_failure_sink(self, sink: Arc<dyn FailureSink>) -> Self {
        self.set_failure_sink(Some(sink));
        self
    }

    /// Replace or remove the failure sink.
    pub fn set_failure_sink(&self, sink: Option<Arc<dyn FailureSink>>) {
        *self.shared.failure_sink.write() = sink;
    }

    /// Identifier used in this engine's log records.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Queue `item` behind everything else.
    pub fn enqueue(&self, item: T) {
        self.shared.admit_direct(item, PriorityBucketQueue::enqueue);
    }

    /// Queue `item` at the end of the `priority` bucket.
    pub fn enqueue_with_priority(&self, item: T, priority: Priority) {
        self.shared
            .admit_direct(item, |queue, item| queue.enqueue_with_priority(item, priority));
    }

    /// Queue `item` ahead of everything else.
    pub fn enqueue_first(&self, item: T) {
        self.shared.admit_direct(item, PriorityBucketQueue::enqueue_first);
    }

    /// Insert `item` at `position` inside the `priority` bucket.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PositionOutOfRange`] when `position` is past
    /// the end of the bucket; nothing is queued in that case.
    pub fn enqueue_at(
        &self,
        item: T,
        priority: Priority,
        position: usize,
    ) -> Result<(), DispatchError> {
        self.shared
            .admit(|queue| queue.enqueue_at(item, priority, position))
    }

    /// Replace every queued item matching `remove` with `item`, keeping the
    /// slot of the earliest match. Appends at the lowest precedence when
    /// nothing matches. Returns the number of replaced items.
    pub fn enqueue_remove<F>(&self, item: T, remove: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.enqueue_remove_with(item, remove, LOWEST_PRECEDENCE, false)
    }

    /// Like [`enqueue_remove`](Self::enqueue_remove) with an explicit
    /// fallback `priority`, optionally moving the replacement to the end of
    /// that bucket instead of keeping the matched slot.
    pub fn enqueue_remove_with<F>(
        &self,
        item: T,
        remove: F,
        priority: Priority,
        dedup_to_end: bool,
    ) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.shared
            .admit(|queue| queue.enqueue_remove_with(item, remove, priority, dedup_to_end))
    }

    /// Enable or disable delivery.
    ///
    /// Enabling an idle engine with queued items starts a dispatch.
    /// Disabling lets a handler call in progress finish and then stops;
    /// queued items stay queued.
    pub fn set_run_process(&self, enabled: bool) {
        let mut state = self.shared.state.lock();
        state.run_enabled = enabled;
        let next = if enabled { state.claim_next() } else { None };
        let count = state.queue.len();
        drop(state);
        debug!(engine_id = %self.shared.id, enabled, count, "run process changed");
        if let Some(next) = next {
            self.shared.launch(next);
        }
    }

    /// Whether delivery is enabled.
    #[must_use]
    pub fn run_process(&self) -> bool {
        self.shared.state.lock().run_enabled
    }

    /// Set the minimum spacing between handler calls, in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NegativeBetweenTime`] if `ms < 0`; the
    /// current setting is kept.
    pub fn set_between_time_ms(&self, ms: i64) -> Result<(), DispatchError> {
        let between = between_time_from_ms(ms)?;
        self.set_between_time(between);
        Ok(())
    }

    /// Set the minimum spacing between handler calls. Takes effect after the
    /// current handler call.
    pub fn set_between_time(&self, between: Duration) {
        self.shared.state.lock().between = between;
    }

    /// Current minimum spacing between handler calls.
    #[must_use]
    pub fn between_time(&self) -> Duration {
        self.shared.state.lock().between
    }

    /// Drop every queued item. A handler call in progress is not interrupted.
    pub fn clear(&self) {
        let mut state = self.shared.state.lock();
        state.queue.clear();
        if !state.in_flight {
            self.shared.flushed.set();
        }
    }

    /// Number of queued items, not counting one being delivered.
    #[must_use]
    pub fn count(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Whether a dispatch sequence is active, including a throttle wait.
    #[must_use]
    pub fn is_dispatching(&self) -> bool {
        self.shared.state.lock().in_flight
    }

    /// Block until the queue is empty and no dispatch is active.
    ///
    /// Deliveries run on the spawner's blocking pool, so this may be called
    /// from a runtime thread. A throttled engine still needs the runtime to
    /// drive its timer between deliveries. Must not be called from this
    /// engine's own handler.
    pub fn wait_for_flush(&self) {
        self.shared.flushed.wait();
    }

    /// Block until flushed or `timeout` elapses. Returns `true` if flushed.
    pub fn wait_for_flush_timeout(&self, timeout: Duration) -> bool {
        self.shared.flushed.wait_timeout(timeout)
    }

    /// Async variant of [`wait_for_flush_timeout`](Self::wait_for_flush_timeout).
    ///
    /// The blocking wait runs on the spawner's blocking pool so the calling
    /// task's worker stays free.
    pub async fn wait_for_flush_async(&self, timeout: Duration) -> bool {
        if self.shared.flushed.is_set() {
            return true;
        }
        let (tx, rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);
        self.shared.spawner.spawn_blocking(move || {
            let _ = tx.send(shared.flushed.wait_timeout(timeout));
        });
        rx.await.unwrap_or(false)
    }

    /// Disable processing, drop queued items, stop the throttle timer, and
    /// release flush waiters. Called on drop.
    pub fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        state.run_enabled = false;
        let dropped = state.queue.len();
        state.queue.clear();
        self.shared.throttle.stop();
        if state.throttle_pending {
            // The parked dispatch will never resume.
            state.throttle_pending = false;
            state.in_flight = false;
        }
        self.shared.flushed.set();
        drop(state);
        info!(engine_id = %self.shared.id, dropped, "dispatch engine shut down");
    }
}

impl<T, S> Drop for DispatchEngine<T, S>
where
    T: Send + 'static,
    S: Spawn + Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}
