//! Resettable delay timer.
//!
//! [`DelayTimer`] fires a callback once after a due time, optionally
//! repeating on a fixed period afterwards. Starting it again supersedes the
//! previous arming; stopping or dropping it disarms it. No thread is held
//! while waiting: each arming is a spawned task sleeping through
//! [`Spawn::sleep`].
//!
//! Disarming works by generation: every `start`/`stop` bumps a counter and a
//! pending arming only fires while its generation is still current.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::Spawn;

/// One-shot or periodic delay driven by a [`Spawn`] implementation.
///
/// # Examples
///
/// ```
/// use priority_dispatch::{DelayTimer, ManualResetEvent, TokioSpawner};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "multi_thread", worker_threads = 2)]
/// # async fn main() {
/// let timer = DelayTimer::new(TokioSpawner::try_current().unwrap());
/// let fired = Arc::new(ManualResetEvent::new(false));
/// let signal = Arc::clone(&fired);
///
/// timer.start(Duration::from_millis(5), None, move || signal.set());
/// assert!(fired.wait_timeout(Duration::from_secs(5)));
/// # }
/// ```
#[derive(Debug)]
pub struct DelayTimer<S> {
    spawner: S,
    generation: Arc<AtomicU64>,
    armed: Arc<AtomicU64>,
}

impl<S: Spawn> DelayTimer<S> {
    /// Create a disarmed timer.
    pub fn new(spawner: S) -> Self {
        Self {
            spawner,
            generation: Arc::new(AtomicU64::new(0)),
            armed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Disarm the timer. A tick that already passed its check may still run.
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.armed.store(0, Ordering::Release);
    }

    /// True while an arming is pending or repeating.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire) != 0
    }
}

impl<S> DelayTimer<S>
where
    S: Spawn + Clone + Send + 'static,
{
    /// Arm the timer: run `tick` after `due`, then every `period` if given.
    ///
    /// Replaces any earlier arming that has not fired yet.
    pub fn start<F>(&self, due: Duration, period: Option<Duration>, tick: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.armed.store(generation, Ordering::Release);
        let current = Arc::clone(&self.generation);
        let armed = Arc::clone(&self.armed);
        let spawner = self.spawner.clone();

        self.spawner.spawn(async move {
            spawner.sleep(due).await;
            loop {
                if current.load(Ordering::Acquire) != generation {
                    return;
                }
                let Some(period) = period else {
                    // One-shot: disarm before firing so `tick` may re-arm.
                    let _ = armed.compare_exchange(
                        generation,
                        0,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    );
                    tick();
                    return;
                };
                tick();
                spawner.sleep(period).await;
            }
        });
    }
}

impl<S> Drop for DelayTimer<S> {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.armed.store(0, Ordering::Release);
    }
}
