//! Manual-reset signal.
//!
//! A [`ManualResetEvent`] stays set until explicitly reset, waking every
//! waiter while it is set. The dispatch engine uses one as its flush gate:
//! set while the queue is empty and no dispatch is in flight, reset
//! otherwise.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Set/reset signal with blocking waits.
///
/// Built from a `parking_lot` mutex and condition variable. Unlike an
/// auto-reset event, a single `set` releases all current and future waiters
/// until `reset` is called.
///
/// # Examples
///
/// ```
/// use priority_dispatch::ManualResetEvent;
/// use std::sync::Arc;
/// use std::thread;
/// use std::time::Duration;
///
/// let event = Arc::new(ManualResetEvent::new(false));
/// let setter = Arc::clone(&event);
///
/// thread::spawn(move || setter.set());
///
/// assert!(event.wait_timeout(Duration::from_secs(5)));
/// assert!(event.is_set());
/// ```
#[derive(Debug, Default)]
pub struct ManualResetEvent {
    signaled: Mutex<bool>,
    cvar: Condvar,
}

impl ManualResetEvent {
    /// Create an event in the given initial state.
    #[must_use]
    pub const fn new(initially_set: bool) -> Self {
        Self {
            signaled: Mutex::new(initially_set),
            cvar: Condvar::new(),
        }
    }

    /// Set the event and wake every waiter.
    pub fn set(&self) {
        let mut signaled = self.signaled.lock();
        if !*signaled {
            *signaled = true;
            self.cvar.notify_all();
        }
    }

    /// Clear the event. Subsequent waits block until the next `set`.
    pub fn reset(&self) {
        *self.signaled.lock() = false;
    }

    /// Current state without blocking.
    #[must_use]
    pub fn is_set(&self) -> bool {
        *self.signaled.lock()
    }

    /// Block until the event is set.
    pub fn wait(&self) {
        let mut signaled = self.signaled.lock();
        self.cvar.wait_while(&mut signaled, |s| !*s);
    }

    /// Block until the event is set or `timeout` elapses.
    ///
    /// Returns `true` if the event was set, `false` on timeout. Returns
    /// `true` immediately when already set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut signaled = self.signaled.lock();
        if *signaled {
            return true;
        }
        let _ = self.cvar.wait_while_for(&mut signaled, |s| !*s, timeout);
        *signaled
    }
}
