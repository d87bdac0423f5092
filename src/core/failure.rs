//! Failure sinks for item handler errors.
//!
//! The engine always reports a failed delivery through `tracing`. A
//! [`FailureSink`] is an optional second destination for callers that want
//! to inspect or forward failures themselves.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::util::clock::now_ms;

/// How a delivery failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The handler returned an error.
    Error,
    /// The handler panicked.
    Panic,
}

/// One failed delivery.
#[derive(Debug, Clone)]
pub struct DispatchFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Error text or panic payload.
    pub error: String,
    /// Human readable context, including the engine id.
    pub message: String,
    /// Timestamp milliseconds.
    pub recorded_at_ms: u128,
}

/// Destination for handler failures.
///
/// Called from the dispatch task after the handler returns, outside the
/// engine lock.
pub trait FailureSink: Send + Sync {
    /// Record a failed delivery.
    fn record(&self, failure: DispatchFailure);
}

/// Bounded in-memory sink for testing and dev.
pub struct InMemoryFailureSink {
    failures: Mutex<VecDeque<DispatchFailure>>,
    max_failures: usize,
}

impl InMemoryFailureSink {
    /// Create a new in-memory sink keeping at most `max_failures` entries.
    #[must_use]
    pub fn new(max_failures: usize) -> Self {
        Self {
            failures: Mutex::new(VecDeque::with_capacity(max_failures)),
            max_failures,
        }
    }

    /// Retrieve a snapshot of stored failures, oldest first.
    #[must_use]
    pub fn failures(&self) -> Vec<DispatchFailure> {
        self.failures.lock().iter().cloned().collect()
    }

    /// Number of stored failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    /// True when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl FailureSink for InMemoryFailureSink {
    fn record(&self, failure: DispatchFailure) {
        let mut failures = self.failures.lock();
        if failures.len() >= self.max_failures {
            failures.pop_front();
        }
        failures.push_back(failure);
    }
}

/// Helper to build a failure record stamped with the current time.
pub fn build_failure(
    kind: FailureKind,
    error: impl Into<String>,
    message: impl Into<String>,
) -> DispatchFailure {
    DispatchFailure {
        kind,
        error: error.into(),
        message: message.into(),
        recorded_at_ms: now_ms(),
    }
}
