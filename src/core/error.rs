//! Error types for queue and dispatch operations.

use thiserror::Error;

use crate::infra::queue::Priority;

/// Errors produced by the queue and the dispatch engine.
///
/// Only argument, configuration, and runtime-availability problems are
/// surfaced this way. Failures raised by item handlers are contained inside
/// the engine and reported through tracing and the failure sink instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Dequeue was attempted on an empty queue.
    #[error("queue is empty")]
    EmptyQueue,
    /// Positional insert beyond the end of the target bucket.
    #[error("position {position} out of range for priority {priority} (bucket length {len})")]
    PositionOutOfRange {
        /// Target bucket.
        priority: Priority,
        /// Requested insert index.
        position: usize,
        /// Bucket length at the time of the call.
        len: usize,
    },
    /// Throttle duration below zero.
    #[error("between time must be non-negative, got {0} ms")]
    NegativeBetweenTime(i64),
    /// Configuration failed validation or parsing.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No async runtime available to run dispatches on.
    #[error("runtime unavailable: {0}")]
    Runtime(String),
}

/// Application-facing result using anyhow; item handlers return this.
pub type AppResult<T> = Result<T, anyhow::Error>;
