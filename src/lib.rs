//! # Priority Dispatch
//!
//! A priority-ordered, rate-limited, single-consumer asynchronous dispatch
//! engine.
//!
//! Producers hand items to a [`DispatchEngine`]; the engine keeps them in a
//! [`PriorityBucketQueue`] and delivers them to one handler, one at a time,
//! on a spawned task. Producers never block on delivery.
//!
//! ## Core Problem Solved
//!
//! Update streams (UI refreshes, device writes, outbound notifications) often
//! need all of the following at once:
//!
//! - **Ordering**: lower priority values first, FIFO within a priority
//! - **A single consumer**: the handler is never called concurrently
//! - **Throttling**: a minimum gap between handler calls
//! - **Coalescing**: a newer update replaces a queued stale one *in place*,
//!   without jumping ahead of or falling behind its original slot
//! - **Drain waits**: block until everything queued has been delivered
//! - **Failure isolation**: a handler error or panic is logged, not fatal
//!
//! ## PriorityBucketQueue
//!
//! ```
//! use priority_dispatch::PriorityBucketQueue;
//!
//! let mut queue = PriorityBucketQueue::new();
//! queue.enqueue(1);
//! queue.enqueue(2);
//! queue.enqueue(3);
//!
//! // Replace-in-place: 4 takes the slot 2 occupied.
//! queue.enqueue_remove(4, |x| *x == 2);
//!
//! let order: Vec<_> = std::iter::from_fn(|| queue.try_dequeue()).collect();
//! assert_eq!(order, vec![1, 4, 3]);
//! ```
//!
//! ## DispatchEngine
//!
//! ```rust,ignore
//! use priority_dispatch::core::{AppResult, DispatchEngine};
//! use std::time::Duration;
//!
//! // Deliver at most one update every 100 ms.
//! let engine = DispatchEngine::with_between_time_ms(
//!     |update: Update| -> AppResult<()> { push_to_device(update) },
//!     true,
//!     100,
//! )?;
//!
//! engine.enqueue_with_priority(update, 5);
//! engine.enqueue_first(reset_command);
//! engine.enqueue_remove(newer, |queued| queued.key == newer_key);
//!
//! assert!(engine.wait_for_flush_async(Duration::from_secs(5)).await);
//! ```
//!
//! For complete examples, see:
//! - `tests/dispatch_engine_test.rs` - engine integration tests
//! - `tests/unit/` - queue and configuration tests

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Dispatch engine, handler contract, errors, and failure reporting.
pub mod core;
/// Configuration models for engines.
pub mod config;
/// Builders to construct engines from configuration.
pub mod builders;
/// Queue data structures.
pub mod infra;
/// Mutual exclusion for engine state.
pub mod mutex;
/// Runtime adapters for launching dispatch steps.
pub mod runtime;
/// Manual-reset signal used as the flush gate.
pub mod signal;
/// Resettable delay timer used for throttling.
pub mod timer;
/// Shared utilities.
pub mod util;

pub use crate::core::{DispatchEngine, DispatchError, ItemHandler};
pub use infra::queue::{Priority, PriorityBucketQueue, HIGHEST_PRECEDENCE, LOWEST_PRECEDENCE};
pub use mutex::{Mutex, MutexGuard};
pub use runtime::TokioSpawner;
pub use signal::ManualResetEvent;
pub use timer::DelayTimer;
