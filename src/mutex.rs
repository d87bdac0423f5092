//! Mutual exclusion for engine state.
//!
//! Every [`DispatchEngine`](crate::core::DispatchEngine) owns exactly one of
//! these locks. It guards the queue, the run and in-flight flags, and the
//! throttle duration. Entering is [`Mutex::lock`], leaving is dropping the
//! guard, and try-enter is [`Mutex::try_lock`].
//!
//! The lock is `parking_lot`'s: no poisoning, so a panicking item handler
//! cannot wedge an engine, and no allocation per lock.
//!
//! # Examples
//!
//! ```
//! use priority_dispatch::Mutex;
//! use priority_dispatch::infra::PriorityBucketQueue;
//!
//! let queue = Mutex::new(PriorityBucketQueue::new());
//! queue.lock().enqueue_with_priority("b", 2);
//! queue.lock().enqueue_with_priority("a", 1);
//! assert_eq!(queue.lock().try_dequeue(), Some("a"));
//! ```

pub use parking_lot::{Mutex, MutexGuard};
