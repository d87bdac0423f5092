//! Infrastructure data structures backing the dispatch engine.

pub mod queue;
pub use queue::PriorityBucketQueue;
