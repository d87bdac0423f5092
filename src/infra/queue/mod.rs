//! Queue implementations.

pub mod bucket;

pub use bucket::{Priority, PriorityBucketQueue, HIGHEST_PRECEDENCE, LOWEST_PRECEDENCE};
