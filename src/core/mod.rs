//! Dispatch engine, handler contract, and failure reporting.

pub mod engine;
pub mod error;
pub mod failure;
pub mod handler;
pub mod spawn;

pub use engine::{between_time_from_ms, DispatchEngine};
pub use error::{AppResult, DispatchError};
pub use failure::{build_failure, DispatchFailure, FailureKind, FailureSink, InMemoryFailureSink};
pub use handler::ItemHandler;
pub use spawn::Spawn;
