//! Configuration models for dispatch engines.

pub mod engine;

pub use engine::{EngineConfig, ENV_BETWEEN_TIME_MS, ENV_RUN_ENABLED};
