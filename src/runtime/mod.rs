//! Runtime adapters for launching dispatch steps.

pub mod tokio_spawner;

pub use tokio_spawner::TokioSpawner;
