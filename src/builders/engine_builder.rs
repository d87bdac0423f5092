//! Builders to construct dispatch engines from configuration.

use crate::config::EngineConfig;
use crate::core::{DispatchEngine, DispatchError, ItemHandler, Spawn};

/// Build an engine from validated configuration.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidConfig`] when the configuration fails
/// validation.
pub fn build_engine<T, H, S>(
    cfg: &EngineConfig,
    handler: H,
    spawner: S,
) -> Result<DispatchEngine<T, S>, DispatchError>
where
    T: Send + 'static,
    H: ItemHandler<T>,
    S: Spawn + Clone + Send + Sync + 'static,
{
    cfg.validate()
        .map_err(|e| DispatchError::InvalidConfig(format!("engine config invalid: {e}")))?;
    let between = cfg.between_time()?;
    Ok(DispatchEngine::with_spawner(
        spawner,
        handler,
        cfg.run_enabled,
        between,
    ))
}
