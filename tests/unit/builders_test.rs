//! Tests for building engines from configuration

use priority_dispatch::builders::build_engine;
use priority_dispatch::config::EngineConfig;
use priority_dispatch::core::AppResult;
use priority_dispatch::{DispatchError, Mutex, TokioSpawner};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_build_engine_from_config() {
    let cfg = EngineConfig::from_json_str(r#"{"run_enabled": false, "between_time_ms": 25}"#)
        .unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let engine = build_engine(
        &cfg,
        move |item: &'static str| -> AppResult<()> {
            sink.lock().push(item);
            Ok(())
        },
        TokioSpawner::try_current().unwrap(),
    )
    .unwrap();

    assert!(!engine.run_process());
    assert_eq!(engine.between_time(), Duration::from_millis(25));

    engine.enqueue("b");
    engine.enqueue_first("a");
    engine.set_run_process(true);
    assert!(engine.wait_for_flush_async(Duration::from_secs(2)).await);
    assert_eq!(*seen.lock(), vec!["a", "b"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_build_engine_rejects_invalid_config() {
    let cfg = EngineConfig::new().with_between_time_ms(-5);
    let result = build_engine(
        &cfg,
        |_item: u32| -> AppResult<()> { Ok(()) },
        TokioSpawner::try_current().unwrap(),
    );
    match result {
        Err(DispatchError::InvalidConfig(msg)) => assert!(msg.contains("between_time_ms")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("negative between time accepted"),
    }
}
