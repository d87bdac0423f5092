//! Tests for utility functions

use priority_dispatch::util::{init_tracing, now_ms, DEFAULT_FILTER};

#[test]
fn test_now_ms() {
    let t1 = now_ms();
    std::thread::sleep(std::time::Duration::from_millis(10));
    let t2 = now_ms();
    assert!(t2 >= t1 + 10);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());
    assert!(DEFAULT_FILTER.starts_with("priority_dispatch"));
}
