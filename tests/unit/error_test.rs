//! Tests for dispatch error display and propagation

use priority_dispatch::core::AppResult;
use priority_dispatch::{DispatchError, PriorityBucketQueue};

#[test]
fn test_error_display() {
    assert_eq!(DispatchError::EmptyQueue.to_string(), "queue is empty");
    assert_eq!(
        DispatchError::NegativeBetweenTime(-20).to_string(),
        "between time must be non-negative, got -20 ms"
    );
    assert_eq!(
        DispatchError::InvalidConfig("bad".into()).to_string(),
        "invalid configuration: bad"
    );
    assert_eq!(
        DispatchError::PositionOutOfRange {
            priority: 4,
            position: 9,
            len: 2
        }
        .to_string(),
        "position 9 out of range for priority 4 (bucket length 2)"
    );
}

#[test]
fn test_dispatch_error_converts_into_app_result() {
    fn drain_one(queue: &mut PriorityBucketQueue<u8>) -> AppResult<u8> {
        Ok(queue.dequeue()?)
    }

    let mut queue = PriorityBucketQueue::new();
    let err = drain_one(&mut queue).unwrap_err();
    assert_eq!(
        err.downcast_ref::<DispatchError>(),
        Some(&DispatchError::EmptyQueue)
    );

    queue.enqueue(7);
    assert_eq!(drain_one(&mut queue).unwrap(), 7);
}
