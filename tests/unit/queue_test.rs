//! Tests for PriorityBucketQueue ordering against a flat reference model

use priority_dispatch::{
    DispatchError, Priority, PriorityBucketQueue, HIGHEST_PRECEDENCE, LOWEST_PRECEDENCE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Reference model: `(priority, item)` pairs kept in dequeue order.
#[derive(Default)]
struct Model {
    entries: Vec<(Priority, u32)>,
}

impl Model {
    fn enqueue_with_priority(&mut self, item: u32, priority: Priority) {
        let at = self
            .entries
            .iter()
            .rposition(|(p, _)| *p <= priority)
            .map_or(0, |i| i + 1);
        self.entries.insert(at, (priority, item));
    }

    fn enqueue_first(&mut self, item: u32) {
        self.entries.insert(0, (HIGHEST_PRECEDENCE, item));
    }

    fn enqueue_remove(&mut self, item: u32, remove: impl Fn(&u32) -> bool) -> usize {
        let first = self.entries.iter().position(|(_, queued)| remove(queued));
        let before = self.entries.len();
        let slot = first.map(|i| self.entries[i].0);
        self.entries.retain(|(_, queued)| !remove(queued));
        let removed = before - self.entries.len();
        match (first, slot) {
            (Some(index), Some(priority)) => self.entries.insert(index, (priority, item)),
            _ => self.enqueue_with_priority(item, LOWEST_PRECEDENCE),
        }
        removed
    }

    fn dequeue(&mut self) -> Option<u32> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0).1)
        }
    }

    fn items(&self) -> Vec<u32> {
        self.entries.iter().map(|(_, item)| *item).collect()
    }
}

#[test]
fn test_random_operations_match_model() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut queue = PriorityBucketQueue::new();
    let mut model = Model::default();

    for step in 0..5_000_u32 {
        match rng.random_range(0..10) {
            0..=3 => {
                let priority = rng.random_range(-3..=3);
                queue.enqueue_with_priority(step, priority);
                model.enqueue_with_priority(step, priority);
            }
            4 => {
                queue.enqueue(step);
                model.enqueue_with_priority(step, LOWEST_PRECEDENCE);
            }
            5 => {
                queue.enqueue_first(step);
                model.enqueue_first(step);
            }
            6 => {
                let modulus = rng.random_range(5..40);
                let residue = rng.random_range(0..modulus);
                let remove = move |x: &u32| *x % modulus == residue;
                assert_eq!(
                    queue.enqueue_remove(step, remove),
                    model.enqueue_remove(step, remove),
                    "removed count diverged at step {step}"
                );
            }
            _ => {
                assert_eq!(queue.try_dequeue(), model.dequeue(), "dequeue diverged at step {step}");
            }
        }

        assert_eq!(queue.len(), model.entries.len());
        assert_eq!(queue.is_empty(), model.entries.is_empty());
        assert_eq!(queue.peek().copied(), model.items().first().copied());
    }

    assert_eq!(queue.iter().copied().collect::<Vec<_>>(), model.items());
    let drained: Vec<u32> = std::iter::from_fn(|| queue.try_dequeue()).collect();
    assert_eq!(drained, model.items());
    assert_eq!(queue.dequeue(), Err(DispatchError::EmptyQueue));
}

#[test]
fn test_priority_extremes() {
    let mut queue = PriorityBucketQueue::new();
    queue.enqueue_with_priority("lowest", LOWEST_PRECEDENCE);
    queue.enqueue_with_priority("zero", 0);
    queue.enqueue_with_priority("highest", HIGHEST_PRECEDENCE);
    queue.enqueue_first("first");

    let order: Vec<_> = (&queue).into_iter().copied().collect();
    assert_eq!(order, vec!["first", "highest", "zero", "lowest"]);
}

#[test]
fn test_enqueue_at_positions() {
    let mut queue = PriorityBucketQueue::new();
    queue.enqueue_at('b', 1, 0).unwrap();
    queue.enqueue_at('d', 1, 1).unwrap();
    queue.enqueue_at('c', 1, 1).unwrap();
    queue.enqueue_at('a', 1, 0).unwrap();
    queue.enqueue_at('z', 0, 0).unwrap();

    assert_eq!(
        queue.enqueue_at('x', 1, 5),
        Err(DispatchError::PositionOutOfRange {
            priority: 1,
            position: 5,
            len: 4
        })
    );
    assert_eq!(
        queue.enqueue_at('y', 9, 1),
        Err(DispatchError::PositionOutOfRange {
            priority: 9,
            position: 1,
            len: 0
        })
    );

    assert_eq!(queue.len(), 5);
    assert_eq!(queue.iter().collect::<String>(), "zabcd");
}

#[test]
fn test_enqueue_remove_keeps_lowest_priority_slot() {
    let mut queue = PriorityBucketQueue::new();
    queue.enqueue_with_priority(10, 5);
    queue.enqueue_with_priority(11, 5);
    queue.enqueue_with_priority(20, 2);
    queue.enqueue_with_priority(21, 2);

    // Matches 11 (priority 5) and 21 (priority 2); the slot of 21 wins.
    let removed = queue.enqueue_remove(99, |x| *x % 10 == 1);
    assert_eq!(removed, 2);
    assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![20, 99, 10]);
}

#[test]
fn test_enqueue_remove_with_explicit_fallback() {
    let mut queue = PriorityBucketQueue::new();
    queue.enqueue_with_priority(1, 0);
    queue.enqueue_with_priority(2, 4);

    assert_eq!(queue.enqueue_remove_with(3, |x| *x > 100, 2, false), 0);
    assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![1, 3, 2]);

    assert_eq!(queue.enqueue_remove_with(4, |x| *x == 1, 9, true), 1);
    assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![3, 2, 4]);
}

#[test]
fn test_extend_and_clear() {
    let mut queue = PriorityBucketQueue::default();
    queue.extend([1, 2, 3]);
    assert_eq!(queue.len(), 3);
    assert_eq!(queue.peek(), Some(&1));

    queue.clear();
    assert!(queue.is_empty());
    assert_eq!(queue.peek(), None);
    assert_eq!(queue.try_dequeue(), None);
}
