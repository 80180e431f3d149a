use proptest::prelude::*;
use seqpool::BlockingWorkQueue;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

#[test]
fn test_close_with_two_pending_items() {
    let queue = BlockingWorkQueue::new();
    queue.push(1).unwrap();
    queue.push(2).unwrap();
    queue.close();

    assert_eq!(queue.pop(), Some(1));
    assert_eq!(queue.pop(), Some(2));
    assert_eq!(queue.pop(), None);
}

#[test]
fn test_push_after_close_fails_loudly() {
    let queue = BlockingWorkQueue::new();
    queue.close();
    let err = queue.push("late").unwrap_err();
    assert_eq!(err.to_string(), "push on a closed work queue");
    assert_eq!(err.into_inner(), "late");
}

fn run_mpmc(producers: usize, consumers: usize, per_producer: usize) -> HashMap<(usize, usize), usize> {
    let queue = Arc::new(BlockingWorkQueue::new());

    let consumer_handles: Vec<_> = (0..consumers)
        .map(|_| {
            let queue = queue.clone();
            thread::spawn(move || {
                let mut popped = Vec::new();
                while let Some(tag) = queue.pop() {
                    popped.push(tag);
                }
                popped
            })
        })
        .collect();

    let producer_handles: Vec<_> = (0..producers)
        .map(|p| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..per_producer {
                    queue.push((p, i)).unwrap();
                }
            })
        })
        .collect();

    for handle in producer_handles {
        handle.join().unwrap();
    }
    queue.close();

    let mut counts = HashMap::new();
    for handle in consumer_handles {
        for tag in handle.join().unwrap() {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    counts
}

#[test]
fn test_every_item_popped_exactly_once() {
    let counts = run_mpmc(4, 4, 5_000);
    assert_eq!(counts.len(), 20_000);
    assert!(counts.values().all(|&c| c == 1));
}

#[test]
fn test_per_producer_fifo_with_single_consumer() {
    let queue = Arc::new(BlockingWorkQueue::new());
    let producers: Vec<_> = (0..3)
        .map(|p| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..1_000 {
                    queue.push((p, i)).unwrap();
                }
            })
        })
        .collect();
    for handle in producers {
        handle.join().unwrap();
    }
    queue.close();

    let mut last = [None; 3];
    while let Some((p, i)) = queue.pop() {
        if let Some(prev) = last[p] {
            assert!(i > prev);
        }
        last[p] = Some(i);
    }
    assert_eq!(last, [Some(999); 3]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_mpmc_no_loss_no_duplication(producers in 1usize..5, consumers in 1usize..5, per_producer in 0usize..300) {
        let counts = run_mpmc(producers, consumers, per_producer);
        prop_assert_eq!(counts.len(), producers * per_producer);
        prop_assert!(counts.values().all(|&c| c == 1));
    }
}
