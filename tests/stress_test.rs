//! Stress tests for the ordered pipeline

use seqpool::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
#[ignore] // Run with --ignored flag
fn stress_test_many_small_tasks() {
    let config = Config::builder().num_workers(8).build().unwrap();
    let mut pipeline = Pipeline::new(config, |n: u64| Ok::<_, String>(n ^ 0x5555), Vec::new()).unwrap();

    pipeline.submit_batch(0..1_000_000).unwrap();
    let out = pipeline.shutdown().unwrap();

    assert_eq!(out.len(), 1_000_000);
    for (i, outcome) in out.into_iter().enumerate() {
        assert_eq!(outcome, Ok(i as u64 ^ 0x5555));
    }
}

#[test]
#[ignore]
fn stress_test_repeated_start_shutdown() {
    for round in 0..50 {
        let config = Config::builder().num_workers(4).build().unwrap();
        let mut pipeline = Pipeline::new(config, |n: u32| Ok::<_, String>(n), Vec::new()).unwrap();

        pipeline.submit_batch(0..100).unwrap();
        let out = pipeline.shutdown().unwrap();
        assert_eq!(out.len(), 100, "Round {}", round);
    }
}

#[test]
#[ignore]
fn stress_test_mixed_failures() {
    let config = Config::builder()
        .num_workers(6)
        .panic_strategy(PanicStrategy::Isolate)
        .build()
        .unwrap();

    let mut pipeline = Pipeline::new(
        config,
        |n: u64| match n % 7 {
            0 => Err(format!("rejected {}", n)),
            3 => panic!("panicked {}", n),
            _ => Ok(n),
        },
        Vec::new(),
    )
    .unwrap();

    pipeline.submit_batch(0..70_000).unwrap();
    let out = pipeline.shutdown().unwrap();

    assert_eq!(out.len(), 70_000);
    let failures = out.iter().filter(|o| o.is_err()).count();
    assert_eq!(failures, 20_000);
}

#[test]
#[ignore]
fn stress_test_high_contention_sink() {
    let emitted = Arc::new(AtomicU64::new(0));
    let sink = {
        let emitted = emitted.clone();
        move |seq: Sequence, _outcome: Outcome<()>| {
            // any gap or repeat breaks the running count
            assert_eq!(emitted.fetch_add(1, Ordering::SeqCst), seq);
        }
    };

    let config = Config::builder().num_workers(16).build().unwrap();
    let mut pipeline = Pipeline::new(
        config,
        |n: u64| {
            if n % 1_000 == 0 {
                thread::yield_now();
            }
            Ok::<_, String>(())
        },
        sink,
    )
    .unwrap();

    pipeline.submit_batch(0..200_000).unwrap();
    drop(pipeline.shutdown().unwrap());

    assert_eq!(emitted.load(Ordering::SeqCst), 200_000);
}
