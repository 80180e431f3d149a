use super::Sink;
use crate::error::{Error, Result};
use crate::telemetry::Metrics;
use crate::Sequence;
use parking_lot::Mutex;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

enum Slot<R> {
    Ready(R),
    Skipped,
}

struct State<R, S> {
    pending: BTreeMap<Sequence, Slot<R>>,
    next_expected: Sequence,
    downstream: S,
}

impl<R, S: Sink<R>> State<R, S> {
    fn insert(&mut self, sequence: Sequence, slot: Slot<R>) -> Result<()> {
        if sequence < self.next_expected {
            return Err(Error::DuplicateSequence(sequence));
        }
        match self.pending.entry(sequence) {
            Entry::Occupied(_) => Err(Error::DuplicateSequence(sequence)),
            Entry::Vacant(vacant) => {
                vacant.insert(slot);
                Ok(())
            }
        }
    }

    // Release the contiguous run starting at the cursor. The cursor moves
    // past an entry before it is handed downstream, so a panicking sink
    // loses that one result and never sees it twice.
    fn flush(&mut self, metrics: Option<&Metrics>) {
        while let Some(entry) = self.pending.first_entry() {
            if *entry.key() != self.next_expected {
                break;
            }
            let sequence = self.next_expected;
            let slot = entry.remove();
            self.next_expected += 1;

            match slot {
                Slot::Ready(result) => {
                    self.downstream.accept(sequence, result);
                    if let Some(metrics) = metrics {
                        metrics.record_result_emitted();
                    }
                }
                Slot::Skipped => {
                    if let Some(metrics) = metrics {
                        metrics.record_result_skipped();
                    }
                }
            }
        }
    }
}

/// Reorder buffer that releases results strictly by sequence number.
///
/// A result is passed downstream only once every lower sequence has been
/// released or skipped. If a sequence never arrives, nothing beyond it is
/// ever released; [`pending`](Self::pending) keeps growing instead.
pub struct OrderedResultSink<R, S> {
    state: Mutex<State<R, S>>,
    metrics: Option<Arc<Metrics>>,
}

impl<R, S: Sink<R>> OrderedResultSink<R, S> {
    pub fn new(downstream: S) -> Self {
        Self {
            state: Mutex::new(State {
                pending: BTreeMap::new(),
                next_expected: 0,
                downstream,
            }),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Buffer `result` and flush everything that is now in order.
    ///
    /// Returns [`Error::DuplicateSequence`] if `sequence` was already
    /// released, skipped or is still pending.
    pub fn submit(&self, sequence: Sequence, result: R) -> Result<()> {
        self.store(sequence, Slot::Ready(result))
    }

    /// Mark `sequence` as consumed without emitting anything for it.
    pub fn skip(&self, sequence: Sequence) -> Result<()> {
        self.store(sequence, Slot::Skipped)
    }

    fn store(&self, sequence: Sequence, slot: Slot<R>) -> Result<()> {
        let mut state = self.state.lock();
        state.insert(sequence, slot)?;

        if let Some(metrics) = &self.metrics {
            metrics.record_reorder_depth(state.pending.len());
        }
        state.flush(self.metrics.as_deref());
        Ok(())
    }
}

impl<R, S> OrderedResultSink<R, S> {
    /// The sequence the sink is waiting for.
    pub fn next_expected(&self) -> Sequence {
        self.state.lock().next_expected
    }

    /// Number of results held back waiting for a lower sequence.
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn with_downstream<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut S) -> T,
    {
        f(&mut self.state.lock().downstream)
    }

    /// Consume the sink and return the downstream. Results still waiting
    /// on a missing sequence are dropped.
    pub fn into_downstream(self) -> S {
        let state = self.state.into_inner();
        if !state.pending.is_empty() {
            tracing::warn!(
                next_expected = state.next_expected,
                stranded = state.pending.len(),
                "ordered sink dropped with results waiting on a missing sequence"
            );
        }
        state.downstream
    }
}

impl<R, S> fmt::Debug for OrderedResultSink<R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("OrderedResultSink")
            .field("next_expected", &state.next_expected)
            .field("pending", &state.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::thread_rng;
    use std::thread;

    #[test]
    fn test_in_order_submission_flushes_immediately() {
        let sink = OrderedResultSink::new(Vec::new());
        for i in 0..4u64 {
            sink.submit(i, i * 10).unwrap();
            assert_eq!(sink.pending(), 0);
        }
        assert_eq!(sink.into_downstream(), vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_out_of_order_completion() {
        let sink = OrderedResultSink::new(Vec::new());

        sink.submit(2, "two").unwrap();
        assert!(sink.with_downstream(|out| out.is_empty()));
        sink.submit(0, "zero").unwrap();
        assert_eq!(sink.with_downstream(|out| out.clone()), vec!["zero"]);
        sink.submit(3, "three").unwrap();
        assert_eq!(sink.pending(), 2);
        sink.submit(1, "one").unwrap();

        assert_eq!(sink.next_expected(), 4);
        assert_eq!(sink.into_downstream(), vec!["zero", "one", "two", "three"]);
    }

    #[test]
    fn test_missing_sequence_stalls_later_results() {
        let sink = OrderedResultSink::new(Vec::new());

        sink.submit(0, 'a').unwrap();
        sink.submit(2, 'c').unwrap();
        sink.submit(3, 'd').unwrap();

        assert_eq!(sink.next_expected(), 1);
        assert_eq!(sink.pending(), 2);
        assert_eq!(sink.into_downstream(), vec!['a']);
    }

    #[test]
    fn test_skip_advances_cursor() {
        let sink = OrderedResultSink::new(Vec::new());

        sink.submit(0, 'a').unwrap();
        sink.submit(2, 'c').unwrap();
        sink.skip(1).unwrap();
        sink.submit(3, 'd').unwrap();

        assert_eq!(sink.next_expected(), 4);
        assert_eq!(sink.into_downstream(), vec!['a', 'c', 'd']);
    }

    #[test]
    fn test_duplicate_sequence_rejected() {
        let sink = OrderedResultSink::new(Vec::new());

        sink.submit(0, 1).unwrap();
        assert!(matches!(sink.submit(0, 2), Err(Error::DuplicateSequence(0))));

        sink.submit(5, 5).unwrap();
        assert!(matches!(sink.submit(5, 6), Err(Error::DuplicateSequence(5))));
        assert!(matches!(sink.skip(5), Err(Error::DuplicateSequence(5))));

        assert_eq!(sink.into_downstream(), vec![1]);
    }

    #[test]
    fn test_sequence_passed_to_downstream() {
        let mut seen = Vec::new();
        {
            let sink = OrderedResultSink::new(|seq: Sequence, item: char| seen.push((seq, item)));
            sink.submit(1, 'b').unwrap();
            sink.submit(0, 'a').unwrap();
        }
        assert_eq!(seen, vec![(0, 'a'), (1, 'b')]);
    }

    #[test]
    fn test_shuffled_submission_emits_in_order() {
        let mut rng = thread_rng();
        for n in [1usize, 2, 17, 500] {
            let mut order: Vec<u64> = (0..n as u64).collect();
            order.shuffle(&mut rng);

            let sink = OrderedResultSink::new(Vec::new());
            for seq in order {
                sink.submit(seq, seq).unwrap();
            }
            assert_eq!(sink.into_downstream(), (0..n as u64).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_concurrent_submitters() {
        const THREADS: u64 = 8;
        const PER_THREAD: u64 = 500;

        let sink = Arc::new(OrderedResultSink::new(Vec::new()));

        thread::scope(|s| {
            for t in 0..THREADS {
                let sink = sink.clone();
                s.spawn(move || {
                    // interleave sequences across threads so completions race
                    let mut mine: Vec<u64> = (0..PER_THREAD).map(|i| i * THREADS + t).collect();
                    mine.shuffle(&mut thread_rng());
                    for seq in mine {
                        sink.submit(seq, seq).unwrap();
                    }
                });
            }
        });

        let sink = Arc::try_unwrap(sink).unwrap();
        assert_eq!(sink.pending(), 0);
        assert_eq!(
            sink.into_downstream(),
            (0..THREADS * PER_THREAD).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_panicking_downstream_does_not_wedge_cursor() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let sink = OrderedResultSink::new(|seq: Sequence, item: u64| {
            if seq == 1 {
                panic!("downstream rejected {}", item);
            }
        });

        sink.submit(0, 0).unwrap();
        let caught = catch_unwind(AssertUnwindSafe(|| sink.submit(1, 1)));
        assert!(caught.is_err());
        assert_eq!(sink.next_expected(), 2);

        sink.submit(3, 3).unwrap();
        sink.submit(2, 2).unwrap();
        assert_eq!(sink.next_expected(), 4);
        assert_eq!(sink.pending(), 0);

        // the lost sequence stays consumed
        assert!(matches!(sink.submit(1, 1), Err(Error::DuplicateSequence(1))));
    }

    #[test]
    fn test_panicking_downstream_emits_each_sequence_once() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            OrderedResultSink::new(move |seq: Sequence, _item: ()| {
                seen.lock().push(seq);
                if seq == 2 {
                    panic!("flaky downstream");
                }
            })
        };

        sink.submit(1, ()).unwrap();
        sink.submit(3, ()).unwrap();
        sink.submit(2, ()).unwrap();
        // 0 releases 1 and 2, then the downstream panics before 3
        assert!(catch_unwind(AssertUnwindSafe(|| sink.submit(0, ()))).is_err());
        assert_eq!(sink.next_expected(), 3);
        assert_eq!(sink.pending(), 1);

        // 3 stayed buffered and goes out with the next submission
        sink.submit(4, ()).unwrap();
        assert_eq!(sink.next_expected(), 5);
        assert_eq!(*seen.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_metrics_track_emission_and_depth() {
        let metrics = Arc::new(Metrics::new());
        let sink = OrderedResultSink::new(Vec::new()).with_metrics(metrics.clone());

        sink.submit(2, ()).unwrap();
        sink.submit(1, ()).unwrap();
        sink.skip(0).unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.results_emitted, 2);
        assert_eq!(snapshot.results_skipped, 1);
        assert_eq!(snapshot.max_reorder_depth, 3);
    }
}
