//! Ordered parallel pipeline.
//!
//! [`Pipeline`] owns a [`WorkerPool`], the shared work queue and the
//! ordered result sink. Payloads are numbered as they are submitted;
//! the downstream [`Sink`] sees their outcomes in exactly that order no
//! matter which worker finishes first.
//!
//! ```no_run
//! use seqpool::prelude::*;
//!
//! let mut pipeline = Pipeline::new(
//!     Config::default(),
//!     |n: u64| Ok::<_, String>(n * n),
//!     Vec::new(),
//! )?;
//! pipeline.submit_batch(0..100)?;
//! let squares: Vec<Outcome<u64>> = pipeline.shutdown()?;
//! assert_eq!(squares.len(), 100);
//! # Ok::<(), seqpool::Error>(())
//! ```

use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::{Outcome, Task, TaskFn, WorkerPool};
use crate::queue::BlockingWorkQueue;
use crate::sink::{OrderedResultSink, Sink};
use crate::telemetry::{Metrics, MetricsSnapshot};
use crate::Sequence;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

pub struct Pipeline<P, O, S> {
    queue: Arc<BlockingWorkQueue<Task<P>>>,
    sink: Arc<OrderedResultSink<Outcome<O>, S>>,
    pool: WorkerPool<P>,
    metrics: Arc<Metrics>,
    next_sequence: Sequence,
    config: Config,
}

impl<P, O, S> Pipeline<P, O, S>
where
    P: Send + 'static,
    O: Send + 'static,
    S: Sink<Outcome<O>> + Send + 'static,
{
    /// Validate `config`, start the workers and return a pipeline ready to
    /// accept tasks.
    ///
    /// Errors returned by `task_fn` and panics inside it are caught per
    /// task and handled according to `config.failure_policy`.
    pub fn new<F, E>(config: Config, task_fn: F, downstream: S) -> Result<Self>
    where
        F: Fn(P) -> std::result::Result<O, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        config.validate()?;

        let metrics = Arc::new(Metrics::new());
        let queue = Arc::new(BlockingWorkQueue::new());
        let sink = Arc::new(OrderedResultSink::new(downstream).with_metrics(metrics.clone()));
        let task_fn: TaskFn<P, O> =
            Arc::new(move |payload| task_fn(payload).map_err(|e| e.to_string()));

        let pool = WorkerPool::new(&config, queue.clone(), sink.clone(), task_fn, metrics.clone())?;

        tracing::info!(
            workers = pool.num_threads(),
            failure_policy = ?config.failure_policy,
            "pipeline started"
        );

        Ok(Self {
            queue,
            sink,
            pool,
            metrics,
            next_sequence: 0,
            config,
        })
    }

    /// Enqueue one payload and return the sequence number assigned to it.
    pub fn submit(&mut self, payload: P) -> Result<Sequence> {
        let sequence = self.next_sequence;
        self.queue
            .push(Task::new(sequence, payload))
            .map_err(|_| Error::QueueClosed)?;

        self.next_sequence += 1;
        self.metrics.record_task_submitted();
        Ok(sequence)
    }

    /// Enqueue payloads in iteration order and return the range of
    /// sequence numbers assigned to them.
    pub fn submit_batch<I>(&mut self, payloads: I) -> Result<Range<Sequence>>
    where
        I: IntoIterator<Item = P>,
    {
        let start = self.next_sequence;
        for payload in payloads {
            self.submit(payload)?;
        }

        tracing::debug!(first = start, count = self.next_sequence - start, "batch enqueued");
        Ok(start..self.next_sequence)
    }

    /// Close the queue, wait for every submitted task to be processed and
    /// return the downstream sink.
    pub fn shutdown(self) -> Result<S> {
        let Pipeline {
            mut pool,
            sink,
            metrics,
            next_sequence,
            ..
        } = self;

        pool.shutdown()?;
        drop(pool);

        let snapshot = metrics.snapshot();
        tracing::info!(
            submitted = next_sequence,
            completed = snapshot.tasks_completed,
            failed = snapshot.tasks_failed + snapshot.tasks_panicked,
            emitted = snapshot.results_emitted,
            "pipeline shut down"
        );

        // every worker has been joined, so this is the last reference
        let sink = Arc::try_unwrap(sink).map_err(|_| Error::SinkShared)?;
        Ok(sink.into_downstream())
    }
}

impl<P, O, S> Pipeline<P, O, S> {
    pub fn num_workers(&self) -> usize {
        self.pool.num_threads()
    }

    /// Number of tasks submitted so far.
    pub fn submitted(&self) -> Sequence {
        self.next_sequence
    }

    /// The next sequence the downstream sink is waiting for.
    pub fn next_expected(&self) -> Sequence {
        self.sink.next_expected()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn with_downstream<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut S) -> T,
    {
        self.sink.with_downstream(f)
    }
}

impl<P, O, S> fmt::Debug for Pipeline<P, O, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("pool", &self.pool)
            .field("sink", &self.sink)
            .field("next_sequence", &self.next_sequence)
            .finish()
    }
}
