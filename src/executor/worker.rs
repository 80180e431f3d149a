// worker thread stuff
use super::panic_handler::PanicHandler;
use super::task::{Outcome, Task, TaskError, TaskFn};
use crate::config::FailurePolicy;
use crate::queue::BlockingWorkQueue;
use crate::sink::{OrderedResultSink, Sink};
use crate::telemetry::Metrics;
use std::sync::Arc;
use std::time::Instant;

pub type WorkerId = usize;

pub(crate) struct Worker<P, O, S> {
    pub id: WorkerId,
    queue: Arc<BlockingWorkQueue<Task<P>>>,
    sink: Arc<OrderedResultSink<Outcome<O>, S>>,
    task_fn: TaskFn<P, O>,
    failure_policy: FailurePolicy,
    panic_handler: PanicHandler,
    metrics: Arc<Metrics>,
}

impl<P, O, S> Worker<P, O, S>
where
    S: Sink<Outcome<O>>,
{
    pub fn new(
        id: WorkerId,
        queue: Arc<BlockingWorkQueue<Task<P>>>,
        sink: Arc<OrderedResultSink<Outcome<O>, S>>,
        task_fn: TaskFn<P, O>,
        failure_policy: FailurePolicy,
        panic_handler: PanicHandler,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            id,
            queue,
            sink,
            task_fn,
            failure_policy,
            panic_handler,
            metrics,
        }
    }

    // main loop; returns once the queue is closed and drained
    pub fn run(self) {
        tracing::debug!(worker = self.id, "worker started");

        let mut executed = 0u64;
        while let Some(task) = self.queue.pop() {
            self.process(task);
            executed += 1;
        }

        tracing::debug!(worker = self.id, executed, "worker stopped");
    }

    fn process(&self, task: Task<P>) {
        let Task { sequence, payload } = task;
        let task_fn = &self.task_fn;
        let start = Instant::now();

        let outcome = match self.panic_handler.execute(|| task_fn(payload)) {
            Ok(Ok(output)) => {
                self.metrics
                    .record_task_completed(start.elapsed().as_nanos() as u64);
                Ok(output)
            }
            Ok(Err(message)) => {
                tracing::warn!(worker = self.id, sequence, error = %message, "task failed");
                self.metrics.record_task_failed();
                Err(TaskError::failed(sequence, message))
            }
            Err(panic) => {
                tracing::warn!(worker = self.id, sequence, error = %panic.message, "task panicked");
                self.metrics.record_task_panic();
                Err(TaskError::panicked(sequence, panic.message))
            }
        };

        let delivered = match (outcome, self.failure_policy) {
            (Err(_), FailurePolicy::Skip) => self.sink.skip(sequence),
            (outcome, _) => self.sink.submit(sequence, outcome),
        };

        if let Err(e) = delivered {
            tracing::error!(worker = self.id, sequence, error = %e, "result rejected by ordered sink");
        }
    }
}
