use super::panic_handler::PanicHandler;
use super::task::{Outcome, Task, TaskFn};
use super::worker::{Worker, WorkerId};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::queue::BlockingWorkQueue;
use crate::sink::{OrderedResultSink, Sink};
use crate::telemetry::Metrics;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Fixed set of worker threads draining one [`BlockingWorkQueue`].
///
/// Workers stop once the queue is closed and empty, so every task pushed
/// before [`shutdown`](Self::shutdown) is processed.
pub struct WorkerPool<P> {
    workers: Vec<WorkerHandle>,
    queue: Arc<BlockingWorkQueue<Task<P>>>,
    num_threads: usize,
}

struct WorkerHandle {
    id: WorkerId,
    thread: Option<JoinHandle<()>>,
}

impl<P: Send + 'static> WorkerPool<P> {
    pub(crate) fn new<O, S>(
        config: &Config,
        queue: Arc<BlockingWorkQueue<Task<P>>>,
        sink: Arc<OrderedResultSink<Outcome<O>, S>>,
        task_fn: TaskFn<P, O>,
        metrics: Arc<Metrics>,
    ) -> Result<Self>
    where
        O: Send + 'static,
        S: Sink<Outcome<O>> + Send + 'static,
    {
        let num_threads = config.worker_threads();
        if num_threads == 0 {
            return Err(Error::config("need at least 1 thread"));
        }

        let mut pool = Self {
            workers: Vec::with_capacity(num_threads),
            queue: queue.clone(),
            num_threads,
        };

        for id in 0..num_threads {
            let worker = Worker::new(
                id,
                queue.clone(),
                sink.clone(),
                task_fn.clone(),
                config.failure_policy,
                PanicHandler::new(config.panic_strategy),
                metrics.clone(),
            );
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);

            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            // on failure `pool` is dropped, which closes the queue and joins
            // the workers spawned so far
            let thread = builder.spawn(move || worker.run()).map_err(|e| {
                tracing::error!(worker = id, error = %e, "failed to spawn worker thread");
                Error::Spawn(e)
            })?;

            pool.workers.push(WorkerHandle {
                id,
                thread: Some(thread),
            });
        }

        tracing::debug!(workers = num_threads, "worker pool started");
        Ok(pool)
    }

    /// Close the queue and join every worker.
    ///
    /// All workers are joined even if some of them panicked; the first
    /// panic is reported.
    pub fn shutdown(&mut self) -> Result<()> {
        self.queue.close();

        let mut first_panic = None;
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    tracing::error!(worker = worker.id, "worker thread panicked");
                    first_panic.get_or_insert(worker.id);
                }
            }
        }

        match first_panic {
            Some(id) => Err(Error::WorkerPanic(format!("worker {} terminated abnormally", id))),
            None => Ok(()),
        }
    }
}

impl<P> WorkerPool<P> {
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}

impl<P> fmt::Debug for WorkerPool<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_threads", &self.num_threads)
            .field("queue", &self.queue)
            .finish()
    }
}

impl<P> Drop for WorkerPool<P> {
    fn drop(&mut self) {
        self.queue.close();

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                let _ = thread.join();
            }
        }
    }
}
