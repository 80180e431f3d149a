//! seqpool - ordered parallel task pipeline
//!
//! Runs independent tasks on a fixed pool of worker threads and hands
//! their results to a downstream sink in the order the tasks were
//! submitted, regardless of which worker finishes first.
//!
//! # Quick Start
//!
//! ```no_run
//! use seqpool::prelude::*;
//!
//! let config = Config::builder().num_workers(4).build()?;
//! let mut pipeline = Pipeline::new(
//!     config,
//!     |line: String| line.trim().parse::<i64>(),
//!     |seq: u64, outcome: Outcome<i64>| match outcome {
//!         Ok(n) => println!("{}: {}", seq, n),
//!         Err(e) => eprintln!("{}", e),
//!     },
//! )?;
//!
//! pipeline.submit_batch(vec!["1".to_string(), "x".to_string(), "3".to_string()])?;
//! drop(pipeline.shutdown()?);
//! # Ok::<(), seqpool::Error>(())
//! ```
//!
//! # Building blocks
//!
//! - [`BlockingWorkQueue`]: FIFO with blocking pop and a one-way close
//! - [`OrderedResultSink`]: reorder buffer releasing results by sequence
//! - [`WorkerPool`]: fixed set of threads draining the queue
//! - [`Pipeline`]: numbers submissions and ties the pieces together

#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod pipeline;
pub mod prelude;
pub mod queue;
pub mod sink;
pub mod telemetry;

/// Position of a task in submission order, starting at 0.
pub type Sequence = u64;

pub use config::{Config, ConfigBuilder, FailurePolicy};
pub use error::{Error, Result};
pub use executor::{Outcome, PanicStrategy, Task, TaskError, TaskErrorKind, WorkerPool};
pub use logging::{init_logger, LogFormat, LoggerConfig};
pub use pipeline::Pipeline;
pub use queue::{BlockingWorkQueue, PushError};
pub use sink::{OrderedResultSink, Sink};
pub use telemetry::{Metrics, MetricsSnapshot};
