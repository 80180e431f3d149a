//! Task execution infrastructure.
//!
//! This module provides the worker threads that drain the work queue, the
//! fixed-size pool that owns them, and the task and outcome types they
//! exchange with the ordered result sink.

pub mod panic_handler;
pub mod pool;
pub mod task;
pub mod worker;

pub use panic_handler::{PanicHandler, PanicInfo, PanicStrategy};
pub use pool::WorkerPool;
pub use task::{Outcome, Task, TaskError, TaskErrorKind};

pub(crate) use task::TaskFn;
