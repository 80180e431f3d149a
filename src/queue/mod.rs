//! Shutdown-aware blocking work queue.
//!
//! Workers block in [`BlockingWorkQueue::pop`] until an item arrives or the
//! queue is closed and drained; `None` is their only exit signal.

mod blocking;

pub use blocking::{BlockingWorkQueue, PushError};
