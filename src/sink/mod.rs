//! Order-restoring result buffer.
//!
//! Results arrive from workers in completion order; [`OrderedResultSink`]
//! holds them until every lower sequence has been released and then hands
//! them to a downstream [`Sink`] one at a time.

mod downstream;
mod ordered;

pub use downstream::Sink;
pub use ordered::OrderedResultSink;
