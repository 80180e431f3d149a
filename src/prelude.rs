pub use crate::config::{Config, ConfigBuilder, FailurePolicy};
pub use crate::error::Error;
pub use crate::executor::{Outcome, PanicStrategy, TaskError, TaskErrorKind};
pub use crate::pipeline::Pipeline;
pub use crate::queue::BlockingWorkQueue;
pub use crate::sink::{OrderedResultSink, Sink};
pub use crate::Sequence;
