//! Task and outcome representation.

use crate::Sequence;
use std::fmt;
use std::sync::Arc;

/// A payload tagged with its submission sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task<P> {
    pub sequence: Sequence,
    pub payload: P,
}

impl<P> Task<P> {
    pub fn new(sequence: Sequence, payload: P) -> Self {
        Self { sequence, payload }
    }
}

/// Why a task produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskErrorKind {
    /// The task function returned an error.
    Failed,
    /// The task function panicked.
    Panicked,
}

impl fmt::Display for TaskErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskErrorKind::Failed => f.write_str("failed"),
            TaskErrorKind::Panicked => f.write_str("panicked"),
        }
    }
}

/// Error result delivered downstream in place of a failed task's output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("task {sequence} {kind}: {message}")]
pub struct TaskError {
    pub sequence: Sequence,
    pub kind: TaskErrorKind,
    pub message: String,
}

impl TaskError {
    pub fn failed<S: Into<String>>(sequence: Sequence, message: S) -> Self {
        Self {
            sequence,
            kind: TaskErrorKind::Failed,
            message: message.into(),
        }
    }

    pub fn panicked<S: Into<String>>(sequence: Sequence, message: S) -> Self {
        Self {
            sequence,
            kind: TaskErrorKind::Panicked,
            message: message.into(),
        }
    }
}

/// What the downstream sink receives for each sequence.
pub type Outcome<O> = std::result::Result<O, TaskError>;

/// Type-erased task function shared by all workers; errors are already
/// rendered to their display text.
pub(crate) type TaskFn<P, O> = Arc<dyn Fn(P) -> std::result::Result<O, String> + Send + Sync>;
