use crate::Sequence;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("work queue is closed")]
    QueueClosed,

    #[error("sequence {0} was already submitted")]
    DuplicateSequence(Sequence),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("worker panic: {0}")]
    WorkerPanic(String),

    #[error("result sink is still referenced after the workers were joined")]
    SinkShared,

    #[error("logger error: {0}")]
    Logger(String),

    #[error("metrics export failed: {0}")]
    Export(String),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn logger<S: Into<String>>(msg: S) -> Self {
        Error::Logger(msg.into())
    }

    pub fn export<S: Into<String>>(msg: S) -> Self {
        Error::Export(msg.into())
    }
}
