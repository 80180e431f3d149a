use crate::error::{Error, Result};
use crate::executor::PanicStrategy;

/// What a worker does with a task whose function failed or panicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Forward an `Err(TaskError)` downstream in the failed task's slot.
    #[default]
    EmitError,

    /// Emit nothing for the failed sequence and let later results through.
    Skip,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub num_workers: Option<usize>,
    /// Threads left free for the submitting and coordinating threads when
    /// sizing from hardware parallelism.
    pub reserved_threads: usize,
    pub thread_name_prefix: String,
    pub stack_size: Option<usize>,
    pub failure_policy: FailurePolicy,
    pub panic_strategy: PanicStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_workers: None,
            reserved_threads: 2,
            thread_name_prefix: "seqpool-worker".to_string(),
            stack_size: None,
            failure_policy: FailurePolicy::default(),
            panic_strategy: PanicStrategy::default(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.num_workers {
            if n == 0 {
                return Err(Error::config("num_workers must be > 0"));
            }
            if n > 1024 {
                return Err(Error::config("num_workers too large (max 1024)"));
            }
        }

        if self.thread_name_prefix.is_empty() {
            return Err(Error::config("thread_name_prefix must not be empty"));
        }

        Ok(())
    }

    pub fn worker_threads(&self) -> usize {
        self.num_workers
            .unwrap_or_else(|| default_worker_count(num_cpus::get(), self.reserved_threads))
    }
}

/// Hardware parallelism minus the reserve, never below one worker.
pub fn default_worker_count(available: usize, reserved: usize) -> usize {
    available.saturating_sub(reserved).max(1)
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.config.num_workers = Some(n);
        self
    }

    pub fn reserved_threads(mut self, n: usize) -> Self {
        self.config.reserved_threads = n;
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn panic_strategy(mut self, strategy: PanicStrategy) -> Self {
        self.config.panic_strategy = strategy;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
