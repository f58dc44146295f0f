use std::time::Duration;
use thiserror::Error;

/// A connection could not be established.
#[derive(Debug, Clone, Error)]
#[error("connect failed: {0}")]
pub struct ConnectError(pub String);

impl ConnectError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// A work unit failed on an otherwise healthy connection.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ExecutionError(pub String);

impl ExecutionError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Failure to hand out a pooled connection. Local to one worker; the run
/// continues with that worker contributing a zero result.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("connection pool exhausted after {0:?}")]
    Exhausted(Duration),
    #[error(transparent)]
    Connect(#[from] ConnectError),
}

/// Contract violations around result collection. Always fatal.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("result submitted after the run was finalized")]
    SubmitAfterFinalize,
    #[error("finalize called before all workers reported ({received} of {expected})")]
    Incomplete { expected: usize, received: usize },
    #[error("run already finalized")]
    AlreadyFinalized,
}

/// Errors that abort an entire run. Per-attempt and per-worker failures are
/// recorded on the run result instead and never surface here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("benchmark setup failed: {0}")]
    Setup(#[from] PoolError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error("worker task panicked: {0}")]
    WorkerPanic(String),
}
