use crate::stats::StatisticsSummary;
use serde::Serialize;
use std::time::{Duration, SystemTime};

/// What went wrong for a single failure record.
///
/// Setup-stage failures (`PoolExhausted`, `Connect`) mean the worker never
/// issued a call; `Execution` failures are individual calls that failed
/// inside an otherwise running loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    PoolExhausted,
    Connect,
    Execution,
}

/// One failed attempt (or failed worker setup). Immutable once created and
/// never discarded; every record reaches the final report.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub worker_id: usize,
    /// 1-based call position within the worker's loop; 0 for setup failures.
    pub attempt_index: u64,
    pub kind: FailureKind,
    pub error: String,
    pub at: SystemTime,
}

impl FailureRecord {
    pub fn execution(worker_id: usize, attempt_index: u64, error: impl Into<String>) -> Self {
        Self {
            worker_id,
            attempt_index,
            kind: FailureKind::Execution,
            error: error.into(),
            at: SystemTime::now(),
        }
    }

    pub fn setup(worker_id: usize, kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            worker_id,
            attempt_index: 0,
            kind,
            error: error.into(),
            at: SystemTime::now(),
        }
    }
}

/// Everything one worker measured, owned by the worker until handoff to the
/// aggregator. `latencies` is in execution order and holds exactly one entry
/// per successful call.
#[derive(Debug)]
pub struct WorkerResult {
    pub worker_id: usize,
    pub success_count: u64,
    pub failures: Vec<FailureRecord>,
    pub latencies: Vec<Duration>,
    /// Wall-clock span of the measured window only (release signal to loop
    /// exit), not of the worker's whole lifetime.
    pub elapsed: Duration,
}

impl WorkerResult {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            success_count: 0,
            failures: Vec::new(),
            latencies: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Zero-contribution result for a worker that never reached its loop.
    pub fn setup_failure(worker_id: usize, kind: FailureKind, error: impl Into<String>) -> Self {
        let mut result = Self::new(worker_id);
        result.failures.push(FailureRecord::setup(worker_id, kind, error));
        result
    }

    /// Calls actually issued: successes plus execution failures. Setup
    /// failures never count as attempts.
    pub fn attempts(&self) -> u64 {
        let execution_failures = self
            .failures
            .iter()
            .filter(|f| f.kind == FailureKind::Execution)
            .count() as u64;
        self.success_count + execution_failures
    }
}

/// Per-worker line item on the run result, kept for the throughput-spread
/// section of the report.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerSummary {
    pub worker_id: usize,
    pub success_count: u64,
    pub failure_count: u64,
    pub elapsed: Duration,
}

impl WorkerSummary {
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.success_count as f64 / secs
        } else {
            0.0
        }
    }
}

/// The merged outcome of a whole run, built only after every worker has
/// terminated.
#[derive(Debug, Serialize)]
pub struct RunResult {
    pub name: String,
    pub total_success: u64,
    pub total_failure: u64,
    /// Release signal to last worker completion; the denominator for
    /// throughput (not the sum of per-worker windows).
    pub wall: Duration,
    /// Merged samples across workers. No global ordering is implied.
    #[serde(skip)]
    pub latencies: Vec<Duration>,
    pub failures: Vec<FailureRecord>,
    pub per_worker: Vec<WorkerSummary>,
    pub summary: StatisticsSummary,
}

impl RunResult {
    /// Successful work units per second over the synchronized window.
    pub fn throughput(&self) -> f64 {
        let secs = self.wall.as_secs_f64();
        if secs > 0.0 {
            self.total_success as f64 / secs
        } else {
            0.0
        }
    }
}
