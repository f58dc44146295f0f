//! Thread-safe sink merging per-worker results into one run-level record.
//! Submissions are atomic with respect to each other; the merged result
//! only exists once every expected worker has reported.

use stampede_core::{summarize, AggregationError, RunResult, WorkerResult, WorkerSummary};
use std::sync::Mutex;
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

pub(crate) struct ResultAggregator {
    expected: usize,
    state: Mutex<State>,
}

enum State {
    Collecting(Vec<WorkerResult>),
    Finalized,
}

impl ResultAggregator {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            state: Mutex::new(State::Collecting(Vec::with_capacity(expected))),
        }
    }

    /// Accept one worker's result. Ownership transfers here; the worker
    /// must not touch the record afterwards. Safe to call concurrently.
    pub fn submit(&self, result: WorkerResult) -> Result<(), AggregationError> {
        let mut state = self.state.lock().expect("aggregator mutex poisoned");
        match &mut *state {
            State::Collecting(results) => {
                trace!(
                    "worker {} reported: {} ok, {} failed",
                    result.worker_id,
                    result.success_count,
                    result.failures.len()
                );
                results.push(result);
                Ok(())
            }
            State::Finalized => Err(AggregationError::SubmitAfterFinalize),
        }
    }

    /// Build the immutable run result. Only valid once all expected
    /// workers have terminated and submitted; anything else is a contract
    /// violation.
    pub fn finalize(
        &self,
        name: &str,
        wall: Duration,
        percentiles: &[f64],
    ) -> Result<RunResult, AggregationError> {
        let mut state = self.state.lock().expect("aggregator mutex poisoned");
        let received = match &*state {
            State::Collecting(results) => results.len(),
            State::Finalized => return Err(AggregationError::AlreadyFinalized),
        };
        if received < self.expected {
            return Err(AggregationError::Incomplete {
                expected: self.expected,
                received,
            });
        }

        let State::Collecting(mut results) = std::mem::replace(&mut *state, State::Finalized)
        else {
            // Checked Collecting above while holding the lock.
            unreachable!()
        };
        drop(state);

        results.sort_by_key(|r| r.worker_id);

        let mut total_success = 0;
        let mut latencies = Vec::new();
        let mut failures = Vec::new();
        let mut per_worker = Vec::with_capacity(results.len());

        for result in results {
            total_success += result.success_count;
            per_worker.push(WorkerSummary {
                worker_id: result.worker_id,
                success_count: result.success_count,
                failure_count: result.failures.len() as u64,
                elapsed: result.elapsed,
            });
            latencies.extend(result.latencies);
            failures.extend(result.failures);
        }

        let summary = summarize(&latencies, percentiles);

        Ok(RunResult {
            name: name.to_string(),
            total_success,
            total_failure: failures.len() as u64,
            wall,
            latencies,
            failures,
            per_worker,
            summary,
        })
    }
}
