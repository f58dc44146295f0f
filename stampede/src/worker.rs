//! One worker: acquire a connection, rendezvous at the start line, then
//! drive the work unit in a tight loop until the iteration budget, the
//! deadline, or a stop request ends it. A failed call never ends the loop;
//! a failed setup degrades this worker to a zero result without touching
//! the rest of the run.

use crate::aggregator::ResultAggregator;
use crate::connector::{Connector, WorkUnit};
use crate::pool::ConnectionPool;
use crate::rendezvous::RendezvousHandle;
use stampede_core::{FailureKind, FailureRecord, PoolError, RunMode, WorkerResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

pub(crate) struct WorkerContext<C: Connector, W> {
    pub worker_id: usize,
    pub pool: Arc<ConnectionPool<C>>,
    pub work: Arc<W>,
    pub rendezvous: RendezvousHandle,
    pub aggregator: Arc<ResultAggregator>,
    pub mode: RunMode,
    pub warmup: bool,
    pub think_time: Option<Duration>,
    pub stop: watch::Receiver<bool>,
}

#[instrument(name = "worker", skip_all, fields(id = ctx.worker_id))]
pub(crate) async fn run<C, W>(ctx: WorkerContext<C, W>)
where
    C: Connector,
    W: WorkUnit<C::Connection>,
{
    let WorkerContext {
        worker_id,
        pool,
        work,
        rendezvous,
        aggregator,
        mode,
        warmup,
        think_time,
        stop,
    } = ctx;

    let mut conn = match pool.acquire().await {
        Ok(conn) => conn,
        Err(err) => {
            warn!("setup failed, contributing zero attempts: {err}");
            let kind = match &err {
                PoolError::Exhausted(_) => FailureKind::PoolExhausted,
                PoolError::Connect(_) => FailureKind::Connect,
            };
            rendezvous.withdraw();
            submit(&aggregator, WorkerResult::setup_failure(worker_id, kind, err.to_string()));
            return;
        }
    };

    if warmup {
        // Unmeasured priming call; the measured loop decides what a
        // failure means, so this one is only logged.
        if let Err(err) = work.execute(&mut conn).await {
            debug!("warm-up call failed: {err}");
        }
    }

    trace!("ready, waiting at the start line");
    rendezvous.arrive().await;

    let window = Instant::now();
    let planned = match mode {
        RunMode::Iterations(n) => Some(n),
        RunMode::Duration(_) => None,
    };
    let deadline = match mode {
        RunMode::Duration(d) => Some(window + d),
        RunMode::Iterations(_) => None,
    };

    let mut result = WorkerResult::new(worker_id);
    let mut attempt: u64 = 0;

    loop {
        if *stop.borrow() {
            debug!("stop requested after {attempt} attempts");
            break;
        }
        if planned.is_some_and(|n| attempt >= n) {
            break;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        attempt += 1;

        let start = Instant::now();
        match work.execute(&mut conn).await {
            Ok(()) => {
                let elapsed = start.elapsed();
                result.success_count += 1;
                result.latencies.push(elapsed);
                #[cfg(feature = "metrics")]
                {
                    metrics::histogram!("stampede_call_latency")
                        .record(elapsed.as_secs_f64());
                    metrics::counter!("stampede_call_success").increment(1);
                }
            }
            Err(err) => {
                trace!("attempt {attempt} failed: {err}");
                result
                    .failures
                    .push(FailureRecord::execution(worker_id, attempt, err.to_string()));
                #[cfg(feature = "metrics")]
                {
                    metrics::counter!("stampede_call_error").increment(1);
                }
            }
        }

        if let Some(pause) = think_time {
            tokio::time::sleep(pause).await;
        }
    }

    result.elapsed = window.elapsed();
    pool.release(conn).await;
    submit(&aggregator, result);
}

fn submit(aggregator: &ResultAggregator, result: WorkerResult) {
    if let Err(err) = aggregator.submit(result) {
        // Submission can only fail on a contract violation in the harness;
        // the worker has nothing left to do with the result.
        error!("worker result discarded: {err}");
    }
}
