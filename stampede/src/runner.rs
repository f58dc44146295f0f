//! Harness orchestration: build the pool, spawn the workers, drive the
//! rendezvous, join everything, and turn the merged result into a report.

use crate::aggregator::ResultAggregator;
use crate::connector::{Connector, WorkUnit};
use crate::pool::ConnectionPool;
use crate::rendezvous::StartCoordinator;
use crate::report::RunReport;
use crate::worker::{self, WorkerContext};
use stampede_core::{RunConfig, RunError};
use std::sync::Arc;
use tokio::sync::watch;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Where the harness currently is. Observable through
/// [`Benchmark::phase`](crate::Benchmark::phase); transitions are strictly
/// in declaration order, and `Draining` follows `Running` the instant the
/// release signal fires since the harness's only remaining job is the
/// join-all wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    WarmingUp,
    AwaitingRendezvous,
    Running,
    Draining,
    Reporting,
    Done,
}

#[instrument(name = "benchmark", skip_all, fields(name = config.name))]
pub(crate) async fn run_benchmark<C, W>(
    connector: C,
    work: W,
    config: RunConfig,
    stop: watch::Receiver<bool>,
    phase: watch::Sender<RunPhase>,
) -> Result<RunReport, RunError>
where
    C: Connector,
    W: WorkUnit<C::Connection>,
{
    config.validate().map_err(RunError::InvalidConfig)?;
    if config.pool_size() < config.workers {
        warn!(
            "pool size {} is below worker count {}; some workers will starve",
            config.pool_size(),
            config.workers
        );
    }

    info!("running with {config:?}");

    // A pool that cannot produce a single connection means the whole run is
    // doomed; fail before spawning anything. Individual workers failing to
    // acquire later stays local to them.
    phase.send_replace(RunPhase::WarmingUp);
    let pool = Arc::new(ConnectionPool::new(
        connector,
        config.pool_size(),
        config.acquire_timeout,
    ));
    let probe = pool.acquire().await?;
    pool.release(probe).await;

    let coordinator = StartCoordinator::new(config.workers);
    let aggregator = Arc::new(ResultAggregator::new(config.workers));
    let work = Arc::new(work);

    phase.send_replace(RunPhase::AwaitingRendezvous);
    let mut tasks = Vec::with_capacity(config.workers);
    for worker_id in 0..config.workers {
        let ctx = WorkerContext {
            worker_id,
            pool: pool.clone(),
            work: work.clone(),
            rendezvous: coordinator.handle(),
            aggregator: aggregator.clone(),
            mode: config.mode,
            warmup: config.warmup,
            think_time: config.think_time,
            stop: stop.clone(),
        };
        tasks.push(tokio::spawn(worker::run(ctx)));
    }

    let outcome = coordinator
        .release_when_ready(config.rendezvous_timeout)
        .await;
    info!(
        "released {} of {} workers{}",
        outcome.ready,
        config.workers,
        if outcome.timed_out {
            " (ready timeout elapsed)"
        } else {
            ""
        }
    );
    phase.send_replace(RunPhase::Running);
    phase.send_replace(RunPhase::Draining);

    for task in tasks {
        task.await
            .map_err(|err| RunError::WorkerPanic(err.to_string()))?;
    }
    let wall = outcome.released_at.elapsed();
    pool.shutdown().await;

    phase.send_replace(RunPhase::Reporting);
    let result = aggregator.finalize(&config.name, wall, &config.percentiles)?;
    info!(
        "complete: {} ok, {} failed in {:?}",
        result.total_success, result.total_failure, result.wall
    );

    let report = RunReport::new(result);
    phase.send_replace(RunPhase::Done);
    Ok(report)
}
