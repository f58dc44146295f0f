//! Public entry point: a configurable benchmark value that runs when
//! awaited, mirroring the way a run is described before it is executed.

use crate::connector::{Connector, WorkUnit};
use crate::report::RunReport;
use crate::runner::{run_benchmark, RunPhase};
use stampede_core::{RunConfig, RunError, RunMode};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};
use tokio::sync::watch;

/// Describe and run one benchmark.
///
/// # Example
/// ```no_run
/// use stampede::prelude::*;
/// use std::time::Duration;
/// # struct Loopback;
/// # impl Connector for Loopback {
/// #     type Connection = ();
/// #     async fn open(&self) -> Result<(), ConnectError> { Ok(()) }
/// #     async fn validate(&self, _conn: &mut ()) -> bool { true }
/// #     async fn close(&self, _conn: ()) {}
/// # }
/// # struct Select1;
/// # impl WorkUnit<()> for Select1 {
/// #     async fn execute(&self, _conn: &mut ()) -> Result<(), ExecutionError> { Ok(()) }
/// # }
///
/// #[tokio::main]
/// async fn main() {
///     let report = stampede::benchmark("select1", Loopback, Select1)
///         .workers(10)
///         .iterations(10_000)
///         .await
///         .expect("benchmark run failed");
///     println!("{report}");
/// }
/// ```
pub fn benchmark<C, W>(name: &str, connector: C, work: W) -> Benchmark<C, W>
where
    C: Connector,
    W: WorkUnit<C::Connection>,
{
    Benchmark::new(name, connector, work)
}

/// A configured-but-not-yet-running benchmark. Awaiting it runs the whole
/// harness and resolves to the report.
#[pin_project::pin_project]
pub struct Benchmark<C, W> {
    connector: Option<C>,
    work: Option<W>,
    config: RunConfig,
    stop: Arc<watch::Sender<bool>>,
    stop_rx: watch::Receiver<bool>,
    phase: Option<watch::Sender<RunPhase>>,
    phase_rx: watch::Receiver<RunPhase>,
    runner_fut: Option<Pin<Box<dyn Future<Output = Result<RunReport, RunError>> + Send>>>,
}

impl<C, W> Benchmark<C, W> {
    pub fn new(name: &str, connector: C, work: W) -> Self {
        let (stop, stop_rx) = watch::channel(false);
        let (phase, phase_rx) = watch::channel(RunPhase::Idle);
        Self {
            connector: Some(connector),
            work: Some(work),
            config: RunConfig::new(name),
            stop: Arc::new(stop),
            stop_rx,
            phase: Some(phase),
            phase_rx,
            runner_fut: None,
        }
    }

    /// Number of parallel execution streams.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Run a fixed number of calls per worker. Mutually exclusive with
    /// [`duration`](Self::duration); the last call wins.
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.config.mode = RunMode::Iterations(iterations);
        self
    }

    /// Run each worker until the deadline instead of a fixed count.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.mode = RunMode::Duration(duration);
        self
    }

    /// Fixed pool capacity; defaults to the worker count.
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.config.pool_size = Some(pool_size);
        self
    }

    /// How long a worker waits for a pooled connection before degrading to
    /// a zero result.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.config.acquire_timeout = timeout;
        self
    }

    /// How long the harness waits at the start line before releasing
    /// whatever subset of workers is ready.
    pub fn rendezvous_timeout(mut self, timeout: Duration) -> Self {
        self.config.rendezvous_timeout = timeout;
        self
    }

    /// Percentiles to report, as percentages (e.g. `&[95.0, 99.0, 99.9]`).
    pub fn percentiles(mut self, percentiles: &[f64]) -> Self {
        self.config.percentiles = percentiles.to_vec();
        self
    }

    /// Issue one unmeasured priming call per worker before the start line.
    pub fn warmup(mut self) -> Self {
        self.config.warmup = true;
        self
    }

    /// Pause between calls, excluded from the latency samples.
    pub fn think_time(mut self, pause: Duration) -> Self {
        self.config.think_time = Some(pause);
        self
    }

    /// Handle for requesting a cooperative stop. Workers observe it between
    /// iterations; a stopped run still produces a complete report over the
    /// partial samples.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            inner: self.stop.clone(),
        }
    }

    /// Watch the harness move through its phases.
    pub fn phase(&self) -> watch::Receiver<RunPhase> {
        self.phase_rx.clone()
    }
}

impl<C, W> Future for Benchmark<C, W>
where
    C: Connector,
    W: WorkUnit<C::Connection>,
{
    type Output = Result<RunReport, RunError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.runner_fut.is_none() {
            let connector = self
                .connector
                .take()
                .expect("benchmark polled after completion");
            let work = self.work.take().expect("benchmark polled after completion");
            let phase = self
                .phase
                .take()
                .expect("benchmark polled after completion");
            let config = self.config.clone();
            let stop_rx = self.stop_rx.clone();
            self.runner_fut = Some(Box::pin(async move {
                run_benchmark(connector, work, config, stop_rx, phase).await
            }));
        }

        if let Some(runner) = &mut self.runner_fut {
            runner.as_mut().poll(cx)
        } else {
            unreachable!()
        }
    }
}

/// Cooperative cancellation for a running benchmark. Cloneable; any holder
/// may stop the run.
#[derive(Clone)]
pub struct StopHandle {
    inner: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Ask every worker to wind down at its next iteration boundary.
    pub fn stop(&self) {
        self.inner.send_replace(true);
    }
}
