#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod benchmark;
pub mod connector;
pub mod report;

pub(crate) mod aggregator;
pub(crate) mod pool;
pub(crate) mod rendezvous;
pub(crate) mod runner;
pub(crate) mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use benchmark::{benchmark, Benchmark, StopHandle};
pub use connector::{Connector, WorkUnit};
pub use report::RunReport;
pub use runner::RunPhase;

pub mod prelude {
    pub use crate::benchmark::{benchmark, Benchmark, StopHandle};
    pub use crate::connector::{Connector, WorkUnit};
    pub use crate::report::RunReport;
    pub use crate::runner::RunPhase;
    pub use stampede_core::{
        ConnectError, ConnectionSettings, ExecutionError, FailureKind, FailureRecord, RunConfig,
        RunError, RunMode, RunResult, StatisticsSummary,
    };
}
