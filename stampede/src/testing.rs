//! In-process fakes shared by the unit tests: a scriptable connector and a
//! few synthetic work units.

use crate::connector::{Connector, WorkUnit};
use stampede_core::{ConnectError, ExecutionError};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug)]
pub(crate) struct MockConn {
    pub healthy: bool,
}

/// Connector with a scriptable open budget and validation verdict.
/// Share it as `Arc<MockConnector>` to inspect the counters afterwards.
pub(crate) struct MockConnector {
    opened: AtomicUsize,
    closed: AtomicUsize,
    open_budget: Option<usize>,
    validate_ok: AtomicBool,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            opened: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
            open_budget: None,
            validate_ok: AtomicBool::new(true),
        }
    }

    /// Allow only the first `budget` opens; the rest fail to connect.
    pub fn with_open_budget(budget: usize) -> Self {
        let mut connector = Self::new();
        connector.open_budget = Some(budget);
        connector
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn set_validate_ok(&self, ok: bool) {
        self.validate_ok.store(ok, Ordering::SeqCst);
    }
}

impl Connector for MockConnector {
    type Connection = MockConn;

    async fn open(&self) -> Result<MockConn, ConnectError> {
        let n = self.opened.fetch_add(1, Ordering::SeqCst);
        if self.open_budget.is_some_and(|budget| n >= budget) {
            return Err(ConnectError::new("open budget exhausted"));
        }
        Ok(MockConn { healthy: true })
    }

    async fn validate(&self, conn: &mut MockConn) -> bool {
        conn.healthy && self.validate_ok.load(Ordering::SeqCst)
    }

    async fn close(&self, _conn: MockConn) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Succeeds after an optional artificial delay.
pub(crate) struct SleepWork(pub Duration);

impl WorkUnit<MockConn> for SleepWork {
    async fn execute(&self, _conn: &mut MockConn) -> Result<(), ExecutionError> {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
        Ok(())
    }
}

/// Fails deterministically on every `every`-th call, counted across all
/// holders of the same instance.
pub(crate) struct FlakyWork {
    every: u64,
    calls: AtomicU64,
}

impl FlakyWork {
    pub fn every(every: u64) -> Self {
        Self {
            every,
            calls: AtomicU64::new(0),
        }
    }
}

impl WorkUnit<MockConn> for FlakyWork {
    async fn execute(&self, _conn: &mut MockConn) -> Result<(), ExecutionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call % self.every == 0 {
            Err(ExecutionError::new(format!(
                "injected failure on call {call}"
            )))
        } else {
            Ok(())
        }
    }
}
