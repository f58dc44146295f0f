//! Fixed-size connection pool. Manages resource lifecycle only; query
//! execution never happens here.

use crate::connector::Connector;
use stampede_core::PoolError;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

pub(crate) struct ConnectionPool<C: Connector> {
    connector: C,
    idle: Mutex<Vec<C::Connection>>,
    permits: Semaphore,
    acquire_timeout: Duration,
}

impl<C: Connector> ConnectionPool<C> {
    pub fn new(connector: C, size: usize, acquire_timeout: Duration) -> Self {
        Self {
            connector,
            idle: Mutex::new(Vec::with_capacity(size)),
            permits: Semaphore::new(size),
            acquire_timeout,
        }
    }

    /// Hand out a connection, blocking up to the acquire timeout for
    /// capacity. Idle connections are validated before reuse; a broken one
    /// is closed and replaced with a fresh open. A zero timeout still
    /// succeeds when capacity is immediately available.
    pub async fn acquire(&self) -> Result<C::Connection, PoolError> {
        let permit = match timeout(self.acquire_timeout, self.permits.acquire()).await {
            Ok(Ok(permit)) => permit,
            // The semaphore is never closed while the pool is alive.
            Ok(Err(_)) | Err(_) => return Err(PoolError::Exhausted(self.acquire_timeout)),
        };
        permit.forget();

        loop {
            let candidate = self
                .idle
                .lock()
                .expect("pool free-list mutex poisoned")
                .pop();
            let Some(mut conn) = candidate else { break };

            if self.connector.validate(&mut conn).await {
                return Ok(conn);
            }
            trace!("discarding broken idle connection");
            self.connector.close(conn).await;
        }

        match self.connector.open().await {
            Ok(conn) => Ok(conn),
            Err(err) => {
                self.permits.add_permits(1);
                Err(PoolError::Connect(err))
            }
        }
    }

    /// Return a connection to the free-list.
    pub async fn release(&self, conn: C::Connection) {
        self.idle
            .lock()
            .expect("pool free-list mutex poisoned")
            .push(conn);
        self.permits.add_permits(1);
    }

    /// Close every idle connection. Called once the run has drained.
    pub async fn shutdown(&self) {
        let idle = std::mem::take(
            &mut *self
                .idle
                .lock()
                .expect("pool free-list mutex poisoned"),
        );
        for conn in idle {
            self.connector.close(conn).await;
        }
    }
}
