use crate::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_PERCENTILES, DEFAULT_RENDEZVOUS_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How long each worker keeps issuing calls.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RunMode {
    /// Execute a fixed number of calls per worker and then stop.
    Iterations(u64),
    /// Keep executing calls until the wall-clock deadline elapses.
    Duration(Duration),
}

/// Immutable parameters for a single benchmark run.
///
/// Built by the `Benchmark` chained methods and handed to the runner as a
/// value; nothing here is read from process-wide state.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub name: String,
    pub workers: usize,
    pub mode: RunMode,
    /// Fixed pool capacity. Defaults to `workers` so no worker starves.
    pub pool_size: Option<usize>,
    pub acquire_timeout: Duration,
    pub rendezvous_timeout: Duration,
    /// Percentiles to report, as percentages (e.g. `95.0`, `99.9`).
    pub percentiles: Vec<f64>,
    /// Issue one unmeasured priming call per worker before the start line.
    pub warmup: bool,
    /// Optional pause between calls, excluded from latency samples.
    pub think_time: Option<Duration>,
}

impl RunConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            workers: 1,
            mode: RunMode::Iterations(1),
            pool_size: None,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            rendezvous_timeout: DEFAULT_RENDEZVOUS_TIMEOUT,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            warmup: false,
            think_time: None,
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size.unwrap_or(self.workers)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("worker count must be at least 1".to_string());
        }
        match self.mode {
            RunMode::Iterations(0) => {
                return Err("iteration count must be at least 1".to_string());
            }
            RunMode::Duration(d) if d.is_zero() => {
                return Err("run duration must be non-zero".to_string());
            }
            _ => {}
        }
        if self.pool_size() == 0 {
            return Err("pool size must be at least 1".to_string());
        }
        if let Some(p) = self
            .percentiles
            .iter()
            .find(|p| !(0.0..=100.0).contains(*p) || !p.is_finite())
        {
            return Err(format!("percentile {p} is outside 0..=100"));
        }
        Ok(())
    }
}

/// Opaque connection parameters handed to `Connector::open` implementations.
///
/// The pool never inspects these; they exist so concrete connectors share a
/// common shape for endpoint, credential and transport-security settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub database: String,
    /// CA bundle for server certificate verification, if any.
    pub ssl_ca: Option<PathBuf>,
    /// Minimum accepted transport-security version, e.g. "TLSv1.3".
    pub min_tls_version: Option<String>,
}

impl ConnectionSettings {
    pub fn new(host: &str, user: &str, password: &str, database: &str) -> Self {
        Self {
            host: host.to_string(),
            port: None,
            user: user.to_string(),
            password: password.to_string(),
            database: database.to_string(),
            ssl_ca: None,
            min_tls_version: None,
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("ssl_ca", &self.ssl_ca)
            .field("min_tls_version", &self.min_tls_version)
            .finish()
    }
}
