use std::time::Duration;

/// Percentiles reported when none are configured (p95/p99/p999).
pub const DEFAULT_PERCENTILES: &[f64] = &[95.0, 99.0, 99.9];

/// How long a worker may wait for a pooled connection before giving up.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long the harness waits for all workers to reach the start line
/// before releasing whatever subset is ready.
pub const DEFAULT_RENDEZVOUS_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on the number of failures rendered in the text report.
/// The full list is always retained on the run result.
pub const MAX_REPORTED_FAILURES: usize = 10;
