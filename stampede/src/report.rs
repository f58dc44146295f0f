//! Human-readable run report plus optional persistence to a timestamped
//! JSON artifact. The in-memory report is always complete; persistence is
//! best-effort and never fails the run.

use stampede_core::{RunResult, MAX_REPORTED_FAILURES};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

#[derive(Debug)]
pub struct RunReport {
    result: RunResult,
}

impl RunReport {
    pub(crate) fn new(result: RunResult) -> Self {
        Self { result }
    }

    pub fn result(&self) -> &RunResult {
        &self.result
    }

    pub fn into_result(self) -> RunResult {
        self.result
    }

    /// Persist the run result as `<name>-<unix-millis>.json` under `dir`.
    /// Returns the path on success; on any failure the error is logged and
    /// `None` is returned, leaving the in-memory report untouched.
    pub fn write_artifact(&self, dir: impl AsRef<Path>) -> Option<PathBuf> {
        match self.try_write_artifact(dir.as_ref()) {
            Ok(path) => {
                info!("run artifact written to {}", path.display());
                Some(path)
            }
            Err(err) => {
                warn!("failed to persist run artifact: {err}");
                None
            }
        }
    }

    fn try_write_artifact(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let file = format!("{}-{stamp}.json", artifact_stem(&self.result.name));
        let path = dir.join(file);
        let json = serde_json::to_vec_pretty(&self.result)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = &self.result;
        writeln!(
            f,
            "benchmark {:?}: {} ok, {} failed, wall {}",
            result.name,
            result.total_success,
            result.total_failure,
            humantime::format_duration(truncate_to_millis(result.wall)),
        )?;
        writeln!(f, "throughput {:.2} ops/s", result.throughput())?;

        let summary = &result.summary;
        writeln!(
            f,
            "latency mean {} min {} median {} max {} stddev {}",
            format_latency(summary.mean),
            format_latency(summary.min),
            format_latency(summary.median),
            format_latency(summary.max),
            format_latency(summary.std_dev),
        )?;
        if !summary.percentiles.is_empty() {
            let rendered: Vec<String> = summary
                .percentiles
                .iter()
                .map(|(p, v)| format!("p{p}={}", format_latency(Some(*v))))
                .collect();
            writeln!(f, "percentiles {}", rendered.join(" "))?;
        }

        let spreads: Vec<f64> = result
            .per_worker
            .iter()
            .filter(|w| !w.elapsed.is_zero())
            .map(|w| w.throughput())
            .collect();
        if !spreads.is_empty() {
            let min = spreads.iter().copied().fold(f64::INFINITY, f64::min);
            let max = spreads.iter().copied().fold(0.0, f64::max);
            let avg = spreads.iter().sum::<f64>() / spreads.len() as f64;
            writeln!(
                f,
                "workers {} reporting, per-worker ops/s min {min:.2} avg {avg:.2} max {max:.2}",
                spreads.len(),
            )?;
        }

        if !result.failures.is_empty() {
            let shown = result.failures.len().min(MAX_REPORTED_FAILURES);
            writeln!(
                f,
                "failures (most recent {shown} of {}):",
                result.failures.len()
            )?;
            for failure in result.failures.iter().rev().take(MAX_REPORTED_FAILURES) {
                writeln!(
                    f,
                    "  worker {} attempt {} [{:?}]: {}",
                    failure.worker_id, failure.attempt_index, failure.kind, failure.error
                )?;
            }
        }
        Ok(())
    }
}

fn format_latency(latency: Option<Duration>) -> String {
    match latency {
        Some(value) => format!("{:.3}ms", value.as_secs_f64() * 1000.0),
        None => "n/a".to_string(),
    }
}

/// humantime renders micro/nanosecond tails verbosely; wall durations only
/// need millisecond precision.
fn truncate_to_millis(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}

fn artifact_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    if stem.is_empty() {
        "run".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stampede_core::{summarize, FailureRecord, WorkerSummary};

    fn sample_result() -> RunResult {
        let latencies: Vec<Duration> = (1..=100).map(Duration::from_millis).collect();
        let summary = summarize(&latencies, &[95.0, 99.0]);
        RunResult {
            name: "select 1".to_string(),
            total_success: 100,
            total_failure: 2,
            wall: Duration::from_secs(2),
            latencies,
            failures: vec![
                FailureRecord::execution(0, 7, "server has gone away"),
                FailureRecord::execution(1, 13, "lock wait timeout"),
            ],
            per_worker: vec![
                WorkerSummary {
                    worker_id: 0,
                    success_count: 50,
                    failure_count: 1,
                    elapsed: Duration::from_secs(2),
                },
                WorkerSummary {
                    worker_id: 1,
                    success_count: 50,
                    failure_count: 1,
                    elapsed: Duration::from_secs(2),
                },
            ],
            summary,
        }
    }

    #[test]
    fn display_covers_totals_latency_and_failures() {
        let report = RunReport::new(sample_result());
        let rendered = report.to_string();
        assert!(rendered.contains("100 ok, 2 failed"));
        assert!(rendered.contains("throughput 50.00 ops/s"));
        assert!(rendered.contains("p95="));
        assert!(rendered.contains("per-worker ops/s"));
        assert!(rendered.contains("lock wait timeout"));
    }

    #[test]
    fn display_handles_an_empty_run() {
        let report = RunReport::new(RunResult {
            name: "empty".to_string(),
            total_success: 0,
            total_failure: 0,
            wall: Duration::ZERO,
            latencies: Vec::new(),
            failures: Vec::new(),
            per_worker: Vec::new(),
            summary: summarize(&[], &[95.0]),
        });
        let rendered = report.to_string();
        assert!(rendered.contains("0 ok, 0 failed"));
        assert!(rendered.contains("n/a"));
    }

    #[test]
    fn artifact_round_trips_to_disk() {
        let report = RunReport::new(sample_result());
        let dir = std::env::temp_dir().join(format!(
            "stampede-report-test-{}",
            std::process::id()
        ));
        let path = report.write_artifact(&dir).expect("artifact written");
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"total_success\": 100"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn artifact_failure_leaves_the_report_usable() {
        let report = RunReport::new(sample_result());
        // A file where the directory should be makes persistence fail.
        let clash = std::env::temp_dir().join(format!(
            "stampede-report-clash-{}",
            std::process::id()
        ));
        std::fs::write(&clash, b"occupied").unwrap();
        assert!(report.write_artifact(&clash).is_none());
        assert!(report.to_string().contains("100 ok"));
        let _ = std::fs::remove_file(&clash);
    }
}
