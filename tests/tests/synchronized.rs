mod utils;
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;

    use stampede::prelude::*;
    use std::time::Duration;

    /// Connector over the mock query endpoint. One HTTP client per pooled
    /// connection; `open` proves reachability with a single round-trip.
    struct HttpConnector {
        settings: ConnectionSettings,
    }

    impl HttpConnector {
        fn new() -> Self {
            Self {
                settings: ConnectionSettings::new(BASE, "bench", "bench", "mock"),
            }
        }
    }

    impl Connector for HttpConnector {
        type Connection = reqwest::Client;

        async fn open(&self) -> Result<reqwest::Client, ConnectError> {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .map_err(|err| ConnectError::new(err.to_string()))?;
            client
                .get(format!("{}/query/delay/ms/0", self.settings.host))
                .send()
                .await
                .map_err(|err| ConnectError::new(err.to_string()))?;
            Ok(client)
        }

        async fn validate(&self, _conn: &mut reqwest::Client) -> bool {
            true
        }

        async fn close(&self, _conn: reqwest::Client) {}
    }

    /// Run one GET and drain the body; the benchmarked round-trip.
    struct Query {
        url: String,
    }

    impl Query {
        fn new(path: &str) -> Self {
            Self {
                url: format!("{BASE}{path}"),
            }
        }
    }

    impl WorkUnit<reqwest::Client> for Query {
        async fn execute(&self, conn: &mut reqwest::Client) -> Result<(), ExecutionError> {
            let response = conn
                .get(&self.url)
                .send()
                .await
                .map_err(|err| ExecutionError::new(err.to_string()))?;
            if response.status().is_server_error() {
                return Err(ExecutionError::new(format!(
                    "query returned {}",
                    response.status()
                )));
            }
            let _ = response
                .bytes()
                .await
                .map_err(|err| ExecutionError::new(err.to_string()))?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn synchronized_run_over_http() {
        init().await;

        let report = stampede::benchmark(
            "http-delay",
            HttpConnector::new(),
            Query::new("/query/delay/ms/1"),
        )
        .workers(8)
        .iterations(50)
        .warmup()
        .percentiles(&[95.0, 99.0, 99.9])
        .await
        .unwrap();

        let result = report.result();
        assert_eq!(result.total_success, 400);
        assert_eq!(result.total_failure, 0);
        assert_eq!(result.per_worker.len(), 8);
        assert!(result.summary.mean.unwrap() >= Duration::from_millis(1));
        assert!(result.throughput() > 0.0);
    }

    #[tokio::test]
    async fn deterministic_flaky_stream_is_fully_recorded() {
        init().await;

        let report = stampede::benchmark(
            "http-flaky",
            HttpConnector::new(),
            Query::new("/query/flaky/10/stream/deterministic"),
        )
        .workers(1)
        .iterations(100)
        .await
        .unwrap();

        let result = report.result();
        assert_eq!(result.total_success, 90);
        assert_eq!(result.total_failure, 10);
        let positions: Vec<u64> = result.failures.iter().map(|f| f.attempt_index).collect();
        assert_eq!(positions, (1..=10).map(|i| i * 10).collect::<Vec<_>>());
        assert!(result
            .failures
            .iter()
            .all(|f| f.kind == FailureKind::Execution));
    }

    #[tokio::test]
    async fn duration_mode_over_jittered_latency() {
        init().await;

        let report = stampede::benchmark(
            "http-jitter",
            HttpConnector::new(),
            Query::new("/query/jitter/ms/2/std/1"),
        )
        .workers(4)
        .duration(Duration::from_millis(400))
        .await
        .unwrap();

        let result = report.result();
        assert!(result.total_success > 0);
        assert!(result.wall >= Duration::from_millis(400));
        assert_eq!(result.summary.count, result.total_success as usize);
    }

    #[tokio::test]
    async fn report_renders_and_persists() {
        init().await;

        let report = stampede::benchmark(
            "http-report",
            HttpConnector::new(),
            Query::new("/query/delay/ms/1"),
        )
        .workers(2)
        .iterations(20)
        .await
        .unwrap();

        let rendered = report.to_string();
        assert!(rendered.contains("40 ok"));

        let dir = std::env::temp_dir().join("stampede-integration-artifacts");
        let path = report.write_artifact(&dir).expect("artifact written");
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
