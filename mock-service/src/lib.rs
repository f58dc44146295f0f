use axum::{debug_handler, extract::Path, http::StatusCode, routing::get, Router};
use lazy_static::lazy_static;
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, RwLock,
};
use std::time::Duration;
use tracing::debug;

pub async fn run(addr: SocketAddr) {
    let app = Router::new()
        .route("/query/delay/ms/:delay_ms", get(delay))
        .route("/query/jitter/ms/:mean_ms/std/:std_ms", get(jitter))
        .route("/query/flaky/:every/stream/:stream_id", get(flaky));

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Fixed-latency query stand-in.
#[debug_handler]
pub async fn delay(Path(delay_ms): Path<u64>) {
    QPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}

/// Normally-distributed latency around `mean_ms`.
#[debug_handler]
pub async fn jitter(Path((mean_ms, std_ms)): Path<(u64, u64)>) {
    QPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    let sleep_ms = {
        let normal =
            Normal::new(mean_ms as f64, std_ms as f64).expect("valid jitter parameters");
        normal.sample(&mut rand::thread_rng()).max(0.0)
    };
    tokio::time::sleep(Duration::from_secs_f64(sleep_ms / 1000.0)).await;
}

lazy_static! {
    static ref FLAKY_CALLS: Arc<RwLock<HashMap<String, Arc<AtomicU64>>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Fails every `every`-th call on the given stream with a 500, counting
/// per stream id so concurrent tests do not interfere.
#[debug_handler]
pub async fn flaky(
    Path((every, stream_id)): Path<(u64, String)>,
) -> Result<(), StatusCode> {
    QPS_MEASURE.fetch_add(1, Ordering::Relaxed);

    let counter = {
        let read = FLAKY_CALLS.read().unwrap().get(&stream_id).cloned();
        if let Some(counter) = read {
            counter
        } else {
            let counter = Arc::new(AtomicU64::new(0));
            FLAKY_CALLS
                .write()
                .unwrap()
                .insert(stream_id, counter.clone());
            counter
        }
    };

    let call = counter.fetch_add(1, Ordering::Relaxed) + 1;
    if every > 0 && call % every == 0 {
        debug!("MOCK SERVER ___ ERR on call {call}");
        Err(StatusCode::INTERNAL_SERVER_ERROR)
    } else {
        Ok(())
    }
}

/** QPS Printer **/

static QPS_MEASURE: AtomicU64 = AtomicU64::new(0);

pub async fn qps_measure_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let queries = QPS_MEASURE.fetch_min(0, Ordering::Relaxed);
        println!("{queries} QPS");
    }
}
