//! Pure statistics over a collected latency sample set.
//!
//! Percentiles use the nearest-rank method: the `ceil(p/100 * n)`-th order
//! statistic of the sorted samples. The method is exact and depends only on
//! the multiset of samples, so repeated runs over identical inputs compare
//! cleanly regardless of merge order.

use serde::Serialize;
use statistical::{mean, median, standard_deviation};
use std::time::Duration;

/// Summary derived once from a latency sample set. Holds no reference back
/// to the samples.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsSummary {
    pub count: usize,
    pub min: Option<Duration>,
    pub max: Option<Duration>,
    pub mean: Option<Duration>,
    pub median: Option<Duration>,
    /// Sample (n-1) standard deviation; absent below two samples rather
    /// than zero, since one sample carries no spread information.
    pub std_dev: Option<Duration>,
    /// Requested percentile (as a percentage) paired with its latency.
    pub percentiles: Vec<(f64, Duration)>,
}

impl StatisticsSummary {
    pub fn empty() -> Self {
        Self {
            count: 0,
            min: None,
            max: None,
            mean: None,
            median: None,
            std_dev: None,
            percentiles: Vec::new(),
        }
    }

    /// Look up a reported percentile, e.g. `summary.percentile(99.0)`.
    pub fn percentile(&self, p: f64) -> Option<Duration> {
        self.percentiles
            .iter()
            .find(|(q, _)| (q - p).abs() < f64::EPSILON)
            .map(|(_, v)| *v)
    }
}

/// Summarize `samples`, reporting the given percentiles (percentages in
/// `0..=100`). Sample order is irrelevant.
pub fn summarize(samples: &[Duration], percentiles: &[f64]) -> StatisticsSummary {
    if samples.is_empty() {
        return StatisticsSummary::empty();
    }

    let mut secs: Vec<f64> = samples.iter().map(Duration::as_secs_f64).collect();
    secs.sort_by(f64::total_cmp);

    let count = secs.len();
    let mean_secs = mean(&secs);
    let median_secs = median(&secs);
    let std_dev = if count >= 2 {
        Some(Duration::from_secs_f64(standard_deviation(
            &secs,
            Some(mean_secs),
        )))
    } else {
        None
    };

    let percentiles = percentiles
        .iter()
        .map(|&p| (p, Duration::from_secs_f64(nearest_rank(&secs, p))))
        .collect();

    StatisticsSummary {
        count,
        min: Some(Duration::from_secs_f64(secs[0])),
        max: Some(Duration::from_secs_f64(secs[count - 1])),
        mean: Some(Duration::from_secs_f64(mean_secs)),
        median: Some(Duration::from_secs_f64(median_secs)),
        std_dev,
        percentiles,
    }
}

fn nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    let p = percentile.clamp(0.0, 100.0);
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}
