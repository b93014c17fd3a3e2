//! Request metrics and the run summary
//!
//! Latencies are recorded in microseconds into HDR histograms (one overall,
//! one per scenario) and reported in milliseconds, matching the unit the
//! threshold expressions are written in.

use hdrhistogram::Histogram;
use indexmap::IndexMap;
use loadtest_http::{CheckReport, HttpResponse, RequestObserver};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

// Histogram bounds: 1µs to 60s, 3 significant digits
const LATENCY_LOW_US: u64 = 1;
const LATENCY_HIGH_US: u64 = 60_000_000;
const LATENCY_SIGFIGS: u8 = 3;

fn latency_histogram() -> Histogram<u64> {
    Histogram::new_with_bounds(LATENCY_LOW_US, LATENCY_HIGH_US, LATENCY_SIGFIGS).unwrap()
}

/// Shared metrics collected over one run
pub struct RunMetrics {
    total: AtomicU64,
    failed: AtomicU64,
    overall: RwLock<Histogram<u64>>,
    per_scenario: RwLock<IndexMap<String, Histogram<u64>>>,
    started: RwLock<Option<Instant>>,
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            overall: RwLock::new(latency_histogram()),
            per_scenario: RwLock::new(IndexMap::new()),
            started: RwLock::new(None),
        }
    }

    /// Mark the run start; request rates are measured from here
    pub fn start(&self) {
        *self.started.write() = Some(Instant::now());
    }

    /// Record one completed request
    pub fn record(&self, scenario: Option<&str>, ok: bool, duration: Duration) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }

        let latency_us = (duration.as_micros() as u64).clamp(LATENCY_LOW_US, LATENCY_HIGH_US);
        if let Err(e) = self.overall.write().record(latency_us) {
            warn!("failed to record latency: {}", e);
        }
        if let Some(scenario) = scenario {
            let mut map = self.per_scenario.write();
            let histogram = map
                .entry(scenario.to_string())
                .or_insert_with(latency_histogram);
            if let Err(e) = histogram.record(latency_us) {
                warn!("failed to record scenario latency: {}", e);
            }
        }
    }

    /// Build the summary for a finished run
    pub fn summary(&self, test_type: &str, test_target: &str, checks: CheckReport) -> RunSummary {
        let duration_secs = self
            .started
            .read()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(1.0);
        let total = self.total.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);

        let scenarios = self
            .per_scenario
            .read()
            .iter()
            .map(|(name, histogram)| (name.clone(), TrendStats::from_histogram(histogram)))
            .collect();

        RunSummary {
            test_type: test_type.to_string(),
            test_target: test_target.to_string(),
            duration_secs,
            http_reqs: total,
            http_req_failed: failed,
            failure_rate: if total > 0 {
                failed as f64 / total as f64
            } else {
                0.0
            },
            request_rate: total as f64 / duration_secs,
            http_req_duration: TrendStats::from_histogram(&self.overall.read()),
            scenarios,
            checks,
        }
    }
}

impl RequestObserver for RunMetrics {
    fn on_response(&self, scenario: Option<&str>, response: &HttpResponse) {
        self.record(scenario, response.ok(), response.duration);
    }
}

/// The trend statistics reported for every duration metric, in milliseconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TrendStats {
    pub avg: f64,
    pub min: f64,
    pub med: f64,
    pub max: f64,
    #[serde(rename = "p(90)")]
    pub p90: f64,
    #[serde(rename = "p(95)")]
    pub p95: f64,
    #[serde(rename = "p(99)")]
    pub p99: f64,
}

impl TrendStats {
    pub fn from_histogram(histogram: &Histogram<u64>) -> Self {
        if histogram.is_empty() {
            return Self::default();
        }
        let ms = |us: u64| us as f64 / 1_000.0;
        Self {
            avg: histogram.mean() / 1_000.0,
            min: ms(histogram.min()),
            med: ms(histogram.value_at_quantile(0.50)),
            max: ms(histogram.max()),
            p90: ms(histogram.value_at_quantile(0.90)),
            p95: ms(histogram.value_at_quantile(0.95)),
            p99: ms(histogram.value_at_quantile(0.99)),
        }
    }

    /// Look up a statistic by its selector name (`avg`, `med`, `p(95)`, ...)
    pub fn stat(&self, name: &str) -> Option<f64> {
        match name {
            "avg" => Some(self.avg),
            "min" => Some(self.min),
            "med" => Some(self.med),
            "max" => Some(self.max),
            "p(90)" => Some(self.p90),
            "p(95)" => Some(self.p95),
            "p(99)" => Some(self.p99),
            _ => None,
        }
    }
}

/// Aggregate result of one run, serializable for `--output`
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub test_type: String,
    pub test_target: String,
    pub duration_secs: f64,
    pub http_reqs: u64,
    pub http_req_failed: u64,
    pub failure_rate: f64,
    pub request_rate: f64,
    pub http_req_duration: TrendStats,
    pub scenarios: IndexMap<String, TrendStats>,
    pub checks: CheckReport,
}
