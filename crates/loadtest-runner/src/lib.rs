//! # OpenCloudHub Load Test Runner
//!
//! Drives a [`loadtest_core::RunConfig`] against live endpoints:
//!
//! - **Executors**: constant-worker loops, ramping worker counts that follow
//!   the stage timeline, and paced arrival-rate issuing with a worker cap
//! - **Metrics**: request totals, failure rate, HDR latency histograms per
//!   scenario and overall, trend statistics (avg/min/med/max/p90/p95/p99)
//! - **Thresholds**: evaluates the configuration's predicate expressions
//!   (`rate<0.05`, `p(95)<2500`) against the collected summary
//!
//! ## Usage
//!
//! ```bash
//! # Smoke test the wine classifier in the dev environment
//! och-loadtest --test-type smoke --target model-wine
//!
//! # Sustained load against the demo backend, saving results
//! och-loadtest --test-type load --target app-backend --output results.json
//!
//! # Inspect the generated run configuration without executing
//! och-loadtest --test-type breakpoint --target model-qwen --dry-run
//! ```

pub mod evaluate;
pub mod executor;
pub mod metrics;
pub mod report;

pub use evaluate::{evaluate, EvalError, ThresholdOutcome};
pub use executor::{Runner, RunnerError};
pub use metrics::{RunMetrics, RunSummary, TrendStats};
