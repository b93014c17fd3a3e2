//! Scenario execution
//!
//! The runner validates every scenario's entry point up front (configuration
//! errors abort setup), then drives each scenario concurrently after its
//! start offset. Three executor shapes are supported:
//!
//! - `constant-vus`: a fixed set of worker loops until the duration elapses
//! - `ramping-vus`: workers activate and park to follow the stage timeline,
//!   re-targeted once per second
//! - `ramping-arrival-rate`: iterations are issued on a paced interval
//!   derived from the interpolated stage rate, capped by a worker semaphore

use crate::metrics::{RunMetrics, RunSummary};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use loadtest_core::{Executor, RunConfig, ScenarioSpec, Stage};
use loadtest_http::{Checks, HttpClient};
use loadtest_scenarios::{Scenario, ScenarioRegistry};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, info};

/// Pause between iterations of one worker, mirroring user pacing
const DEFAULT_THINK_TIME: Duration = Duration::from_millis(500);

/// How long a parked ramping worker waits before re-checking its slot
const IDLE_POLL: Duration = Duration::from_millis(250);

/// How often the ramping controller re-targets the worker count
const RETARGET_INTERVAL: Duration = Duration::from_secs(1);

/// Errors that can occur while setting up a run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// A scenario references an entry point the registry does not have
    #[error("No entry point registered for exec '{0}'")]
    UnknownEntryPoint(String),
}

/// Drives one run configuration to completion
pub struct Runner {
    config: RunConfig,
    registry: Arc<ScenarioRegistry>,
    client: HttpClient,
    checks: Checks,
    metrics: Arc<RunMetrics>,
    think_time: Duration,
}

impl Runner {
    pub fn new(config: RunConfig, registry: ScenarioRegistry, client: HttpClient) -> Self {
        let metrics = Arc::new(RunMetrics::new());
        let client = client.with_observer(metrics.clone());
        Self {
            config,
            registry: Arc::new(registry),
            client,
            checks: Checks::new(),
            metrics,
            think_time: DEFAULT_THINK_TIME,
        }
    }

    /// Override the per-worker pause between iterations
    pub fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    /// Run every scenario to completion and produce the summary
    pub async fn run(self) -> Result<RunSummary, RunnerError> {
        // Fail fast on dangling entry points before any traffic is sent.
        for spec in self.config.scenarios.values() {
            let exec = spec.exec.as_deref().unwrap_or("default");
            if !self.registry.contains(exec) {
                return Err(RunnerError::UnknownEntryPoint(exec.to_string()));
            }
        }

        info!(
            test_type = %self.config.tags.test_type,
            test_target = %self.config.tags.test_target,
            scenarios = self.config.scenarios.len(),
            "starting load test"
        );
        self.metrics.start();

        let mut tasks = Vec::new();
        for (name, spec) in self.config.scenarios.clone() {
            let exec = spec.exec.clone().unwrap_or_else(|| "default".to_string());
            let Some(scenario) = self.registry.get(&exec) else {
                continue; // validated above
            };
            let client = self.client.scoped(&name);
            let checks = self.checks.scoped(&name);
            let think_time = self.think_time;

            tasks.push(tokio::spawn(async move {
                if !spec.start_time.is_zero() {
                    sleep(spec.start_time).await;
                }
                info!(scenario = %name, executor = %spec.executor, "scenario started");
                match spec.executor {
                    Executor::ConstantVus => {
                        constant_vus(&spec, scenario, client, checks, think_time).await
                    }
                    Executor::RampingVus => {
                        ramping_vus(&spec, scenario, client, checks, think_time).await
                    }
                    Executor::RampingArrivalRate => {
                        arrival_rate(&spec, scenario, client, checks).await
                    }
                }
                info!(scenario = %name, "scenario complete");
            }));
        }
        for task in tasks {
            let _ = task.await;
        }

        info!("load test complete");
        let report = self.checks.report();
        Ok(self.metrics.summary(
            &self.config.tags.test_type,
            &self.config.tags.test_target,
            report,
        ))
    }
}

/// Fixed worker loops until the duration elapses
async fn constant_vus(
    spec: &ScenarioSpec,
    scenario: Arc<dyn Scenario>,
    client: HttpClient,
    checks: Checks,
    think_time: Duration,
) {
    let vus = spec.vus.unwrap_or(1).max(1);
    let duration = spec.duration.unwrap_or(Duration::from_secs(10));
    let deadline = Instant::now() + duration;

    let mut workers = FuturesUnordered::new();
    for _ in 0..vus {
        let scenario = scenario.clone();
        let client = client.clone();
        let checks = checks.clone();
        workers.push(async move {
            while Instant::now() < deadline {
                scenario.run(&client, &checks).await;
                if !think_time.is_zero() {
                    sleep(think_time).await;
                }
            }
        });
    }
    while workers.next().await.is_some() {}
}

/// Worker count follows the stage timeline; parked workers poll for a slot
async fn ramping_vus(
    spec: &ScenarioSpec,
    scenario: Arc<dyn Scenario>,
    client: HttpClient,
    checks: Checks,
    think_time: Duration,
) {
    let stages = spec.stages.clone().unwrap_or_default();
    if stages.is_empty() {
        return;
    }
    let total: Duration = stages.iter().map(|s| s.duration).sum();
    let peak = stages.iter().map(|s| s.target).max().unwrap_or(0);
    let active = Arc::new(AtomicU64::new(0));
    let start = Instant::now();

    let mut handles = Vec::new();
    for worker in 0..peak {
        let scenario = scenario.clone();
        let client = client.clone();
        let checks = checks.clone();
        let active = active.clone();
        handles.push(tokio::spawn(async move {
            while start.elapsed() < total {
                if worker < active.load(Ordering::Relaxed) {
                    scenario.run(&client, &checks).await;
                    if !think_time.is_zero() {
                        sleep(think_time).await;
                    }
                } else {
                    sleep(IDLE_POLL).await;
                }
            }
        }));
    }

    let controller = {
        let active = active.clone();
        tokio::spawn(async move {
            while start.elapsed() < total {
                let target = target_at(&stages, 0, start.elapsed());
                active.store(target, Ordering::Relaxed);
                sleep(RETARGET_INTERVAL).await;
            }
            active.store(0, Ordering::Relaxed);
        })
    };

    for handle in handles {
        let _ = handle.await;
    }
    let _ = controller.await;
}

/// Iterations issued at the interpolated stage rate, capped by a semaphore
async fn arrival_rate(
    spec: &ScenarioSpec,
    scenario: Arc<dyn Scenario>,
    client: HttpClient,
    checks: Checks,
) {
    let stages = spec.stages.clone().unwrap_or_default();
    if stages.is_empty() {
        return;
    }
    let total: Duration = stages.iter().map(|s| s.duration).sum();
    let start_rate = spec.start_rate.unwrap_or(1).max(1);
    let time_unit = spec.time_unit.unwrap_or(Duration::from_secs(1));
    let cap = spec.max_vus.or(spec.pre_allocated_vus).unwrap_or(50).max(1);
    let semaphore = Arc::new(Semaphore::new(cap as usize));
    let start = Instant::now();

    let mut inflight = FuturesUnordered::new();
    while start.elapsed() < total {
        let rate = target_at(&stages, start_rate, start.elapsed()).max(1);
        let interval = time_unit.div_f64(rate as f64);

        match semaphore.clone().try_acquire_owned() {
            Ok(permit) => {
                let scenario = scenario.clone();
                let client = client.clone();
                let checks = checks.clone();
                inflight.push(tokio::spawn(async move {
                    scenario.run(&client, &checks).await;
                    drop(permit);
                }));
            }
            Err(_) => {
                // every worker is busy; this iteration is shed
                debug!("arrival-rate worker cap reached, dropping iteration");
            }
        }

        sleep(interval).await;

        // reap finished iterations without blocking the pacing loop
        while let Some(Some(_)) = inflight.next().now_or_never() {}
    }
    while inflight.next().await.is_some() {}
}

/// Target value at `elapsed` on a stage timeline, interpolating linearly
/// within each stage from the previous stage's target (initially `initial`).
pub fn target_at(stages: &[Stage], initial: u64, elapsed: Duration) -> u64 {
    let mut from = initial as f64;
    let mut offset = Duration::ZERO;
    for stage in stages {
        let end = offset + stage.duration;
        if elapsed < end {
            if stage.duration.is_zero() {
                return stage.target;
            }
            let progress = (elapsed - offset).as_secs_f64() / stage.duration.as_secs_f64();
            return (from + (stage.target as f64 - from) * progress).round() as u64;
        }
        from = stage.target as f64;
        offset = end;
    }
    stages.last().map(|s| s.target).unwrap_or(initial)
}
