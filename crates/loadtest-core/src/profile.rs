//! Test types and load profiles
//!
//! Each test type maps to a fixed load profile describing the concurrency and
//! duration shape the runner should drive:
//! - smoke      : quick health validation (1 worker, 10s)
//! - load       : normal traffic simulation (ramp 10 -> 50 workers, ~7.5min)
//! - stress     : beyond normal capacity (5 -> 20 workers, ~18min)
//! - spike      : sudden traffic burst (3 -> 25 workers, ~2.5min)
//! - soak       : extended duration (5 workers, ~34min)
//! - breakpoint : increasing arrival rate until failure (10 -> 100 req/s, ~10min)

use crate::duration::serde_opt_duration;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The six supported test shapes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Smoke,
    Load,
    Stress,
    Spike,
    Soak,
    Breakpoint,
}

impl TestType {
    /// All test types, in escalation order
    pub const ALL: [TestType; 6] = [
        TestType::Smoke,
        TestType::Load,
        TestType::Stress,
        TestType::Spike,
        TestType::Soak,
        TestType::Breakpoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Smoke => "smoke",
            TestType::Load => "load",
            TestType::Stress => "stress",
            TestType::Spike => "spike",
            TestType::Soak => "soak",
            TestType::Breakpoint => "breakpoint",
        }
    }

    /// Base load profile for this test type
    pub fn profile(&self) -> LoadProfile {
        match self {
            TestType::Smoke => LoadProfile {
                executor: Executor::ConstantVus,
                vus: Some(1),
                duration: Some(Duration::from_secs(10)),
                ..LoadProfile::default()
            },
            TestType::Load => LoadProfile::ramping(vec![
                Stage::new(Duration::from_secs(30), 10), // warm up, baseline at 1 replica
                Stage::new(Duration::from_secs(60), 10), // hold
                Stage::new(Duration::from_secs(30), 30), // trigger scale to 2
                Stage::new(Duration::from_secs(120), 30), // hold while replica comes up
                Stage::new(Duration::from_secs(30), 50), // trigger scale to 3-4
                Stage::new(Duration::from_secs(120), 50), // hold at peak
                Stage::new(Duration::from_secs(60), 0),  // ramp down
            ]),
            TestType::Stress => LoadProfile::ramping(vec![
                Stage::new(Duration::from_secs(60), 5), // baseline
                Stage::new(Duration::from_secs(180), 10),
                Stage::new(Duration::from_secs(180), 10),
                Stage::new(Duration::from_secs(180), 20),
                Stage::new(Duration::from_secs(180), 20),
                Stage::new(Duration::from_secs(180), 5),
                Stage::new(Duration::from_secs(120), 5),
            ]),
            TestType::Spike => LoadProfile::ramping(vec![
                Stage::new(Duration::from_secs(30), 3),
                Stage::new(Duration::from_secs(10), 25),
                Stage::new(Duration::from_secs(60), 25),
                Stage::new(Duration::from_secs(10), 3),
                Stage::new(Duration::from_secs(30), 0),
            ]),
            TestType::Soak => LoadProfile::ramping(vec![
                Stage::new(Duration::from_secs(120), 5),
                Stage::new(Duration::from_secs(1800), 5),
                Stage::new(Duration::from_secs(120), 0),
            ]),
            TestType::Breakpoint => LoadProfile {
                executor: Executor::RampingArrivalRate,
                start_rate: Some(10),
                time_unit: Some(Duration::from_secs(1)),
                pre_allocated_vus: Some(50),
                max_vus: Some(100),
                stages: Some(vec![
                    Stage::new(Duration::from_secs(120), 20),
                    Stage::new(Duration::from_secs(120), 40),
                    Stage::new(Duration::from_secs(120), 60),
                    Stage::new(Duration::from_secs(120), 80),
                    Stage::new(Duration::from_secs(120), 100),
                ]),
                ..LoadProfile::default()
            },
        }
    }
}

impl FromStr for TestType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smoke" => Ok(TestType::Smoke),
            "load" => Ok(TestType::Load),
            "stress" => Ok(TestType::Stress),
            "spike" => Ok(TestType::Spike),
            "soak" => Ok(TestType::Soak),
            "breakpoint" => Ok(TestType::Breakpoint),
            other => Err(ConfigError::UnknownTestType(other.to_string())),
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a scenario's workload is driven
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Executor {
    /// Fixed number of concurrent workers for a fixed duration
    #[default]
    ConstantVus,
    /// Worker count follows the stage sequence
    RampingVus,
    /// Request arrival rate follows the stage sequence
    RampingArrivalRate,
}

impl Executor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Executor::ConstantVus => "constant-vus",
            Executor::RampingVus => "ramping-vus",
            Executor::RampingArrivalRate => "ramping-arrival-rate",
        }
    }
}

impl fmt::Display for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One phase of a ramp: hold or move towards `target` over `duration`
///
/// Stage order is significant; the sequence defines the ramp timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(with = "crate::duration::serde_duration")]
    pub duration: Duration,
    pub target: u64,
}

impl Stage {
    pub fn new(duration: Duration, target: u64) -> Self {
        Self { duration, target }
    }
}

/// Concurrency/duration shape of one test type or scenario
///
/// Deliberately flat: every field is optional except the executor, so that
/// per-scenario overrides merge field-by-field. A supplied `stages` vector
/// replaces the base vector wholesale, it is never spliced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadProfile {
    pub executor: Executor,

    /// Worker count for constant-vus
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vus: Option<u32>,

    /// Total duration for constant-vus
    #[serde(with = "serde_opt_duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,

    /// Ramp timeline for ramping executors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<Stage>>,

    /// Initial arrival rate for ramping-arrival-rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_rate: Option<u64>,

    /// Time unit the arrival rate is expressed in
    #[serde(with = "serde_opt_duration", skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<Duration>,

    /// Workers pre-allocated for arrival-rate pacing
    #[serde(rename = "preAllocatedVUs", skip_serializing_if = "Option::is_none")]
    pub pre_allocated_vus: Option<u32>,

    /// Hard cap on workers for arrival-rate pacing
    #[serde(rename = "maxVUs", skip_serializing_if = "Option::is_none")]
    pub max_vus: Option<u32>,
}

impl LoadProfile {
    fn ramping(stages: Vec<Stage>) -> Self {
        Self {
            executor: Executor::RampingVus,
            stages: Some(stages),
            ..Self::default()
        }
    }

    /// Total wall-clock span of the profile
    pub fn total_duration(&self) -> Duration {
        match &self.stages {
            Some(stages) => stages.iter().map(|s| s.duration).sum(),
            None => self.duration.unwrap_or(Duration::ZERO),
        }
    }
}
