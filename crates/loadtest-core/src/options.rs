//! Options builder: merges tables and overrides into one run configuration
//!
//! `build_options` is the single entry point every test suite uses to produce
//! its `RunConfig`. It is a pure function of its four inputs: it performs no
//! I/O and the returned configuration is never mutated afterwards.

use crate::duration::{serde_duration, serde_opt_duration};
use crate::error::Result;
use crate::profile::{Executor, Stage, TestType};
use crate::thresholds::ThresholdSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Offset added between scenarios that do not pin their own start time, so
/// concurrent scenarios do not all hit the target at the exact same instant.
pub const SCENARIO_STAGGER: Duration = Duration::from_secs(2);

/// Trend statistics reported for every duration metric
pub const SUMMARY_TREND_STATS: [&str; 7] = ["avg", "min", "med", "max", "p(90)", "p(95)", "p(99)"];

/// Partial scenario: every field optional, merged over the base profile
///
/// Merge is shallow and field-by-field: a `Some` here wins wholesale over the
/// base profile's value. In particular a supplied `stages` vector replaces the
/// base vector entirely.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioOverride {
    pub executor: Option<Executor>,
    pub vus: Option<u32>,
    #[serde(with = "serde_opt_duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    pub stages: Option<Vec<Stage>>,
    pub start_rate: Option<u64>,
    #[serde(with = "serde_opt_duration", skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<Duration>,
    #[serde(rename = "preAllocatedVUs")]
    pub pre_allocated_vus: Option<u32>,
    #[serde(rename = "maxVUs")]
    pub max_vus: Option<u32>,
    /// Explicit start offset; scenarios without one are auto-staggered
    #[serde(with = "serde_opt_duration", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Duration>,
    /// Entry-point name the runner dispatches to
    pub exec: Option<String>,
    /// Extra tags attached to this scenario
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub tags: IndexMap<String, String>,
}

impl ScenarioOverride {
    /// Override that only sets the entry-point, the common case in suites
    pub fn exec(name: impl Into<String>) -> Self {
        Self {
            exec: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Fully resolved scenario handed to the runner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSpec {
    pub executor: Executor,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vus: Option<u32>,
    #[serde(with = "serde_opt_duration", skip_serializing_if = "Option::is_none", default)]
    pub duration: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stages: Option<Vec<Stage>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start_rate: Option<u64>,
    #[serde(with = "serde_opt_duration", skip_serializing_if = "Option::is_none", default)]
    pub time_unit: Option<Duration>,
    #[serde(rename = "preAllocatedVUs", skip_serializing_if = "Option::is_none", default)]
    pub pre_allocated_vus: Option<u32>,
    #[serde(rename = "maxVUs", skip_serializing_if = "Option::is_none", default)]
    pub max_vus: Option<u32>,
    #[serde(with = "serde_duration")]
    pub start_time: Duration,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exec: Option<String>,
    pub tags: IndexMap<String, String>,
}

/// Run-level tags for downstream filtering and dashboarding
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTags {
    pub test_type: String,
    pub test_target: String,
}

/// The fully merged configuration for one test run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub scenarios: IndexMap<String, ScenarioSpec>,
    pub thresholds: ThresholdSet,
    pub tags: RunTags,
    pub summary_trend_stats: Vec<String>,
}

impl RunConfig {
    /// Serialize for export to an external runner or `--dry-run` inspection
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Build a run configuration for one test type and target.
///
/// - `test_type` must name a known test type; anything else fails with
///   [`crate::ConfigError::UnknownTestType`] and produces no configuration.
/// - Without `scenarios`, a single scenario named `"default"` carries the base
///   profile verbatim.
/// - With `scenarios`, each override is shallow-merged over the base profile.
///   Scenarios without an explicit `start_time` receive 0s, 2s, 4s, ... in
///   map iteration order; an explicit `start_time` is kept as-is and does not
///   advance the stagger counter.
/// - `extra_thresholds` overlay the test type's base thresholds; colliding
///   selectors are replaced by the caller's value.
pub fn build_options(
    test_type: &str,
    test_target: &str,
    scenarios: Option<IndexMap<String, ScenarioOverride>>,
    extra_thresholds: Option<ThresholdSet>,
) -> Result<RunConfig> {
    let test_type: TestType = test_type.parse()?;
    let profile = test_type.profile();

    let mut thresholds = test_type.thresholds();
    if let Some(extra) = extra_thresholds {
        thresholds.overlay(&extra);
    }

    let overrides = scenarios.unwrap_or_else(|| {
        let mut default = IndexMap::new();
        default.insert("default".to_string(), ScenarioOverride::default());
        default
    });

    let mut specs = IndexMap::with_capacity(overrides.len());
    let mut next_start = Duration::ZERO;

    for (name, ov) in overrides {
        // The counter only advances when an automatic assignment was made.
        let start_time = match ov.start_time {
            Some(explicit) => explicit,
            None => {
                let assigned = next_start;
                next_start += SCENARIO_STAGGER;
                assigned
            }
        };

        let mut tags = IndexMap::new();
        tags.insert("scenario".to_string(), name.clone());
        tags.extend(ov.tags);

        let spec = ScenarioSpec {
            executor: ov.executor.unwrap_or(profile.executor),
            vus: ov.vus.or(profile.vus),
            duration: ov.duration.or(profile.duration),
            stages: ov.stages.or_else(|| profile.stages.clone()),
            start_rate: ov.start_rate.or(profile.start_rate),
            time_unit: ov.time_unit.or(profile.time_unit),
            pre_allocated_vus: ov.pre_allocated_vus.or(profile.pre_allocated_vus),
            max_vus: ov.max_vus.or(profile.max_vus),
            start_time,
            exec: ov.exec,
            tags,
        };
        specs.insert(name, spec);
    }

    Ok(RunConfig {
        scenarios: specs,
        thresholds,
        tags: RunTags {
            test_type: test_type.as_str().to_string(),
            test_target: test_target.to_string(),
        },
        summary_trend_stats: SUMMARY_TREND_STATS.iter().map(|s| s.to_string()).collect(),
    })
}
