//! Test suites: a target's scenarios plus its run-configuration recipe

use crate::scenario::{Scenario, ScenarioRegistry};
use loadtest_core::{build_options, RunConfig, TestType, ThresholdSet};
use loadtest_env::{EnvError, Environment};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while assembling a test suite
#[derive(Error, Debug)]
pub enum SuiteError {
    /// Target name is not in the suite registry
    #[error("Unknown test target: {0}")]
    UnknownTarget(String),

    /// Target's URLs could not be resolved in the active environment
    #[error(transparent)]
    Env(#[from] EnvError),
}

/// One test target: registered entry points, the scenario plan, and the
/// per-target threshold overrides fed into `build_options`.
pub struct TestSuite {
    target: String,
    registry: ScenarioRegistry,
    plan: Vec<(String, String)>,
    extra_thresholds: ThresholdSet,
}

impl TestSuite {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            registry: ScenarioRegistry::new(),
            plan: Vec::new(),
            extra_thresholds: ThresholdSet::new(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Register an entry point
    pub fn register(&mut self, exec: impl Into<String>, scenario: Arc<dyn Scenario>) {
        self.registry.register(exec, scenario);
    }

    /// Add a named scenario dispatching to a registered entry point
    pub fn add_scenario(&mut self, name: impl Into<String>, exec: impl Into<String>) {
        self.plan.push((name.into(), exec.into()));
    }

    /// Add a per-target threshold override
    pub fn add_threshold(&mut self, selector: impl Into<String>, predicates: &[&str]) {
        self.extra_thresholds.insert(selector, predicates);
    }

    pub fn registry(&self) -> &ScenarioRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> ScenarioRegistry {
        self.registry
    }

    /// Run configuration for this suite at the given test type.
    ///
    /// Suites with a scenario plan map it onto named overrides; suites
    /// without one (the platform sweeps) run the single default scenario.
    pub fn run_config(&self, test_type: TestType) -> loadtest_core::Result<RunConfig> {
        let scenarios = if self.plan.is_empty() {
            None
        } else {
            Some(
                self.plan
                    .iter()
                    .map(|(name, exec)| {
                        (name.clone(), loadtest_core::ScenarioOverride::exec(exec))
                    })
                    .collect(),
            )
        };
        let extra = if self.extra_thresholds.is_empty() {
            None
        } else {
            Some(self.extra_thresholds.clone())
        };
        build_options(test_type.as_str(), &self.target, scenarios, extra)
    }
}

/// All resolvable target names
pub fn available_targets() -> &'static [&'static str] {
    &[
        "model-wine",
        "model-fashion-mnist",
        "model-qwen",
        "platform-mlops",
        "platform-gitops",
        "platform-infrastructure",
        "platform-observability",
        "app-backend",
    ]
}

/// Resolve a target name into its suite against the active environment
pub fn suite_for(
    target: &str,
    env: &Environment,
    data_dir: &Path,
) -> Result<TestSuite, SuiteError> {
    match target {
        "model-wine" => crate::custom_model::wine_suite(env, data_dir),
        "model-fashion-mnist" => crate::custom_model::fashion_mnist_suite(env, data_dir),
        "model-qwen" => crate::base_model::qwen_suite(env, data_dir),
        "platform-mlops" => crate::platform::platform_suite(env, "mlops"),
        "platform-gitops" => crate::platform::platform_suite(env, "gitops"),
        "platform-infrastructure" => crate::platform::platform_suite(env, "infrastructure"),
        "platform-observability" => crate::platform::platform_suite(env, "observability"),
        "app-backend" => crate::demo_app::backend_suite(env, data_dir),
        other => Err(SuiteError::UnknownTarget(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadtest_core::SCENARIO_STAGGER;
    use std::time::Duration;

    fn dev() -> Environment {
        Environment::named("dev").unwrap()
    }

    #[test]
    fn test_every_listed_target_resolves() {
        let env = dev();
        for target in available_targets() {
            let suite = suite_for(target, &env, Path::new("data")).unwrap();
            assert_eq!(suite.target(), *target);
            assert!(!suite.registry().is_empty(), "{target} has no entry points");
        }
    }

    #[test]
    fn test_unknown_target_fails() {
        assert!(matches!(
            suite_for("model-bert", &dev(), Path::new("data")),
            Err(SuiteError::UnknownTarget(_))
        ));
    }

    #[test]
    fn test_plan_entry_points_are_registered() {
        let env = dev();
        for target in available_targets() {
            let suite = suite_for(target, &env, Path::new("data")).unwrap();
            let config = suite.run_config(TestType::Smoke).unwrap();
            for spec in config.scenarios.values() {
                let exec = spec.exec.as_deref().unwrap_or("default");
                assert!(
                    suite.registry().contains(exec),
                    "{target}: no entry point for exec '{exec}'"
                );
            }
        }
    }

    #[test]
    fn test_wine_load_config_staggers_scenarios() {
        let suite = suite_for("model-wine", &dev(), Path::new("data")).unwrap();
        let config = suite.run_config(TestType::Load).unwrap();

        assert_eq!(config.scenarios.len(), 2);
        assert_eq!(config.scenarios["wine-health"].start_time, Duration::ZERO);
        assert_eq!(config.scenarios["wine-predict"].start_time, SCENARIO_STAGGER);
        assert_eq!(config.tags.test_target, "model-wine");
        assert_eq!(config.tags.test_type, "load");
    }

    #[test]
    fn test_platform_suite_runs_default_scenario() {
        let suite = suite_for("platform-mlops", &dev(), Path::new("data")).unwrap();
        let config = suite.run_config(TestType::Smoke).unwrap();

        assert_eq!(config.scenarios.len(), 1);
        assert!(config.scenarios.contains_key("default"));
        assert!(suite.registry().contains("default"));
    }
}
