//! Platform service health sweeps (MLflow, ArgoCD, MinIO, Grafana, ...)
//!
//! One sweep scenario per category. Each service gets a relaxed root probe
//! (any response counts as "responds") plus its dedicated health endpoint
//! when the catalog lists one. Latency checks only apply once a probe
//! succeeded, so a down service fails one check instead of three.

use crate::scenario::Scenario;
use crate::suite::{SuiteError, TestSuite};
use async_trait::async_trait;
use loadtest_env::{platform_endpoints, Environment};
use loadtest_http::{Checks, HttpClient};
use std::sync::Arc;

/// Root latency budget for dashboard-style services
const ROOT_LATENCY_MS: u64 = 2_000;

/// One service inside a sweep
struct ServiceProbe {
    name: String,
    root_url: String,
    health_url: Option<String>,
}

/// Health sweep across every service of one platform category
pub struct PlatformSweepScenario {
    category: String,
    probes: Vec<ServiceProbe>,
}

impl PlatformSweepScenario {
    fn new(env: &Environment, category: &str) -> Self {
        let probes = env
            .platform_services()
            .into_iter()
            .filter(|service| service.category == category)
            .map(|service| {
                // Services missing from the catalog still get a root probe.
                let endpoints = platform_endpoints(&service.name);
                let root = endpoints.map(|e| e.root).unwrap_or("/");
                ServiceProbe {
                    root_url: format!("{}{}", service.url, root),
                    health_url: endpoints
                        .and_then(|e| e.health)
                        .map(|path| format!("{}{}", service.url, path)),
                    name: service.name,
                }
            })
            .collect();
        Self {
            category: category.to_string(),
            probes,
        }
    }

    pub fn services(&self) -> usize {
        self.probes.len()
    }
}

#[async_trait]
impl Scenario for PlatformSweepScenario {
    fn name(&self) -> &str {
        &self.category
    }

    async fn run(&self, client: &HttpClient, checks: &Checks) {
        for probe in &self.probes {
            let name = format!("{}-root", probe.name);
            let res = client.get(&probe.root_url, &name).await;
            checks.record(format!("{name}: responds"), res.responds());
            let healthy = checks.record(format!("{name}: healthy"), res.ok());
            if healthy {
                checks.check_latency(&res, &name, ROOT_LATENCY_MS);
            }

            if let Some(health_url) = &probe.health_url {
                let name = format!("{}-health", probe.name);
                let res = client.get(health_url, &name).await;
                if checks.status_ok(&res) {
                    checks.check_latency(&res, &name, ROOT_LATENCY_MS);
                }
            }
        }
    }
}

/// Sweep suite for one platform category, running as the default scenario
pub fn platform_suite(env: &Environment, category: &str) -> Result<TestSuite, SuiteError> {
    let sweep = PlatformSweepScenario::new(env, category);
    if sweep.probes.is_empty() {
        return Err(SuiteError::UnknownTarget(format!("platform-{category}")));
    }

    let mut suite = TestSuite::new(format!("platform-{category}"));
    suite.register("default", Arc::new(sweep));
    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_collects_category_services() {
        let env = Environment::named("dev").unwrap();
        let sweep = PlatformSweepScenario::new(&env, "infrastructure");
        assert_eq!(sweep.services(), 3);

        let minio_api = sweep
            .probes
            .iter()
            .find(|p| p.name == "minio-api")
            .unwrap();
        assert_eq!(
            minio_api.health_url.as_deref(),
            Some("https://minio-api.internal.opencloudhub.org/minio/health/live")
        );

        // pgadmin has no dedicated health endpoint
        let pgadmin = sweep.probes.iter().find(|p| p.name == "pgadmin").unwrap();
        assert!(pgadmin.health_url.is_none());
    }

    #[test]
    fn test_unknown_category_fails() {
        let env = Environment::named("dev").unwrap();
        assert!(matches!(
            platform_suite(&env, "netops"),
            Err(SuiteError::UnknownTarget(_))
        ));
    }

    #[test]
    fn test_suite_registers_default_entry_point() {
        let env = Environment::named("dev").unwrap();
        let suite = platform_suite(&env, "observability").unwrap();
        assert!(suite.registry().contains("default"));
        assert_eq!(suite.target(), "platform-observability");
    }
}
