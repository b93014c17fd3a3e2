//! Demo RAG backend scenarios
//!
//! FastAPI application demonstrating RAG-based Q&A. Health probes cover the
//! health and root API endpoints; the API scenario sends sampled questions
//! through the prompt endpoint.

use crate::scenario::Scenario;
use crate::suite::{SuiteError, TestSuite};
use async_trait::async_trait;
use loadtest_env::{EnvError, Environment, DEMO_BACKEND_ENDPOINTS};
use loadtest_http::{load_json_fixture, random_sample, Checks, HttpClient};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Probes `/api/health` and `/api/`
pub struct BackendHealthScenario {
    health_url: String,
    root_url: String,
}

impl BackendHealthScenario {
    pub fn new(base_url: &str) -> Self {
        Self {
            health_url: format!("{}{}", base_url, DEMO_BACKEND_ENDPOINTS.health),
            root_url: format!("{}{}", base_url, DEMO_BACKEND_ENDPOINTS.root),
        }
    }
}

#[async_trait]
impl Scenario for BackendHealthScenario {
    fn name(&self) -> &str {
        "backend-health"
    }

    async fn run(&self, client: &HttpClient, checks: &Checks) {
        let res = client.get(&self.health_url, "backend-health").await;
        checks.check_health(&res, "backend-health");

        let res = client.get(&self.root_url, "backend-root").await;
        checks.check_status(&res, "backend-root", 200);
    }
}

/// Sends a sampled question through the prompt endpoint
pub struct BackendPromptScenario {
    prompt_url: String,
    queries: Vec<Value>,
}

impl BackendPromptScenario {
    pub fn new(base_url: &str, queries: Vec<Value>) -> Self {
        Self {
            prompt_url: format!("{}{}", base_url, DEMO_BACKEND_ENDPOINTS.prompt),
            queries,
        }
    }
}

#[async_trait]
impl Scenario for BackendPromptScenario {
    fn name(&self) -> &str {
        "backend-api"
    }

    async fn run(&self, client: &HttpClient, checks: &Checks) {
        let Ok(query) = random_sample(&self.queries) else {
            debug!("no RAG queries loaded, skipping iteration");
            return;
        };
        // Fixture items are either {"query": "..."} objects or bare strings.
        let payload = match query {
            Value::String(q) => json!({ "query": q }),
            other => other.clone(),
        };
        let res = client.post_json(&self.prompt_url, &payload, "backend-prompt").await;
        checks.check_status(&res, "backend-prompt", 200);
    }
}

/// Demo backend suite: health plus prompt traffic
pub fn backend_suite(env: &Environment, data_dir: &Path) -> Result<TestSuite, SuiteError> {
    let base_url = env
        .app_url("demo-backend")
        .ok_or_else(|| EnvError::UnknownApp("demo-backend".to_string()))?
        .to_string();
    let queries = load_json_fixture(data_dir.join("rag-queries.json"));

    let mut suite = TestSuite::new("app-backend");
    suite.register("testHealth", Arc::new(BackendHealthScenario::new(&base_url)));
    suite.register(
        "testApi",
        Arc::new(BackendPromptScenario::new(&base_url, queries)),
    );
    suite.add_scenario("backend-health", "testHealth");
    suite.add_scenario("backend-api", "testApi");
    suite.add_threshold("http_req_duration{scenario:backend-health}", &["p(95)<2000"]);
    suite.add_threshold("http_req_duration{scenario:backend-api}", &["p(95)<5000"]);
    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadtest_core::TestType;

    #[test]
    fn test_urls_are_api_prefixed() {
        let scenario = BackendHealthScenario::new("https://demo-app.opencloudhub.org");
        assert_eq!(
            scenario.health_url,
            "https://demo-app.opencloudhub.org/api/health"
        );
        assert_eq!(scenario.root_url, "https://demo-app.opencloudhub.org/api/");
    }

    #[test]
    fn test_backend_suite_config() {
        let env = Environment::named("dev").unwrap();
        let suite = backend_suite(&env, Path::new("data")).unwrap();
        let config = suite.run_config(TestType::Smoke).unwrap();

        assert_eq!(config.tags.test_target, "app-backend");
        assert_eq!(config.scenarios["backend-api"].exec.as_deref(), Some("testApi"));
        assert_eq!(
            config
                .thresholds
                .get("http_req_duration{scenario:backend-api}")
                .unwrap(),
            &vec!["p(95)<5000".to_string()]
        );
    }
}
