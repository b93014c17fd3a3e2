//! Base LLM model scenarios (qwen-0.5b)
//!
//! OpenAI-compatible API served by vLLM. Chat completions run with a raised
//! per-request timeout since generation routinely exceeds the suite default.

use crate::scenario::Scenario;
use crate::suite::{SuiteError, TestSuite};
use async_trait::async_trait;
use loadtest_env::{Environment, BASE_MODEL_ENDPOINTS};
use loadtest_http::{load_json_fixture, random_sample, Checks, HttpClient};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout for chat completions
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

/// Tokens requested per completion; small to keep load iterations bounded
const MAX_TOKENS: u32 = 50;

/// Lists served models via `/models` as the health probe
pub struct ModelListScenario {
    service: String,
    models_url: String,
}

impl ModelListScenario {
    pub fn new(service: &str, base_url: &str) -> Self {
        Self {
            service: service.to_string(),
            models_url: format!("{}{}", base_url, BASE_MODEL_ENDPOINTS.models),
        }
    }
}

#[async_trait]
impl Scenario for ModelListScenario {
    fn name(&self) -> &str {
        &self.service
    }

    async fn run(&self, client: &HttpClient, checks: &Checks) {
        let name = format!("{}-models", self.service);
        let res = client.get(&self.models_url, &name).await;
        checks.check_health(&res, &name);
        checks.check_json_field(&res, &name, "data");
    }
}

/// Sends a sampled prompt through `/chat/completions`
pub struct ChatCompletionScenario {
    service: String,
    model: String,
    chat_url: String,
    prompts: Vec<String>,
}

impl ChatCompletionScenario {
    pub fn new(service: &str, model: &str, base_url: &str, prompts: Vec<String>) -> Self {
        Self {
            service: service.to_string(),
            model: model.to_string(),
            chat_url: format!("{}{}", base_url, BASE_MODEL_ENDPOINTS.chat),
            prompts,
        }
    }
}

#[async_trait]
impl Scenario for ChatCompletionScenario {
    fn name(&self) -> &str {
        &self.service
    }

    async fn run(&self, client: &HttpClient, checks: &Checks) {
        let Ok(prompt) = random_sample(&self.prompts) else {
            debug!(service = %self.service, "no prompts loaded, skipping iteration");
            return;
        };
        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": MAX_TOKENS,
        });
        let name = format!("{}-chat", self.service);
        let res = client
            .post_json_with(&self.chat_url, &payload, &name, COMPLETION_TIMEOUT)
            .await;
        checks.check_completion(&res, &name);
    }
}

/// Extract prompt strings from fixture items (`{"prompt": "..."}` or bare strings)
fn prompt_strings(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            other => other
                .get("prompt")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
        .collect()
}

/// Qwen 0.5B: small, fast LLM for completion load testing
pub fn qwen_suite(env: &Environment, data_dir: &Path) -> Result<TestSuite, SuiteError> {
    let base_url = env.base_model_url("qwen-0.5b")?;
    let prompts = prompt_strings(load_json_fixture(data_dir.join("qwen-prompts.json")));

    let mut suite = TestSuite::new("model-qwen");
    suite.register("testHealth", Arc::new(ModelListScenario::new("qwen", &base_url)));
    suite.register(
        "testCompletion",
        Arc::new(ChatCompletionScenario::new("qwen", "qwen-0.5b", &base_url, prompts)),
    );
    suite.add_scenario("qwen-health", "testHealth");
    suite.add_scenario("qwen-completion", "testCompletion");
    suite.add_threshold("http_req_duration{scenario:qwen-health}", &["p(95)<2000"]);
    // LLM generation is slow by design
    suite.add_threshold("http_req_duration{scenario:qwen-completion}", &["p(95)<30000"]);
    Ok(suite)
}
