//! Custom ML model scenarios (wine, fashion-mnist)
//!
//! FastAPI model servers behind the gateway with a consistent contract:
//! `/health` and `/info` for probing, `/predict` for inference. Prediction
//! payloads come from the sample fixtures under `data/`.

use crate::scenario::Scenario;
use crate::suite::{SuiteError, TestSuite};
use async_trait::async_trait;
use loadtest_env::{Environment, CUSTOM_MODEL_ENDPOINTS};
use loadtest_http::{load_json_fixture, random_sample, Checks, HttpClient};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Probes `/health` and `/info` of one model server
pub struct ModelHealthScenario {
    service: String,
    base_url: String,
    /// Field expected in the `/info` response (models differ here)
    info_field: &'static str,
}

impl ModelHealthScenario {
    pub fn new(service: &str, base_url: &str, info_field: &'static str) -> Self {
        Self {
            service: service.to_string(),
            base_url: base_url.to_string(),
            info_field,
        }
    }
}

#[async_trait]
impl Scenario for ModelHealthScenario {
    fn name(&self) -> &str {
        &self.service
    }

    async fn run(&self, client: &HttpClient, checks: &Checks) {
        let name = format!("{}-health", self.service);
        let url = format!("{}{}", self.base_url, CUSTOM_MODEL_ENDPOINTS.health);
        let res = client.get(&url, &name).await;
        checks.check_health(&res, &name);

        let name = format!("{}-info", self.service);
        let url = format!("{}{}", self.base_url, CUSTOM_MODEL_ENDPOINTS.info);
        let res = client.get(&url, &name).await;
        checks.check_json_field(&res, &name, self.info_field);
    }
}

/// Sends a sampled payload to `/predict` and validates the response
pub struct ModelPredictScenario {
    service: String,
    predict_url: String,
    payloads: Vec<Value>,
}

impl ModelPredictScenario {
    pub fn new(service: &str, base_url: &str, payloads: Vec<Value>) -> Self {
        Self {
            service: service.to_string(),
            predict_url: format!("{}{}", base_url, CUSTOM_MODEL_ENDPOINTS.predict),
            payloads,
        }
    }
}

#[async_trait]
impl Scenario for ModelPredictScenario {
    fn name(&self) -> &str {
        &self.service
    }

    async fn run(&self, client: &HttpClient, checks: &Checks) {
        let Ok(payload) = random_sample(&self.payloads) else {
            debug!(service = %self.service, "no prediction samples loaded, skipping iteration");
            return;
        };
        let name = format!("{}-predict", self.service);
        let res = client.post_json(&self.predict_url, payload, &name).await;
        checks.check_prediction(&res, &name);
    }
}

/// Wine quality classifier: 13 chemical features in, class prediction out
pub fn wine_suite(env: &Environment, data_dir: &Path) -> Result<TestSuite, SuiteError> {
    let base_url = env.custom_model_url("wine")?;
    let samples = load_json_fixture(data_dir.join("wine.json"));

    let mut suite = TestSuite::new("model-wine");
    suite.register(
        "testHealth",
        Arc::new(ModelHealthScenario::new("wine", &base_url, "model_name")),
    );
    suite.register(
        "testPredict",
        Arc::new(ModelPredictScenario::new("wine", &base_url, samples)),
    );
    suite.add_scenario("wine-health", "testHealth");
    suite.add_scenario("wine-predict", "testPredict");
    suite.add_threshold("http_req_duration{scenario:wine-health}", &["p(95)<2000"]);
    suite.add_threshold("http_req_duration{scenario:wine-predict}", &["p(95)<3000"]);
    Ok(suite)
}

/// Fashion MNIST classifier: 28x28 grayscale images in, class prediction out.
/// The API wraps pixel arrays as `{"images": [[...]]}`.
pub fn fashion_mnist_suite(env: &Environment, data_dir: &Path) -> Result<TestSuite, SuiteError> {
    let base_url = env.custom_model_url("fashion-mnist")?;
    let payloads = load_json_fixture(data_dir.join("fashion-mnist.json"))
        .into_iter()
        .map(|sample| json!({ "images": [sample] }))
        .collect();

    let mut suite = TestSuite::new("model-fashion-mnist");
    suite.register(
        "testHealth",
        Arc::new(ModelHealthScenario::new("fashion", &base_url, "model_uri")),
    );
    suite.register(
        "testPredict",
        Arc::new(ModelPredictScenario::new("fashion", &base_url, payloads)),
    );
    suite.add_scenario("fashion-health", "testHealth");
    suite.add_scenario("fashion-predict", "testPredict");
    suite.add_threshold("http_req_duration{scenario:fashion-health}", &["p(95)<2000"]);
    suite.add_threshold("http_req_duration{scenario:fashion-predict}", &["p(95)<5000"]);
    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadtest_core::TestType;

    #[test]
    fn test_wine_suite_thresholds() {
        let env = Environment::named("dev").unwrap();
        let suite = wine_suite(&env, Path::new("data")).unwrap();
        let config = suite.run_config(TestType::Smoke).unwrap();

        assert_eq!(
            config
                .thresholds
                .get("http_req_duration{scenario:wine-predict}")
                .unwrap(),
            &vec!["p(95)<3000".to_string()]
        );
        // base smoke thresholds still present
        assert_eq!(
            config.thresholds.get("http_req_failed").unwrap(),
            &vec!["rate<0.10".to_string()]
        );
    }

    #[test]
    fn test_fashion_payloads_wrapped_as_images() {
        let samples = vec![json!([0, 128, 255]), json!([1, 2, 3])];
        let payloads: Vec<Value> = samples
            .into_iter()
            .map(|sample| json!({ "images": [sample] }))
            .collect();
        assert_eq!(payloads[0]["images"][0][1], 128);
    }

    #[test]
    fn test_predict_url_shape() {
        let scenario = ModelPredictScenario::new(
            "wine",
            "https://api.opencloudhub.org/models/custom/wine-classifier",
            Vec::new(),
        );
        assert_eq!(
            scenario.predict_url,
            "https://api.opencloudhub.org/models/custom/wine-classifier/predict"
        );
    }
}
