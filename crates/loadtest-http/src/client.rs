//! HTTP client wrapper with suite defaults
//!
//! Every request carries a name tag (used for check labels and metrics), runs
//! under the 10-second default timeout, and honors the environment's TLS
//! policy. A transport failure does not return an `Err`: it produces a
//! response with status 0 and the error string attached, so per-iteration
//! failures degrade into failed checks while the run keeps going.

use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while constructing the client
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Observer invoked after every completed request, scoped to the scenario
/// the client was handed to. The runner hooks its metrics in here.
pub trait RequestObserver: Send + Sync {
    fn on_response(&self, scenario: Option<&str>, response: &HttpResponse);
}

/// Outcome of one HTTP request
///
/// `status` is 0 when the request never produced a response (connect failure,
/// timeout); `responds()` is the matching check predicate.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Request name tag
    pub name: String,
    /// HTTP status code, 0 on transport failure
    pub status: u16,
    /// Wall-clock time from send to fully read body
    pub duration: Duration,
    /// Raw response body
    pub body: Vec<u8>,
    /// Transport error description, if any
    pub error: Option<String>,
}

impl HttpResponse {
    /// Any response at all arrived
    pub fn responds(&self) -> bool {
        self.status > 0
    }

    /// Success or redirect status
    pub fn ok(&self) -> bool {
        self.status >= 200 && self.status < 400
    }

    /// Body parsed as JSON, if it is JSON
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Navigate a dot-separated path into the JSON body
    pub fn json_field(&self, path: &str) -> Option<Value> {
        let mut current = self.json()?;
        for key in path.split('.') {
            current = current.get(key)?.clone();
        }
        Some(current)
    }
}

/// Reqwest wrapper carrying suite defaults and the scenario scope
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    observer: Option<Arc<dyn RequestObserver>>,
    scope: Option<String>,
}

impl HttpClient {
    /// Build a client with the default timeout and the given TLS policy
    pub fn new(insecure_skip_tls_verify: bool) -> Result<Self, HttpError> {
        let inner = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .danger_accept_invalid_certs(insecure_skip_tls_verify)
            .build()?;
        Ok(Self {
            inner,
            observer: None,
            scope: None,
        })
    }

    /// Attach an observer that sees every completed request
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Clone of this client tagged with a scenario name
    pub fn scoped(&self, scenario: &str) -> Self {
        let mut client = self.clone();
        client.scope = Some(scenario.to_string());
        client
    }

    /// GET request
    pub async fn get(&self, url: &str, name: &str) -> HttpResponse {
        let request = self.inner.get(url);
        self.execute(request, url, name).await
    }

    /// POST with a JSON body
    pub async fn post_json(&self, url: &str, body: &Value, name: &str) -> HttpResponse {
        let request = self.inner.post(url).json(body);
        self.execute(request, url, name).await
    }

    /// POST with a JSON body and a per-request timeout override
    /// (LLM completions routinely exceed the 10s default)
    pub async fn post_json_with(
        &self,
        url: &str,
        body: &Value,
        name: &str,
        timeout: Duration,
    ) -> HttpResponse {
        let request = self.inner.post(url).json(body).timeout(timeout);
        self.execute(request, url, name).await
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        name: &str,
    ) -> HttpResponse {
        let start = Instant::now();
        let response = match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.bytes().await.unwrap_or_default().to_vec();
                debug!(name, url, status, "request complete");
                HttpResponse {
                    name: name.to_string(),
                    status,
                    duration: start.elapsed(),
                    body,
                    error: None,
                }
            }
            Err(e) => {
                warn!(name, url, error = %e, "request failed");
                HttpResponse {
                    name: name.to_string(),
                    status: 0,
                    duration: start.elapsed(),
                    body: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };

        if let Some(observer) = &self.observer {
            observer.on_response(self.scope.as_deref(), &response);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            name: "test".to_string(),
            status,
            duration: Duration::from_millis(42),
            body: body.as_bytes().to_vec(),
            error: None,
        }
    }

    #[test]
    fn test_status_predicates() {
        assert!(response(200, "").ok());
        assert!(response(302, "").ok());
        assert!(!response(404, "").ok());
        assert!(response(404, "").responds());

        let failed = HttpResponse {
            status: 0,
            error: Some("connection refused".to_string()),
            ..response(0, "")
        };
        assert!(!failed.responds());
        assert!(!failed.ok());
    }

    #[test]
    fn test_json_field_navigation() {
        let res = response(200, r#"{"data":{"items":[1,2,3]},"model_name":"wine"}"#);
        assert_eq!(res.json_field("model_name").unwrap(), "wine");
        assert_eq!(res.json_field("data.items").unwrap(), serde_json::json!([1, 2, 3]));
        assert!(res.json_field("data.missing").is_none());
        assert!(res.json_field("nope").is_none());
    }

    #[test]
    fn test_json_of_non_json_body() {
        assert!(response(200, "<html></html>").json().is_none());
    }
}
