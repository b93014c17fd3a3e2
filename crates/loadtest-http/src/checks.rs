//! Named check functions with consistent labels
//!
//! Checks wrap boolean assertions with stable names (`wine-health: status OK`)
//! so results aggregate cleanly across iterations and filter well on
//! dashboards. A failing check is a recorded data point, never an abort; the
//! iteration and the run continue.

use crate::client::HttpResponse;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Pass/fail tally for one check name or scope
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CheckCounter {
    pub passes: u64,
    pub fails: u64,
}

impl CheckCounter {
    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.passes as f64 / self.total() as f64
        }
    }
}

#[derive(Default)]
struct CheckState {
    by_name: RwLock<IndexMap<String, CheckCounter>>,
    by_scope: RwLock<IndexMap<String, CheckCounter>>,
}

/// Shared registry of named check outcomes
///
/// Cheap to clone; all clones share one underlying registry. `scoped` clones
/// additionally attribute their outcomes to a scenario name so thresholds can
/// select `checks{scenario:...}`.
#[derive(Clone, Default)]
pub struct Checks {
    state: Arc<CheckState>,
    scope: Option<String>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of this handle attributed to a scenario
    pub fn scoped(&self, scenario: &str) -> Self {
        Self {
            state: self.state.clone(),
            scope: Some(scenario.to_string()),
        }
    }

    /// Record one named outcome; returns `passed` for chaining
    pub fn record(&self, name: impl Into<String>, passed: bool) -> bool {
        let mut by_name = self.state.by_name.write();
        let counter = by_name.entry(name.into()).or_default();
        if passed {
            counter.passes += 1;
        } else {
            counter.fails += 1;
        }
        drop(by_name);

        if let Some(scope) = &self.scope {
            let mut by_scope = self.state.by_scope.write();
            let counter = by_scope.entry(scope.clone()).or_default();
            if passed {
                counter.passes += 1;
            } else {
                counter.fails += 1;
            }
        }
        passed
    }

    /// Snapshot of all recorded outcomes
    pub fn report(&self) -> CheckReport {
        CheckReport {
            by_name: self.state.by_name.read().clone(),
            by_scope: self.state.by_scope.read().clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Standard named checks
    // -------------------------------------------------------------------------

    /// Service responds, returns a success status, and is fast
    pub fn check_health(&self, res: &HttpResponse, service: &str) -> bool {
        let responds = self.record(format!("{service}: responds"), res.responds());
        let status = self.record(format!("{service}: status OK"), res.ok());
        let latency = self.record(
            format!("{service}: latency < 2s"),
            res.duration.as_millis() < 2_000,
        );
        responds && status && latency
    }

    /// Response status matches the expected code
    pub fn check_status(&self, res: &HttpResponse, service: &str, expected: u16) -> bool {
        self.record(format!("{service}: status {expected}"), res.status == expected)
    }

    /// Response time under a threshold
    pub fn check_latency(&self, res: &HttpResponse, service: &str, max_ms: u64) -> bool {
        self.record(
            format!("{service}: latency < {max_ms}ms"),
            res.duration.as_millis() < max_ms as u128,
        )
    }

    /// JSON body contains a field (dot notation for nesting)
    pub fn check_json_field(&self, res: &HttpResponse, service: &str, field: &str) -> bool {
        self.record(
            format!("{service}: has {field}"),
            res.json_field(field).is_some(),
        )
    }

    /// ML model prediction response: status, payload shape, latency
    pub fn check_prediction(&self, res: &HttpResponse, service: &str) -> bool {
        let status = self.record(format!("{service}: status 200"), res.status == 200);
        let has_prediction = res
            .json()
            .map(|json| json.get("prediction").is_some() || json.get("predictions").is_some())
            .unwrap_or(false);
        let shape = self.record(format!("{service}: has prediction"), has_prediction);
        let latency = self.record(
            format!("{service}: latency < 5s"),
            res.duration.as_millis() < 5_000,
        );
        status && shape && latency
    }

    /// LLM completion response: status and non-empty choices array
    pub fn check_completion(&self, res: &HttpResponse, service: &str) -> bool {
        let status = self.record(format!("{service}: status 200"), res.status == 200);
        let has_choices = res
            .json_field("choices")
            .and_then(|choices| choices.as_array().map(|a| !a.is_empty()))
            .unwrap_or(false);
        let choices = self.record(format!("{service}: has choices"), has_choices);
        status && choices
    }

    /// The implicit success check attached to plain get/post helpers
    pub fn status_ok(&self, res: &HttpResponse) -> bool {
        self.record(format!("{} status OK", res.name), res.ok())
    }
}

/// Immutable snapshot of check outcomes
#[derive(Clone, Debug, Default, Serialize)]
pub struct CheckReport {
    pub by_name: IndexMap<String, CheckCounter>,
    pub by_scope: IndexMap<String, CheckCounter>,
}

impl CheckReport {
    /// Overall pass rate across every recorded check
    pub fn pass_rate(&self) -> f64 {
        let total: CheckCounter = self.by_name.values().fold(CheckCounter::default(), |acc, c| {
            CheckCounter {
                passes: acc.passes + c.passes,
                fails: acc.fails + c.fails,
            }
        });
        total.pass_rate()
    }

    /// Pass rate of the checks recorded under one scenario scope
    pub fn scope_rate(&self, scenario: &str) -> Option<f64> {
        self.by_scope.get(scenario).map(CheckCounter::pass_rate)
    }

    pub fn total(&self) -> u64 {
        self.by_name.values().map(CheckCounter::total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn response(status: u16, millis: u64, body: &str) -> HttpResponse {
        HttpResponse {
            name: "req".to_string(),
            status,
            duration: Duration::from_millis(millis),
            body: body.as_bytes().to_vec(),
            error: None,
        }
    }

    #[test]
    fn test_check_health_names_and_outcome() {
        let checks = Checks::new();
        assert!(checks.check_health(&response(200, 100, "{}"), "wine-health"));

        let report = checks.report();
        assert_eq!(report.by_name["wine-health: responds"].passes, 1);
        assert_eq!(report.by_name["wine-health: status OK"].passes, 1);
        assert_eq!(report.by_name["wine-health: latency < 2s"].passes, 1);
    }

    #[test]
    fn test_check_health_fails_on_transport_error() {
        let checks = Checks::new();
        let dead = HttpResponse {
            status: 0,
            error: Some("timeout".to_string()),
            ..response(0, 10_000, "")
        };
        assert!(!checks.check_health(&dead, "mlflow-root"));

        let report = checks.report();
        assert_eq!(report.by_name["mlflow-root: responds"].fails, 1);
    }

    #[test]
    fn test_check_prediction_accepts_both_field_names() {
        let checks = Checks::new();
        assert!(checks.check_prediction(&response(200, 50, r#"{"prediction":1}"#), "wine"));
        assert!(checks.check_prediction(&response(200, 50, r#"{"predictions":[1]}"#), "wine"));
        assert!(!checks.check_prediction(&response(200, 50, r#"{"result":1}"#), "wine"));

        let report = checks.report();
        assert_eq!(report.by_name["wine: has prediction"].passes, 2);
        assert_eq!(report.by_name["wine: has prediction"].fails, 1);
    }

    #[test]
    fn test_check_completion() {
        let checks = Checks::new();
        assert!(checks.check_completion(
            &response(200, 900, r#"{"choices":[{"message":{"content":"hi"}}]}"#),
            "qwen-chat"
        ));
        assert!(!checks.check_completion(&response(200, 900, r#"{"choices":[]}"#), "qwen-chat"));
        assert!(!checks.check_completion(&response(500, 900, "oops"), "qwen-chat"));
    }

    #[test]
    fn test_pass_rate_aggregates_all_checks() {
        let checks = Checks::new();
        checks.record("a", true);
        checks.record("a", true);
        checks.record("b", false);
        checks.record("b", true);

        let report = checks.report();
        assert_eq!(report.total(), 4);
        assert!((report.pass_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scoped_outcomes_tracked_per_scenario() {
        let checks = Checks::new();
        let health = checks.scoped("wine-health");
        let predict = checks.scoped("wine-predict");

        health.record("wine-health: status OK", true);
        predict.record("wine-predict: status 200", false);
        predict.record("wine-predict: status 200", true);

        let report = checks.report();
        assert_eq!(report.scope_rate("wine-health"), Some(1.0));
        assert_eq!(report.scope_rate("wine-predict"), Some(0.5));
        assert_eq!(report.scope_rate("unknown"), None);
        // shared registry sees everything
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_status_ok_uses_request_name() {
        let checks = Checks::new();
        let mut res = response(503, 10, "");
        res.name = "minio-console-root".to_string();
        checks.status_ok(&res);
        assert_eq!(checks.report().by_name["minio-console-root status OK"].fails, 1);
    }
}
