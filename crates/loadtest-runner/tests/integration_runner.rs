//! Integration tests for the load-test runner
//!
//! Drives real HTTP traffic against a local canned-response server and
//! verifies the collected summary and threshold evaluation end to end.

use async_trait::async_trait;
use indexmap::IndexMap;
use loadtest_core::{build_options, Executor, ScenarioOverride, Stage};
use loadtest_http::{Checks, HttpClient};
use loadtest_runner::{evaluate, Runner, RunnerError};
use loadtest_scenarios::{Scenario, ScenarioRegistry};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

/// Minimal HTTP server answering every request with a fixed JSON body
fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            std::thread::spawn(move || {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let body = r#"{"status":"ok","prediction":1}"#;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            });
        }
    });
    format!("http://{addr}")
}

struct ProbeScenario {
    url: String,
}

#[async_trait]
impl Scenario for ProbeScenario {
    fn name(&self) -> &str {
        "probe"
    }

    async fn run(&self, client: &HttpClient, checks: &Checks) {
        let res = client.get(&self.url, "probe").await;
        checks.check_health(&res, "probe");
        checks.check_json_field(&res, "probe", "status");
    }
}

fn probe_registry(base: &str) -> ScenarioRegistry {
    let mut registry = ScenarioRegistry::new();
    registry.register(
        "probe",
        Arc::new(ProbeScenario {
            url: format!("{base}/health"),
        }),
    );
    registry
}

#[tokio::test]
async fn test_constant_vus_run_end_to_end() {
    let base = spawn_server();

    let mut overrides = IndexMap::new();
    overrides.insert(
        "probe".to_string(),
        ScenarioOverride {
            vus: Some(2),
            duration: Some(Duration::from_millis(400)),
            exec: Some("probe".to_string()),
            ..ScenarioOverride::default()
        },
    );
    let config = build_options("smoke", "integration", Some(overrides), None).unwrap();

    let client = HttpClient::new(false).unwrap();
    let summary = Runner::new(config.clone(), probe_registry(&base), client)
        .with_think_time(Duration::from_millis(10))
        .run()
        .await
        .unwrap();

    assert!(summary.http_reqs > 0);
    assert_eq!(summary.http_req_failed, 0);
    assert!(summary.checks.pass_rate() > 0.99);
    assert!(summary.scenarios.contains_key("probe"));
    assert_eq!(summary.test_type, "smoke");
    assert_eq!(summary.test_target, "integration");

    // the smoke thresholds hold against a healthy local server
    let outcomes = evaluate(&config.thresholds, &summary).unwrap();
    assert!(!outcomes.is_empty());
    assert!(outcomes.iter().all(|o| o.passed), "{outcomes:?}");
}

#[tokio::test]
async fn test_arrival_rate_paces_requests() {
    let base = spawn_server();

    let mut overrides = IndexMap::new();
    overrides.insert(
        "paced".to_string(),
        ScenarioOverride {
            executor: Some(Executor::RampingArrivalRate),
            start_rate: Some(20),
            time_unit: Some(Duration::from_secs(1)),
            max_vus: Some(10),
            stages: Some(vec![Stage::new(Duration::from_millis(500), 20)]),
            exec: Some("probe".to_string()),
            ..ScenarioOverride::default()
        },
    );
    let config = build_options("breakpoint", "integration", Some(overrides), None).unwrap();

    let client = HttpClient::new(false).unwrap();
    let summary = Runner::new(config, probe_registry(&base), client)
        .run()
        .await
        .unwrap();

    // ~20 req/s over 500ms, minus scheduling slack
    assert!(summary.http_reqs >= 3, "only {} requests", summary.http_reqs);
    assert_eq!(summary.http_req_failed, 0);
}

#[tokio::test]
async fn test_unknown_entry_point_fails_fast() {
    let config = build_options("smoke", "integration", None, None).unwrap();
    let registry = ScenarioRegistry::new(); // nothing registered for "default"
    let client = HttpClient::new(false).unwrap();

    let err = Runner::new(config, registry, client).run().await.unwrap_err();
    assert_eq!(err, RunnerError::UnknownEntryPoint("default".to_string()));
}

#[tokio::test]
async fn test_transport_failures_become_failed_checks() {
    // no server listening on this port
    let mut overrides = IndexMap::new();
    overrides.insert(
        "probe".to_string(),
        ScenarioOverride {
            vus: Some(1),
            duration: Some(Duration::from_millis(150)),
            exec: Some("probe".to_string()),
            ..ScenarioOverride::default()
        },
    );
    let config = build_options("smoke", "integration", Some(overrides), None).unwrap();

    let client = HttpClient::new(false).unwrap();
    let summary = Runner::new(config, probe_registry("http://127.0.0.1:9"), client)
        .with_think_time(Duration::from_millis(50))
        .run()
        .await
        .unwrap();

    // the run completes; failures surface as metrics and failed checks
    assert!(summary.http_reqs > 0);
    assert_eq!(summary.http_req_failed, summary.http_reqs);
    assert!(summary.checks.pass_rate() < 0.5);
}
