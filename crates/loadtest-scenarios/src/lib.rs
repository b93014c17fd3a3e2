//! # OpenCloudHub Load Test Scenarios
//!
//! Per-service iteration logic for every test target on the platform:
//! - custom ML models (wine, fashion-mnist): health/info probes and
//!   prediction requests fed from sample fixtures
//! - base LLM models (qwen-0.5b): model listing and chat completions
//!   against the OpenAI-compatible API
//! - platform services (MLflow, ArgoCD, MinIO, Grafana, ...): health sweeps
//! - demo RAG backend: health probes and prompt queries
//!
//! A [`TestSuite`] bundles a target's scenarios with its run-configuration
//! recipe; [`suite_for`] resolves a target name against the active
//! environment.

pub mod base_model;
pub mod custom_model;
pub mod demo_app;
pub mod platform;
pub mod scenario;
pub mod suite;

pub use scenario::{Scenario, ScenarioRegistry};
pub use suite::{available_targets, suite_for, SuiteError, TestSuite};
