//! # OpenCloudHub Load Test HTTP Helpers
//!
//! Thin request layer shared by every scenario:
//! - `HttpClient` - reqwest wrapper with the suite's default timeout and TLS
//!   policy; transport failures degrade to a status-0 response instead of an
//!   error so they surface as failed checks, never aborted iterations
//! - `Checks` - named boolean assertions with consistent labels
//!   (`wine-health: status OK`), recorded into a shared registry
//! - fixture loading and sampling for request payloads

pub mod checks;
pub mod client;
pub mod data;

pub use checks::{CheckCounter, CheckReport, Checks};
pub use client::{HttpClient, HttpError, HttpResponse, RequestObserver, DEFAULT_TIMEOUT};
pub use data::{load_json_fixture, random_sample, sequential_sample, DataError};
