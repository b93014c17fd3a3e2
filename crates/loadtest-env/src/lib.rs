//! # OpenCloudHub Load Test Environments
//!
//! Base URLs and endpoint paths for every service the load-testing suite
//! targets, organized by environment:
//! - `dev`      - external HTTPS routes through the ingress (default)
//! - `internal` - direct Kubernetes service DNS, bypassing the gateway
//!
//! The active environment is an explicit [`Environment`] value constructed
//! once at process start (from `TEST_ENV`, a name, or a TOML file) and passed
//! by reference into every component; it is never mutated afterwards.

pub mod endpoints;
pub mod environments;
pub mod error;

pub use endpoints::{
    platform_endpoints, BaseModelEndpoints, CustomModelEndpoints, DemoBackendEndpoints,
    PlatformEndpoints, BASE_MODEL_ENDPOINTS, CUSTOM_MODEL_ENDPOINTS, DEMO_BACKEND_ENDPOINTS,
};
pub use environments::{Environment, ModelRoute, ModelRoutes, PlatformService, DEFAULT_ENV, TEST_ENV_VAR};
pub use error::{EnvError, Result};
