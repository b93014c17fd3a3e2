//! # OpenCloudHub Load Test Core
//!
//! Run-configuration model for the OpenCloudHub load-testing suite.
//!
//! This crate provides the declarative building blocks every test suite is
//! assembled from:
//! - `TestType` - the six test shapes (smoke, load, stress, spike, soak, breakpoint)
//! - `LoadProfile` / `Stage` - concurrency and duration shape per test type
//! - `ThresholdSet` - pass/fail predicate expressions keyed by metric selector
//! - `build_options` - merges tables and per-scenario overrides into one `RunConfig`
//!
//! ## Usage
//!
//! ```
//! use loadtest_core::build_options;
//!
//! let config = build_options("smoke", "model-wine", None, None).unwrap();
//! assert_eq!(config.tags.test_type, "smoke");
//! assert!(config.scenarios.contains_key("default"));
//! ```

pub mod duration;
pub mod error;
pub mod options;
pub mod profile;
pub mod thresholds;

pub use duration::{format_duration, parse_duration};
pub use error::{ConfigError, Result};
pub use options::{build_options, RunConfig, RunTags, ScenarioOverride, ScenarioSpec, SCENARIO_STAGGER};
pub use profile::{Executor, LoadProfile, Stage, TestType};
pub use thresholds::{threshold_set, ThresholdSet};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{ConfigError, Result};
    pub use crate::options::{build_options, RunConfig, ScenarioOverride, ScenarioSpec};
    pub use crate::profile::{Executor, LoadProfile, Stage, TestType};
    pub use crate::thresholds::{threshold_set, ThresholdSet};
}
