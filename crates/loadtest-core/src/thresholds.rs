//! Pass/fail thresholds per test type
//!
//! A threshold maps a metric selector (`http_req_failed`, `http_req_duration`,
//! optionally scoped like `http_req_duration{scenario:wine-predict}`) to one or
//! more predicate expressions (`rate<0.05`, `p(95)<2500`). Multiple predicates
//! for one selector are ANDed. The values here are tuned for local
//! Kind/Minikube clusters and may need adjustment for production targets.

use crate::profile::TestType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of metric selector -> predicate expressions
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdSet(IndexMap<String, Vec<String>>);

impl ThresholdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the predicates for a selector
    pub fn insert(&mut self, selector: impl Into<String>, predicates: &[&str]) {
        self.0.insert(
            selector.into(),
            predicates.iter().map(|p| p.to_string()).collect(),
        );
    }

    /// Overlay caller-supplied thresholds: overlapping selectors are fully
    /// replaced by the caller's value, never combined.
    pub fn overlay(&mut self, extra: &ThresholdSet) {
        for (selector, predicates) in &extra.0 {
            self.0.insert(selector.clone(), predicates.clone());
        }
    }

    pub fn get(&self, selector: &str) -> Option<&Vec<String>> {
        self.0.get(selector)
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.0.contains_key(selector)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build a `ThresholdSet` from selector/predicate pairs
pub fn threshold_set(entries: &[(&str, &[&str])]) -> ThresholdSet {
    let mut set = ThresholdSet::new();
    for (selector, predicates) in entries {
        set.insert(*selector, predicates);
    }
    set
}

impl TestType {
    /// Base pass/fail thresholds for this test type
    pub fn thresholds(&self) -> ThresholdSet {
        match self {
            TestType::Smoke => threshold_set(&[
                ("http_req_failed", &["rate<0.10"]),
                ("http_req_duration", &["p(95)<3000"]),
                ("checks", &["rate>0.90"]),
            ]),
            TestType::Load => threshold_set(&[
                ("http_req_failed", &["rate<0.05"]),
                ("http_req_duration", &["p(95)<2500"]),
                ("http_reqs", &["rate>5"]),
                ("checks", &["rate>0.90"]),
            ]),
            TestType::Stress => threshold_set(&[
                ("http_req_failed", &["rate<0.10"]),
                ("http_req_duration", &["p(95)<4000"]),
                ("checks", &["rate>0.85"]),
            ]),
            TestType::Spike => threshold_set(&[
                ("http_req_failed", &["rate<0.15"]),
                ("http_req_duration", &["p(95)<5000"]),
                ("checks", &["rate>0.80"]),
            ]),
            TestType::Soak => threshold_set(&[
                ("http_req_failed", &["rate<0.05"]),
                ("http_req_duration", &["p(95)<3000"]),
                ("checks", &["rate>0.90"]),
            ]),
            TestType::Breakpoint => threshold_set(&[
                ("http_req_failed", &["rate<0.50"]),
                ("http_req_duration", &["p(95)<10000"]),
                ("checks", &["rate>0.50"]),
            ]),
        }
    }
}
