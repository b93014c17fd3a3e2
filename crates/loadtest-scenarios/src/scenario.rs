//! Scenario trait and entry-point registry

use async_trait::async_trait;
use indexmap::IndexMap;
use loadtest_http::{Checks, HttpClient};
use std::sync::Arc;

/// One unit of per-iteration work
///
/// A scenario issues its request pattern and records named checks. It never
/// fails: transport errors and bad responses become failed checks so the run
/// keeps producing aggregate statistics.
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Scenario name, used in logs
    fn name(&self) -> &str;

    /// Execute a single iteration
    async fn run(&self, client: &HttpClient, checks: &Checks);
}

/// Maps entry-point names (`exec` in scenario specs) to scenario instances
#[derive(Default)]
pub struct ScenarioRegistry {
    entries: IndexMap<String, Arc<dyn Scenario>>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scenario under an entry-point name. Scenario specs without
    /// an explicit `exec` dispatch to `"default"`.
    pub fn register(&mut self, exec: impl Into<String>, scenario: Arc<dyn Scenario>) {
        self.entries.insert(exec.into(), scenario);
    }

    pub fn get(&self, exec: &str) -> Option<Arc<dyn Scenario>> {
        self.entries.get(exec).cloned()
    }

    pub fn contains(&self, exec: &str) -> bool {
        self.entries.contains_key(exec)
    }

    pub fn entry_points(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopScenario;

    #[async_trait]
    impl Scenario for NoopScenario {
        fn name(&self) -> &str {
            "noop"
        }

        async fn run(&self, _client: &HttpClient, _checks: &Checks) {}
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = ScenarioRegistry::new();
        registry.register("testHealth", Arc::new(NoopScenario));

        assert!(registry.contains("testHealth"));
        assert_eq!(registry.get("testHealth").unwrap().name(), "noop");
        assert!(registry.get("testPredict").is_none());
        assert_eq!(registry.len(), 1);
    }
}
