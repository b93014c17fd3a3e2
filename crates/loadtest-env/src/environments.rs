//! Environment registry: base URLs per deployment target
//!
//! Two environments are built in. `dev` exercises the full user path through
//! the external ingress routes; `internal` talks to Kubernetes service DNS
//! directly for testing services without the gateway. Additional environments
//! can be supplied as TOML files via [`Environment::from_file`].

use crate::error::{EnvError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment selected when `TEST_ENV` is unset
pub const DEFAULT_ENV: &str = "dev";

/// Process variable naming the active environment
pub const TEST_ENV_VAR: &str = "TEST_ENV";

/// Base URLs for one deployment target
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Registry name of this environment
    pub name: String,

    /// Skip TLS certificate verification (self-signed local clusters)
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,

    /// Model serving routes
    pub models: ModelRoutes,

    /// Platform services, keyed by category then service name
    #[serde(default)]
    pub platform: IndexMap<String, IndexMap<String, String>>,

    /// Team applications
    #[serde(default)]
    pub apps: IndexMap<String, String>,
}

/// Model gateway plus per-model path routing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRoutes {
    /// API gateway base URL for path-based model routing
    pub api: String,

    /// Custom ML models (FastAPI servers behind the gateway)
    #[serde(default)]
    pub custom: IndexMap<String, ModelRoute>,

    /// Base LLM models (OpenAI-compatible servers behind the gateway)
    #[serde(default)]
    pub base: IndexMap<String, ModelRoute>,
}

/// Route of a single deployed model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRoute {
    /// Path prefix on the API gateway
    pub path: String,

    /// Serving dashboard URL, when exposed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<String>,
}

/// One platform service flattened out of the category tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformService {
    pub category: String,
    pub name: String,
    pub url: String,
}

impl Environment {
    /// Look up a built-in environment by name
    pub fn named(name: &str) -> Result<Self> {
        match name {
            "dev" => Ok(dev()),
            "internal" => Ok(internal()),
            other => Err(EnvError::UnknownEnvironment(other.to_string())),
        }
    }

    /// Resolve the environment from `TEST_ENV`, defaulting to `dev`
    pub fn from_env() -> Result<Self> {
        let name = std::env::var(TEST_ENV_VAR).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        Self::named(&name)
    }

    /// Load an environment definition from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| EnvError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| EnvError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Full URL of a custom model endpoint on the API gateway
    pub fn custom_model_url(&self, name: &str) -> Result<String> {
        let route = self
            .models
            .custom
            .get(name)
            .ok_or_else(|| EnvError::UnknownCustomModel(name.to_string()))?;
        Ok(format!("{}{}", self.models.api, route.path))
    }

    /// Full URL of a base model endpoint on the API gateway
    pub fn base_model_url(&self, name: &str) -> Result<String> {
        let route = self
            .models
            .base
            .get(name)
            .ok_or_else(|| EnvError::UnknownBaseModel(name.to_string()))?;
        Ok(format!("{}{}", self.models.api, route.path))
    }

    /// Platform service URL by category and service name
    pub fn platform_url(&self, category: &str, service: &str) -> Option<&str> {
        self.platform.get(category)?.get(service).map(String::as_str)
    }

    /// All platform services as a flat list, for health sweeps
    pub fn platform_services(&self) -> Vec<PlatformService> {
        let mut services = Vec::new();
        for (category, entries) in &self.platform {
            for (name, url) in entries {
                services.push(PlatformService {
                    category: category.clone(),
                    name: name.clone(),
                    url: url.clone(),
                });
            }
        }
        services
    }

    /// Application URL by name
    pub fn app_url(&self, name: &str) -> Option<&str> {
        self.apps.get(name).map(String::as_str)
    }
}

fn platform_map(
    entries: &[(&str, &[(&str, &str)])],
) -> IndexMap<String, IndexMap<String, String>> {
    entries
        .iter()
        .map(|(category, services)| {
            (
                category.to_string(),
                services
                    .iter()
                    .map(|(name, url)| (name.to_string(), url.to_string()))
                    .collect(),
            )
        })
        .collect()
}

/// External HTTPS routes through the ingress; validates the full user path.
/// Used for both local testing and in-cluster operator runs.
fn dev() -> Environment {
    Environment {
        name: "dev".to_string(),
        insecure_skip_tls_verify: true,
        models: ModelRoutes {
            api: "https://api.opencloudhub.org".to_string(),
            custom: IndexMap::from([
                (
                    "fashion-mnist".to_string(),
                    ModelRoute {
                        path: "/models/custom/fashion-mnist-classifier".to_string(),
                        dashboard: Some(
                            "https://fashion-mnist-classifier.dashboard.opencloudhub.org"
                                .to_string(),
                        ),
                    },
                ),
                (
                    "wine".to_string(),
                    ModelRoute {
                        path: "/models/custom/wine-classifier".to_string(),
                        dashboard: Some(
                            "https://wine-classifier.dashboard.opencloudhub.org".to_string(),
                        ),
                    },
                ),
            ]),
            base: IndexMap::from([(
                "qwen-0.5b".to_string(),
                ModelRoute {
                    path: "/models/base/qwen-0.5b/v1".to_string(),
                    dashboard: Some("https://qwen-0.5b.dashboard.opencloudhub.org".to_string()),
                },
            )]),
        },
        platform: platform_map(&[
            (
                "mlops",
                &[
                    ("mlflow", "https://mlflow.internal.opencloudhub.org"),
                    (
                        "argo-workflows",
                        "https://argo-workflows.internal.opencloudhub.org",
                    ),
                ],
            ),
            ("gitops", &[("argocd", "https://argocd.internal.opencloudhub.org")]),
            (
                "infrastructure",
                &[
                    ("minio-console", "https://minio.internal.opencloudhub.org"),
                    ("minio-api", "https://minio-api.internal.opencloudhub.org"),
                    ("pgadmin", "https://pgadmin.internal.opencloudhub.org"),
                ],
            ),
            (
                "observability",
                &[("grafana", "https://grafana.internal.opencloudhub.org")],
            ),
        ]),
        apps: IndexMap::from([(
            "demo-backend".to_string(),
            "https://demo-app.opencloudhub.org".to_string(),
        )]),
    }
}

/// Direct service DNS, bypassing the gateway and ingress
fn internal() -> Environment {
    Environment {
        name: "internal".to_string(),
        insecure_skip_tls_verify: true,
        models: ModelRoutes {
            api: "http://istio-ingressgateway.istio-ingress.svc.cluster.local".to_string(),
            custom: IndexMap::from([
                (
                    "fashion-mnist".to_string(),
                    ModelRoute {
                        path: "/models/custom/fashion-mnist-classifier".to_string(),
                        dashboard: None,
                    },
                ),
                (
                    "wine".to_string(),
                    ModelRoute {
                        path: "/models/custom/wine-classifier".to_string(),
                        dashboard: None,
                    },
                ),
            ]),
            base: IndexMap::from([(
                "qwen-0.5b".to_string(),
                ModelRoute {
                    path: "/models/base/qwen-0.5b/v1".to_string(),
                    dashboard: None,
                },
            )]),
        },
        platform: platform_map(&[
            (
                "mlops",
                &[
                    ("mlflow", "http://mlflow.mlops.svc.cluster.local:5000"),
                    (
                        "argo-workflows",
                        "http://argo-workflows-server.mlops.svc.cluster.local:2746",
                    ),
                ],
            ),
            (
                "gitops",
                &[("argocd", "http://argocd-server.argocd.svc.cluster.local")],
            ),
            (
                "infrastructure",
                &[
                    (
                        "minio-console",
                        "http://minio-console.minio-tenant.svc.cluster.local:9090",
                    ),
                    ("minio-api", "http://minio.minio-tenant.svc.cluster.local:9000"),
                    ("pgadmin", "http://pgadmin.storage.svc.cluster.local"),
                ],
            ),
            (
                "observability",
                &[("grafana", "http://grafana.observability.svc.cluster.local:3000")],
            ),
        ]),
        apps: IndexMap::from([(
            "demo-backend".to_string(),
            "http://demo-app-backend.demo-app.svc.cluster.local:8000".to_string(),
        )]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_named_environments() {
        assert_eq!(Environment::named("dev").unwrap().name, "dev");
        assert_eq!(Environment::named("internal").unwrap().name, "internal");
        assert!(matches!(
            Environment::named("staging"),
            Err(EnvError::UnknownEnvironment(_))
        ));
    }

    #[test]
    fn test_dev_skips_tls_verification() {
        assert!(Environment::named("dev").unwrap().insecure_skip_tls_verify);
    }

    #[test]
    fn test_custom_model_url() {
        let env = Environment::named("dev").unwrap();
        assert_eq!(
            env.custom_model_url("wine").unwrap(),
            "https://api.opencloudhub.org/models/custom/wine-classifier"
        );
        assert!(matches!(
            env.custom_model_url("bert"),
            Err(EnvError::UnknownCustomModel(_))
        ));
    }

    #[test]
    fn test_base_model_url() {
        let env = Environment::named("internal").unwrap();
        assert_eq!(
            env.base_model_url("qwen-0.5b").unwrap(),
            "http://istio-ingressgateway.istio-ingress.svc.cluster.local/models/base/qwen-0.5b/v1"
        );
        assert!(matches!(
            env.base_model_url("llama"),
            Err(EnvError::UnknownBaseModel(_))
        ));
    }

    #[test]
    fn test_platform_services_flattened() {
        let env = Environment::named("dev").unwrap();
        let services = env.platform_services();
        assert_eq!(services.len(), 7);
        assert!(services
            .iter()
            .any(|s| s.category == "mlops" && s.name == "mlflow"));
        assert!(services
            .iter()
            .any(|s| s.category == "observability" && s.name == "grafana"));
    }

    #[test]
    fn test_platform_url_lookup() {
        let env = Environment::named("internal").unwrap();
        assert_eq!(
            env.platform_url("gitops", "argocd"),
            Some("http://argocd-server.argocd.svc.cluster.local")
        );
        assert_eq!(env.platform_url("gitops", "flux"), None);
        assert_eq!(env.platform_url("netops", "argocd"), None);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
name = "staging"
insecure_skip_tls_verify = false

[models]
api = "https://api.staging.example.org"

[models.custom.wine]
path = "/models/custom/wine-classifier"

[platform.mlops]
mlflow = "https://mlflow.staging.example.org"

[apps]
demo-backend = "https://demo.staging.example.org"
"#
        )
        .unwrap();

        let env = Environment::from_file(file.path()).unwrap();
        assert_eq!(env.name, "staging");
        assert!(!env.insecure_skip_tls_verify);
        assert_eq!(
            env.custom_model_url("wine").unwrap(),
            "https://api.staging.example.org/models/custom/wine-classifier"
        );
        assert_eq!(env.platform_services().len(), 1);
        assert_eq!(env.app_url("demo-backend"), Some("https://demo.staging.example.org"));
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            Environment::from_file("/nonexistent/env.toml"),
            Err(EnvError::Io { .. })
        ));
    }
}
