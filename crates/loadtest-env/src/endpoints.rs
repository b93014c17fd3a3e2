//! Endpoint catalog: relative path patterns per service type
//!
//! Central catalog of the paths each service type exposes, so test suites hit
//! consistent endpoints. Endpoint availability may vary with service
//! configuration; health sweeps fall back to the root path when a service has
//! no dedicated health endpoint.

/// Custom ML model servers (FastAPI behind the gateway, consistent contract)
#[derive(Clone, Copy, Debug)]
pub struct CustomModelEndpoints {
    pub root: &'static str,
    pub health: &'static str,
    pub info: &'static str,
    pub predict: &'static str,
    pub docs: &'static str,
    pub openapi: &'static str,
}

pub const CUSTOM_MODEL_ENDPOINTS: CustomModelEndpoints = CustomModelEndpoints {
    root: "/",
    health: "/health",
    info: "/info",
    predict: "/predict",
    docs: "/docs",
    openapi: "/openapi.json",
};

/// Base LLM servers (OpenAI-compatible API, vLLM inference engine)
#[derive(Clone, Copy, Debug)]
pub struct BaseModelEndpoints {
    pub models: &'static str,
    pub completions: &'static str,
    pub chat: &'static str,
}

pub const BASE_MODEL_ENDPOINTS: BaseModelEndpoints = BaseModelEndpoints {
    models: "/models",
    completions: "/completions",
    chat: "/chat/completions",
};

/// RAG-powered demo backend application
#[derive(Clone, Copy, Debug)]
pub struct DemoBackendEndpoints {
    pub root: &'static str,
    pub health: &'static str,
    pub docs: &'static str,
    pub prompt: &'static str,
    pub query: &'static str,
    pub reload_prompt: &'static str,
}

pub const DEMO_BACKEND_ENDPOINTS: DemoBackendEndpoints = DemoBackendEndpoints {
    root: "/api/",
    health: "/api/health",
    docs: "/api/docs",
    prompt: "/api/prompt",
    query: "/api/query",
    reload_prompt: "/api/admin/reload-prompt",
};

/// Paths exposed by one platform service
#[derive(Clone, Copy, Debug)]
pub struct PlatformEndpoints {
    pub root: &'static str,
    pub health: Option<&'static str>,
    pub api: Option<&'static str>,
}

/// Endpoint set for a platform service, by registry name
pub fn platform_endpoints(service: &str) -> Option<PlatformEndpoints> {
    let endpoints = match service {
        "mlflow" => PlatformEndpoints {
            root: "/",
            health: Some("/health"),
            api: Some("/api/2.0/mlflow/experiments/search"),
        },
        "argocd" => PlatformEndpoints {
            root: "/",
            health: Some("/healthz"),
            api: Some("/api/version"),
        },
        "argo-workflows" => PlatformEndpoints {
            root: "/",
            health: Some("/healthz"),
            api: None,
        },
        "minio-console" => PlatformEndpoints {
            root: "/",
            health: None,
            api: None,
        },
        "minio-api" => PlatformEndpoints {
            root: "/",
            health: Some("/minio/health/live"),
            api: None,
        },
        "grafana" => PlatformEndpoints {
            root: "/",
            health: Some("/api/health"),
            api: None,
        },
        "pgadmin" => PlatformEndpoints {
            root: "/",
            health: None,
            api: None,
        },
        _ => return None,
    };
    Some(endpoints)
}
