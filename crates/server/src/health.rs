use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    provider: &'static str,
    model: String,
}

impl HealthState {
    pub fn new(provider: &'static str, model: impl Into<String>) -> Self {
        Self { provider, model: model.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub backend: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// Liveness only. The backend is reported as configured, never probed, so a health
/// poll costs no model call.
pub async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: HealthCheck {
            status: "ok",
            detail: "maxim-server runtime initialized".to_string(),
        },
        backend: HealthCheck {
            status: "configured",
            detail: format!("{} ({})", state.provider, state.model),
        },
        checked_at: Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::extract::State;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::health::{health, router, HealthState};

    #[tokio::test]
    async fn health_reports_ok_with_backend_description() {
        let axum::Json(payload) =
            health(State(HealthState::new("groq", "openai/gpt-oss-120b"))).await;

        assert_eq!(payload.status, "ok");
        assert_eq!(payload.service.status, "ok");
        assert_eq!(payload.backend.status, "configured");
        assert_eq!(payload.backend.detail, "groq (openai/gpt-oss-120b)");
        assert!(!payload.checked_at.is_empty());
    }

    #[tokio::test]
    async fn health_route_serves_json() {
        let response = router(HealthState::new("ollama", "llama3.1"))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), 16 * 1024).await.expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["status"], "ok");
    }
}
