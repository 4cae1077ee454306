use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use efv_eligibility::workflows::applicant::{
    wizard_router, EligibilityWizardService, SessionRepository,
};
use efv_eligibility::workflows::caseworker::caseworker_router;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct MockDataResponse {
    pub(crate) message: &'static str,
    pub(crate) generated_at: DateTime<Utc>,
}

pub(crate) fn with_eligibility_routes<R>(service: Arc<EligibilityWizardService<R>>) -> Router
where
    R: SessionRepository + 'static,
{
    wizard_router(service)
        .merge(caseworker_router())
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/data", get(mock_data_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn mock_data_endpoint() -> Json<MockDataResponse> {
    Json(MockDataResponse {
        message: "Mock data endpoint",
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemorySessionRepository;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use efv_eligibility::config::{LatencyProfile, MockConfig};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    fn app() -> Router {
        let mocks = MockConfig {
            latency: LatencyProfile::Instant,
            ..MockConfig::default()
        };
        let service = EligibilityWizardService::from_config(
            Arc::new(InMemorySessionRepository::default()),
            &mocks,
        );
        with_eligibility_routes(Arc::new(service)).layer(Extension(app_state(true)))
    }

    async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_tracks_flag() {
        let state = app_state(false);
        let response = readiness_endpoint(Extension(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn mock_data_endpoint_returns_message() {
        let (status, body) = send(app(), Method::GET, "/api/v1/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Mock data endpoint");
    }

    #[tokio::test]
    async fn wizard_and_caseworker_routes_are_mounted() {
        let router = app();

        let (status, body) = send(router.clone(), Method::POST, "/api/v1/sessions").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["state"]["current_step"], "landing");

        let (status, body) = send(router, Method::GET, "/api/v1/caseworker/applications").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["total"], 4);
    }
}
