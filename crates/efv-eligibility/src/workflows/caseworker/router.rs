use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::dashboard::{CaseWorkerDashboard, DashboardTab};
use super::queue::ApplicationsQueue;

/// View state carried in the query string: comma-separated expanded factor ids and the tab.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub expanded: Option<String>,
    #[serde(default)]
    pub tab: Option<String>,
}

pub fn caseworker_router() -> Router {
    Router::new()
        .route("/api/v1/caseworker/dashboard", get(dashboard_handler))
        .route("/api/v1/caseworker/applications", get(applications_handler))
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": message }))).into_response()
}

pub(crate) async fn dashboard_handler(Query(query): Query<DashboardQuery>) -> Response {
    let mut dashboard = CaseWorkerDashboard::new();

    if let Some(tab) = query.tab.as_deref() {
        match tab.parse::<DashboardTab>() {
            Ok(tab) => dashboard.select_tab(tab),
            Err(error) => return bad_request(error.to_string()),
        }
    }

    let expanded = query.expanded.as_deref().unwrap_or_default();
    for id in expanded.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !dashboard.toggle_expanded(id) {
            return bad_request(format!("unknown verification factor `{id}`"));
        }
    }

    (StatusCode::OK, axum::Json(dashboard.view())).into_response()
}

pub(crate) async fn applications_handler() -> Response {
    let queue = ApplicationsQueue::new();
    let payload = json!({
        "applications": queue.applications(),
        "stats": queue.stats(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
