use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;

use super::domain::SessionId;
use super::repository::{RepositoryError, SessionRepository};
use super::service::{EligibilityWizardService, WizardServiceError};
use super::validation::{ConsentForm, DisabilityInfoForm, PersonalInfoForm};
use super::wizard::Route;

type SharedService<R> = Arc<EligibilityWizardService<R>>;

const FIELD_ERRORS: &str = "Please correct the highlighted fields";

/// Router builder exposing the applicant wizard over HTTP.
pub fn wizard_router<R>(service: SharedService<R>) -> Router
where
    R: SessionRepository + 'static,
{
    Router::new()
        .route("/api/v1/sessions", post(open_handler::<R>))
        .route(
            "/api/v1/sessions/:session_id",
            get(snapshot_handler::<R>).delete(reset_handler::<R>),
        )
        .route("/api/v1/sessions/:session_id/start", post(start_handler::<R>))
        .route("/api/v1/sessions/:session_id/login", post(login_handler::<R>))
        .route(
            "/api/v1/sessions/:session_id/routes/*route",
            get(route_handler::<R>),
        )
        .route("/api/v1/sessions/:session_id/back", post(back_handler::<R>))
        .route(
            "/api/v1/sessions/:session_id/personal-info",
            get(personal_info_form_handler::<R>).put(personal_info_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/disability-info",
            put(disability_info_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/consent",
            post(consent_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/verification",
            post(start_verification_handler::<R>)
                .get(verification_progress_handler::<R>)
                .delete(cancel_verification_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/results",
            get(results_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/review",
            get(review_handler::<R>).post(submit_review_handler::<R>),
        )
        .route(
            "/api/v1/sessions/:session_id/confirmation",
            get(confirmation_handler::<R>),
        )
        .with_state(service)
}

fn next_step(route: Route) -> Response {
    (StatusCode::OK, axum::Json(json!({ "next": route }))).into_response()
}

pub(crate) fn error_response(error: WizardServiceError) -> Response {
    match error {
        WizardServiceError::PersonalInfo(fields) => {
            let payload = json!({ "error": FIELD_ERRORS, "fields": fields });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        WizardServiceError::DisabilityInfo(fields) => {
            let payload = json!({ "error": FIELD_ERRORS, "fields": fields });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        WizardServiceError::Consent(fields) => {
            let payload = json!({ "error": FIELD_ERRORS, "fields": fields });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        WizardServiceError::Redirect(route) => {
            let payload = json!({
                "error": format!("redirect to {route}"),
                "redirect": route,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        WizardServiceError::Superseded => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        WizardServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "session not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        WizardServiceError::MissingApplicationData | WizardServiceError::Service(_) => {
            let payload = json!({
                "error": error.to_string(),
                "retry_route": Route::Consent,
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        WizardServiceError::Repository(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn open_handler<R>(State(service): State<SharedService<R>>) -> Response
where
    R: SessionRepository + 'static,
{
    match service.open_session() {
        Ok(snapshot) => (StatusCode::CREATED, axum::Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn snapshot_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.snapshot(&SessionId(session_id)) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reset_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.reset(&SessionId(session_id)) {
        Ok(route) => next_step(route),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn start_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.start_application(&SessionId(session_id)) {
        Ok(route) => next_step(route),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn login_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.login(&SessionId(session_id)).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn route_handler<R>(
    State(service): State<SharedService<R>>,
    Path((session_id, route)): Path<(String, String)>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let Some(route) = Route::parse(&route) else {
        let payload = json!({ "error": format!("unknown route `{route}`") });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    };
    match service.navigate(&SessionId(session_id), route) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn back_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.go_back(&SessionId(session_id)) {
        Ok(route) => next_step(route),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn personal_info_form_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.personal_info_form(&SessionId(session_id)) {
        Ok(form) => (StatusCode::OK, axum::Json(form)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn personal_info_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
    axum::Json(form): axum::Json<PersonalInfoForm>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.submit_personal_info(&SessionId(session_id), &form) {
        Ok(route) => next_step(route),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn disability_info_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
    axum::Json(form): axum::Json<DisabilityInfoForm>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.submit_disability_info(&SessionId(session_id), &form) {
        Ok(route) => next_step(route),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn consent_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
    axum::Json(form): axum::Json<ConsentForm>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.give_consent(&SessionId(session_id), &form).await {
        Ok(route) => next_step(route),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn start_verification_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.start_verification(&SessionId(session_id)).await {
        Ok(tracking) => (StatusCode::ACCEPTED, axum::Json(tracking)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn verification_progress_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.verification_progress(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_verification_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.cancel_verification(&SessionId(session_id)) {
        Ok(progress) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn results_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.results(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.review(&SessionId(session_id)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_review_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.submit_review(&SessionId(session_id)) {
        Ok(route) => next_step(route),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn confirmation_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.confirmation(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}
