//! Slack-facing HTTP routes.
//!
//! - `POST /slack/events`          - Events API (url verification, app mentions)
//! - `POST /slack/interactivity`   - Block Kit button callbacks
//!
//! Both routes sit behind [`verify_slack_signature`].

pub mod events;
pub mod interactivity;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use cfpbot_core::errors::{ApplicationError, InterfaceError};
use cfpbot_slack::client::SlackClient;
use cfpbot_slack::signature::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, warn};

use crate::review::ReviewService;

/// Slack payloads are small; anything larger is rejected before verification.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<SignatureVerifier>,
    pub review: Arc<ReviewService>,
    pub slack: Arc<dyn SlackClient>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/slack/events", post(events::handle))
        .route("/slack/interactivity", post(interactivity::handle))
        .route_layer(middleware::from_fn_with_state(state.clone(), verify_slack_signature))
        .with_state(state)
}

pub async fn verify_slack_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(event_name = "cfp.http.body_rejected", error = %error, "could not read request body");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let header = |name: &str| parts.headers.get(name).and_then(|value| value.to_str().ok());
    if let Err(error) = state.verifier.verify(
        header(TIMESTAMP_HEADER),
        header(SIGNATURE_HEADER),
        &bytes,
        Utc::now().timestamp(),
    ) {
        warn!(
            event_name = "cfp.http.signature_rejected",
            path = %parts.uri.path(),
            error = %error,
            "rejected unsigned slack request"
        );
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub correlation_id: String,
}

/// Logs the failure and maps it to a status code with a user-safe body.
pub fn failure_response(error: ApplicationError, correlation_id: &str) -> Response {
    error!(
        event_name = "cfp.http.request_failed",
        correlation_id,
        error = %error,
        "slack request handling failed"
    );
    let mapped = error.into_interface(correlation_id);
    let status = match &mapped {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };
    let body = ErrorBody { error: mapped.user_message(), correlation_id: correlation_id.to_string() };
    (status, Json(body)).into_response()
}

pub fn new_correlation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
