use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cfpbot_core::errors::ApplicationError;
use cfpbot_slack::events::{AppMentionEvent, InnerEvent, OuterEvent};
use serde_json::json;
use tracing::{info, warn};

use super::{failure_response, new_correlation_id, AppState};

/// Set by Slack when it re-delivers an event we were slow to acknowledge.
pub const RETRY_NUM_HEADER: &str = "x-slack-retry-num";

pub async fn handle(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let event = match OuterEvent::parse(&body) {
        Ok(event) => event,
        Err(error) => {
            warn!(event_name = "cfp.events.malformed", error = %error, "malformed events payload");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match event {
        OuterEvent::UrlVerification { challenge } => {
            Json(json!({ "challenge": challenge })).into_response()
        }
        OuterEvent::EventCallback { event_id, event: InnerEvent::AppMention(mention) } => {
            if headers.contains_key(RETRY_NUM_HEADER) {
                info!(
                    event_name = "cfp.events.retry_ignored",
                    event_id = event_id.as_deref().unwrap_or("unknown"),
                    "ignoring redelivered app mention"
                );
                return StatusCode::OK.into_response();
            }
            let correlation_id = event_id.unwrap_or_else(new_correlation_id);
            handle_mention(&state, &mention, &correlation_id).await
        }
        OuterEvent::EventCallback { .. } | OuterEvent::Other => StatusCode::OK.into_response(),
    }
}

async fn handle_mention(state: &AppState, mention: &AppMentionEvent, correlation_id: &str) -> Response {
    let Some(proposal_id) = state.review.links().extract_proposal_id(&mention.text) else {
        return StatusCode::OK.into_response();
    };
    info!(
        event_name = "cfp.events.mention_received",
        correlation_id,
        proposal_id = %proposal_id,
        channel = %mention.channel,
        "validating mentioned proposal"
    );

    let message = match state.review.thread_message(&proposal_id).await {
        Ok(message) => message,
        Err(error) => {
            return failure_response(ApplicationError::Persistence(error.to_string()), correlation_id)
        }
    };

    if let Err(error) = state
        .slack
        .post_message(&mention.channel, &message, Some(mention.reply_thread_ts()))
        .await
    {
        return failure_response(ApplicationError::Integration(error.to_string()), correlation_id);
    }
    StatusCode::OK.into_response()
}
