use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cfpbot_core::domain::proposal::ProposalId;
use cfpbot_core::errors::{ApplicationError, DomainError};
use cfpbot_slack::events::{InteractionPayload, InteractivityForm, PayloadError};
use tracing::{info, warn};

use super::{failure_response, new_correlation_id, AppState};

pub async fn handle(State(state): State<AppState>, Form(form): Form<InteractivityForm>) -> Response {
    let payload = match InteractionPayload::from_form(&form) {
        Ok(payload) => payload,
        Err(PayloadError::MissingPayload) => {
            return (StatusCode::BAD_REQUEST, "Bad Request: Missing payload").into_response();
        }
        Err(error) => {
            warn!(event_name = "cfp.interactivity.malformed", error = %error, "malformed payload");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let InteractionPayload::BlockActions(payload) = payload else {
        return (StatusCode::OK, "OK").into_response();
    };
    let Some((action, raw_id)) = payload.review_action() else {
        return (StatusCode::OK, "OK").into_response();
    };

    let correlation_id = new_correlation_id();
    let proposal_id = match ProposalId::parse(raw_id) {
        Ok(id) => id,
        Err(_) => {
            let error = DomainError::InvalidProposalId(raw_id.to_string());
            return failure_response(ApplicationError::Domain(error), &correlation_id);
        }
    };
    info!(
        event_name = "cfp.interactivity.review_action",
        correlation_id = %correlation_id,
        proposal_id = %proposal_id,
        action = action.label(),
        user = payload.user.as_ref().map(|user| user.id.as_str()).unwrap_or("unknown"),
        "review button pressed"
    );

    if let Err(error) = state.review.apply_action(action, &proposal_id).await {
        return failure_response(ApplicationError::Persistence(error.to_string()), &correlation_id);
    }
    let message = match state.review.thread_message(&proposal_id).await {
        Ok(message) => message,
        Err(error) => {
            return failure_response(
                ApplicationError::Persistence(error.to_string()),
                &correlation_id,
            )
        }
    };
    if let Err(error) =
        state.slack.update_message(&payload.channel.id, &payload.message.ts, &message).await
    {
        return failure_response(ApplicationError::Integration(error.to_string()), &correlation_id);
    }

    (StatusCode::OK, "OK").into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use cfpbot_core::domain::proposal::ProposalId;
    use cfpbot_db::repositories::ReviewRepository;
    use cfpbot_slack::blocks::{Block, UNPENDING_ACTION_ID};
    use cfpbot_slack::client::RecordedCall;
    use serde_json::json;
    use tower::ServiceExt;

    use super::super::router;
    use super::super::test_support::{body_text, harness, signed_request};
    use crate::testing::{proposal, StaticProposalSource, INVALID_ID, VALID_ID};

    const FORM: &str = "application/x-www-form-urlencoded";

    fn form_body(action_id: &str, value: &str) -> String {
        let payload = json!({
            "type": "block_actions",
            "user": { "id": "U5" },
            "channel": { "id": "C1" },
            "message": { "ts": "1700000000.000300" },
            "actions": [{ "action_id": action_id, "value": value }]
        })
        .to_string();
        format!("payload={}", encode(&payload))
    }

    fn encode(raw: &str) -> String {
        raw.bytes()
            .map(|byte| match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    (byte as char).to_string()
                }
                _ => format!("%{byte:02X}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn pending_button_marks_proposal_and_updates_message() {
        let h = harness(StaticProposalSource::new(vec![proposal(INVALID_ID, false)]), "U7");
        let id = ProposalId::parse(INVALID_ID).expect("uuid");
        h.reviews.put(&id, "U7").await.expect("put");

        let response = router(h.state.clone())
            .oneshot(signed_request(
                "/slack/interactivity",
                FORM,
                &form_body("pending_proposal", INVALID_ID),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");

        assert_eq!(h.reviews.get(&id).await.expect("get").as_deref(), Some("PENDING:U7"));
        let calls = h.slack.calls();
        let [RecordedCall::Update { channel, ts, message }] = calls.as_slice() else {
            panic!("expected one update, got {calls:?}");
        };
        assert_eq!((channel.as_str(), ts.as_str()), ("C1", "1700000000.000300"));
        assert!(message.fallback_text.ends_with("<@U7> さんが保留中です！⛔️"));
        assert!(matches!(
            message.blocks.get(1),
            Some(Block::Actions { elements, .. }) if elements[0].action_id == UNPENDING_ACTION_ID
        ));
    }

    #[tokio::test]
    async fn unpending_a_now_valid_proposal_shows_success() {
        let h = harness(StaticProposalSource::new(vec![proposal(VALID_ID, true)]), "U7");
        let id = ProposalId::parse(VALID_ID).expect("uuid");
        h.reviews.put(&id, "PENDING:U7").await.expect("put");

        router(h.state.clone())
            .oneshot(signed_request(
                "/slack/interactivity",
                FORM,
                &form_body("unpending_proposal", VALID_ID),
            ))
            .await
            .expect("response");

        assert_eq!(h.reviews.get(&id).await.expect("get").as_deref(), Some("U7"));
        assert!(matches!(
            h.slack.calls().as_slice(),
            [RecordedCall::Update { message, .. }] if message.fallback_text.starts_with("✅")
        ));
    }

    #[tokio::test]
    async fn missing_payload_is_a_bad_request() {
        let h = harness(StaticProposalSource::default(), "");
        let response = router(h.state.clone())
            .oneshot(signed_request("/slack/interactivity", FORM, "foo=bar"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Bad Request: Missing payload");
    }

    #[tokio::test]
    async fn unrelated_buttons_are_acknowledged_without_side_effects() {
        let h = harness(StaticProposalSource::default(), "");
        let response = router(h.state.clone())
            .oneshot(signed_request("/slack/interactivity", FORM, &form_body("approve", INVALID_ID)))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(h.slack.calls().is_empty());
    }

    #[tokio::test]
    async fn non_uuid_button_value_is_a_bad_request() {
        let h = harness(StaticProposalSource::default(), "");
        let response = router(h.state.clone())
            .oneshot(signed_request(
                "/slack/interactivity",
                FORM,
                &form_body("pending_proposal", "not-a-uuid"),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(h.slack.calls().is_empty());
    }
}
