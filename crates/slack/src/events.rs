//! Inbound Slack payloads: Events API envelopes and interactivity callbacks.

use serde::Deserialize;
use thiserror::Error;

use crate::blocks::{PENDING_ACTION_ID, UNPENDING_ACTION_ID};

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("interactivity form has no `payload` field")]
    MissingPayload,
    #[error("malformed slack payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level body posted to the Events API endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OuterEvent {
    UrlVerification {
        challenge: String,
    },
    EventCallback {
        #[serde(default)]
        event_id: Option<String>,
        event: InnerEvent,
    },
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InnerEvent {
    AppMention(AppMentionEvent),
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AppMentionEvent {
    pub channel: String,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl AppMentionEvent {
    /// Replies go to the existing thread, or start one under the mention.
    pub fn reply_thread_ts(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

impl OuterEvent {
    pub fn parse(body: &[u8]) -> Result<Self, PayloadError> {
        Ok(serde_json::from_slice(body)?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InteractivityForm {
    pub payload: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    BlockActions(BlockActionsPayload),
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BlockActionsPayload {
    pub channel: ChannelRef,
    pub message: MessageRef,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub actions: Vec<BlockAction>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChannelRef {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MessageRef {
    pub ts: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UserRef {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BlockAction {
    pub action_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl InteractionPayload {
    /// Decodes the `payload` field of an `application/x-www-form-urlencoded`
    /// interactivity body.
    pub fn from_form(form: &InteractivityForm) -> Result<Self, PayloadError> {
        let payload = form.payload.as_deref().ok_or(PayloadError::MissingPayload)?;
        Ok(serde_json::from_str(payload)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewAction {
    MarkPending,
    ClearPending,
}

impl ReviewAction {
    pub fn from_action_id(action_id: &str) -> Option<Self> {
        match action_id {
            PENDING_ACTION_ID => Some(Self::MarkPending),
            UNPENDING_ACTION_ID => Some(Self::ClearPending),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::MarkPending => "mark_pending",
            Self::ClearPending => "clear_pending",
        }
    }
}

impl BlockActionsPayload {
    /// First review button pressed in this callback, with its proposal id value.
    pub fn review_action(&self) -> Option<(ReviewAction, &str)> {
        self.actions.iter().find_map(|action| {
            let kind = ReviewAction::from_action_id(&action.action_id)?;
            Some((kind, action.value.as_deref()?))
        })
    }
}
