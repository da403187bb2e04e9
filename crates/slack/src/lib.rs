//! Slack integration for the CFP review bot.
//!
//! - **Block Kit** (`blocks`) - message templates for review threads, announcements and digests
//! - **Web API** (`client`) - `chat.postMessage` / `chat.update` behind the `SlackClient` trait
//! - **Signing** (`signature`) - `X-Slack-Signature` verification for inbound requests
//! - **Events** (`events`) - Events API envelopes and interactivity payloads
//!
//! ```text
//! Slack ──signed POST──▶ server routes ──▶ events::OuterEvent / InteractionPayload
//!                                              │
//!   chat.postMessage ◀── SlackClient ◀── blocks::MessageTemplate
//! ```

pub mod blocks;
pub mod client;
pub mod events;
pub mod signature;

pub use blocks::{MessageTemplate, ReviewerNotice};
pub use client::{PostedMessage, SlackApiError, SlackClient, SlackWebClient};
pub use signature::{SignatureError, SignatureVerifier};
