use cfpbot_core::digest::StatusDigest;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonElement {
    #[serde(rename = "type")]
    element_type: &'static str,
    pub action_id: String,
    pub text: TextObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ButtonElement {
    pub fn new(action_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            element_type: "button",
            action_id: action_id.into(),
            text: TextObject::plain(label),
            style: None,
            value: None,
        }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { block_id: String, text: TextObject },
    Actions { block_id: String, elements: Vec<ButtonElement> },
}

/// Fallback text plus blocks; `fallback_text` is sent as the message `text`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub fallback_text: String,
    pub blocks: Vec<Block>,
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new() }
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Section { block_id: block_id.into(), text: builder.build() });
        self
    }

    pub fn actions<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ActionsBuilder),
    {
        let mut builder = ActionsBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Actions { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { fallback_text: self.fallback_text, blocks: self.blocks }
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
}

impl SectionBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> TextObject {
        self.text.unwrap_or_else(|| TextObject::plain(""))
    }
}

#[derive(Default)]
pub struct ActionsBuilder {
    elements: Vec<ButtonElement>,
}

impl ActionsBuilder {
    pub fn button(&mut self, button: ButtonElement) -> &mut Self {
        self.elements.push(button);
        self
    }

    fn build(self) -> Vec<ButtonElement> {
        self.elements
    }
}

pub const PENDING_ACTION_ID: &str = "pending_proposal";
pub const UNPENDING_ACTION_ID: &str = "unpending_proposal";

/// Who is following up on a rejected proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewerNotice {
    /// Reviewer asked to check the proposal; offers the hold button.
    Assigned(String),
    /// Put on hold; offers the release button.
    Pending(Option<String>),
    /// Nobody on call; plain text only.
    Unassigned,
}

pub fn invalid_proposal_message(
    proposal_id: &str,
    proposal_url: &str,
    violations: &[String],
    notice: &ReviewerNotice,
) -> MessageTemplate {
    let mut text = format!("{proposal_url}\n\n❌ プロポーザルの内容に以下の問題が見つかりました\n\n");
    for violation in violations {
        text.push_str(&format!("• {violation}\n"));
    }
    match notice {
        ReviewerNotice::Assigned(user) => {
            text.push_str(&format!("\n<@{user}> さん、内容の確認をお願いします！🙏"));
        }
        ReviewerNotice::Pending(Some(user)) => {
            text.push_str(&format!("\n<@{user}> さんが保留中です！⛔️"));
        }
        ReviewerNotice::Pending(None) => text.push_str("\n保留中です！⛔️"),
        ReviewerNotice::Unassigned => {}
    }

    let builder = MessageBuilder::new(text.clone()).section("cfp.review.summary.v1", |section| {
        section.mrkdwn(text);
    });

    match notice {
        ReviewerNotice::Assigned(_) => builder
            .actions("cfp.review.actions.v1", |actions| {
                actions.button(
                    ButtonElement::new(PENDING_ACTION_ID, "保留中にする")
                        .style(ButtonStyle::Danger)
                        .value(proposal_id),
                );
            })
            .build(),
        ReviewerNotice::Pending(_) => builder
            .actions("cfp.review.actions.v1", |actions| {
                actions.button(
                    ButtonElement::new(UNPENDING_ACTION_ID, "保留を解除する")
                        .style(ButtonStyle::Primary)
                        .value(proposal_id),
                );
            })
            .build(),
        ReviewerNotice::Unassigned => builder.build(),
    }
}

pub fn fetch_failure_message(proposal_url: &str, error: &str) -> MessageTemplate {
    let text = format!("{proposal_url}\n\n🚨 エラーが発生しました\n\n{error}");
    MessageBuilder::new(text.clone())
        .section("cfp.error.summary.v1", |section| {
            section.mrkdwn(text);
        })
        .build()
}

pub fn valid_proposal_message(title: &str, speaker_name: &str) -> MessageTemplate {
    let text = format!(
        "✅ プロポーザルの内容は有効です\n\n*タイトル* : {title}\n*スピーカー* : {speaker_name}"
    );
    MessageBuilder::new(text.clone())
        .section("cfp.review.valid.v1", |section| {
            section.mrkdwn(text);
        })
        .build()
}

pub fn new_proposal_message(
    bot_user_id: Option<&str>,
    proposal_url: &str,
    title: &str,
    speaker_name: &str,
) -> MessageTemplate {
    let mention = bot_user_id.map(|user| format!("<@{user}>\n")).unwrap_or_default();
    let text = format!(
        "{mention}📣 *新しいプロポーザルが投稿されました！*\n\n{proposal_url}\n*タイトル* ：{title}\n*スピーカー* ：{speaker_name}\n"
    );
    MessageBuilder::new(text.clone())
        .section("cfp.announce.new.v1", |section| {
            section.mrkdwn(text);
        })
        .build()
}

/// Plain-text digest; posted without blocks so the squares stay on one line.
pub fn status_digest_message(digest: &StatusDigest) -> MessageTemplate {
    MessageBuilder::new(format!(
        "📣 *CFPステータスチェック*\n\n{}\n\n*合計: {}件、有効: {}件、保留: {}件、無効: {}件*",
        digest.squares(),
        digest.total(),
        digest.valid,
        digest.pending,
        digest.invalid
    ))
    .build()
}
