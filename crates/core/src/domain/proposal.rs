use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub Uuid);

impl ProposalId {
    pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
    pub kana: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub open: bool,
}

/// A proposal as returned by the CFP platform API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub uuid: ProposalId,
    pub url: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub accepted: bool,
    pub speaker: Speaker,
    pub created: String,
    pub feedback: Feedback,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalListResponse {
    pub proposals: Vec<Proposal>,
}

/// The subset of a proposal the validator looks at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: ProposalId,
    pub title: String,
    pub speaker_name: String,
    pub speaker_name_reading: String,
    pub abstract_text: String,
    pub accepted: bool,
}

impl From<&Proposal> for SubmissionRecord {
    fn from(proposal: &Proposal) -> Self {
        Self {
            id: proposal.uuid.clone(),
            title: proposal.title.clone(),
            speaker_name: proposal.speaker.name.clone(),
            speaker_name_reading: proposal.speaker.kana.clone(),
            abstract_text: proposal.abstract_text.clone(),
            accepted: proposal.accepted,
        }
    }
}
