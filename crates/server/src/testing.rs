//! Proposal fixtures and an in-memory proposal source for server tests.

use std::sync::Mutex;

use async_trait::async_trait;
use cfpbot_core::domain::proposal::{Proposal, ProposalId};
use serde_json::{json, Value};

use crate::fortee::{ForteeError, ProposalSource};

pub const VALID_ID: &str = "3f0c6a52-8d1e-4b7a-9c2e-5a1b2c3d4e5f";
pub const INVALID_ID: &str = "00000000-0000-0000-0000-000000000001";
pub const BASE_URL: &str = "https://fortee.jp/platform-engineering-kaigi-2025";

const COMPLETE_READING: &str =
    "■お名前の呼び方（カナ）□サトウ ハナコ■会社名/所属団体名 - Company/Organizations□Example Inc.■役職 - Job Title□SRE";
const MISSING_JOB_TITLE: &str =
    "■お名前の呼び方（カナ）□サトウ ハナコ■会社名/所属団体名 - Company/Organizations□Example Inc.■役職 - Job Title□";
const ABSTRACT: &str = "■スピーカープロフィール (200文字以内) - Biography (Less than 400 letters)□\r\nPlatform engineer.\r\n■ トーク概要 (400文字以内) - Abstract (Less than 800 letters)□\r\nGolden paths in practice.";

/// `valid` picks a reading block with or without the job title.
pub fn proposal_json(id: &str, valid: bool) -> Value {
    json!({
        "uuid": id,
        "url": format!("{BASE_URL}/proposal/{id}"),
        "title": "Golden paths",
        "abstract": ABSTRACT,
        "accepted": false,
        "speaker": {
            "name": "Sato Hanako",
            "kana": if valid { COMPLETE_READING } else { MISSING_JOB_TITLE }
        },
        "created": "2025-03-01T10:00:00+09:00",
        "feedback": { "open": false }
    })
}

pub fn proposal(id: &str, valid: bool) -> Proposal {
    serde_json::from_value(proposal_json(id, valid)).expect("fixture decodes")
}

#[derive(Default)]
pub struct StaticProposalSource {
    proposals: Mutex<Vec<Proposal>>,
    failure: Mutex<Option<ForteeError>>,
}

impl StaticProposalSource {
    pub fn new(proposals: Vec<Proposal>) -> Self {
        Self { proposals: Mutex::new(proposals), failure: Mutex::new(None) }
    }

    pub fn failing(error: ForteeError) -> Self {
        Self { proposals: Mutex::new(Vec::new()), failure: Mutex::new(Some(error)) }
    }

    pub fn set_proposals(&self, proposals: Vec<Proposal>) {
        *self.proposals.lock().expect("lock") = proposals;
    }

    fn check_failure(&self) -> Result<(), ForteeError> {
        match self.failure.lock().expect("lock").clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProposalSource for StaticProposalSource {
    async fn fetch_proposal(&self, id: &ProposalId) -> Result<Proposal, ForteeError> {
        self.check_failure()?;
        self.proposals
            .lock()
            .expect("lock")
            .iter()
            .find(|proposal| proposal.uuid == *id)
            .cloned()
            .ok_or(ForteeError::EmptyResponse)
    }

    async fn fetch_all(&self) -> Result<Vec<Proposal>, ForteeError> {
        self.check_failure()?;
        Ok(self.proposals.lock().expect("lock").clone())
    }
}
