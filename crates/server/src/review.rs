//! Proposal review workflow: fetch, validate, assign a reviewer and render
//! the Slack thread message.

use std::collections::HashMap;
use std::sync::Arc;

use cfpbot_core::domain::proposal::{Proposal, ProposalId, SubmissionRecord};
use cfpbot_core::links::ProposalLinks;
use cfpbot_core::review::{clear_pending, mark_pending, OncallRoster, ReviewStatus};
use cfpbot_core::validation::{ValidationOutcome, Validator, Violation};
use cfpbot_db::repositories::{RepositoryError, ReviewRepository};
use cfpbot_slack::blocks::{
    fetch_failure_message, invalid_proposal_message, valid_proposal_message, MessageTemplate,
    ReviewerNotice,
};
use cfpbot_slack::events::ReviewAction;
use tracing::info;

use crate::fortee::{ForteeError, ProposalSource};

/// Why a proposal could not be accepted.
#[derive(Clone, Copy, Debug)]
pub enum ProposalFailure<'a> {
    Violations(&'a [Violation]),
    Fetch(&'a ForteeError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProposalCheck {
    Valid(SubmissionRecord),
    Rejected(Vec<Violation>),
    FetchFailed(ForteeError),
}

pub struct ReviewService {
    source: Arc<dyn ProposalSource>,
    reviews: Arc<dyn ReviewRepository>,
    roster: OncallRoster,
    links: ProposalLinks,
    validator: Validator,
}

impl ReviewService {
    pub fn new(
        source: Arc<dyn ProposalSource>,
        reviews: Arc<dyn ReviewRepository>,
        roster: OncallRoster,
        links: ProposalLinks,
    ) -> Self {
        Self { source, reviews, roster, links, validator: Validator::default() }
    }

    pub fn links(&self) -> &ProposalLinks {
        &self.links
    }

    pub fn source(&self) -> &Arc<dyn ProposalSource> {
        &self.source
    }

    pub fn validate(&self, proposal: &Proposal) -> ValidationOutcome {
        self.validator.validate(&SubmissionRecord::from(proposal))
    }

    pub async fn check(&self, id: &ProposalId) -> ProposalCheck {
        let proposal = match self.source.fetch_proposal(id).await {
            Ok(proposal) => proposal,
            Err(error) => return ProposalCheck::FetchFailed(error),
        };
        match self.validate(&proposal) {
            ValidationOutcome::Accepted { record } => ProposalCheck::Valid(record.into_record()),
            ValidationOutcome::Rejected { violations } => ProposalCheck::Rejected(violations),
        }
    }

    /// Message posted (or updated) in a proposal's review thread.
    pub async fn thread_message(&self, id: &ProposalId) -> Result<MessageTemplate, RepositoryError> {
        match self.check(id).await {
            ProposalCheck::Valid(record) => {
                Ok(valid_proposal_message(&record.title, &record.speaker_name))
            }
            ProposalCheck::Rejected(violations) => {
                self.invalid_proposal_message(id, ProposalFailure::Violations(&violations)).await
            }
            ProposalCheck::FetchFailed(error) => {
                self.invalid_proposal_message(id, ProposalFailure::Fetch(&error)).await
            }
        }
    }

    /// Fetch failures never touch the review store. Violations assign a random
    /// on-call reviewer when none is recorded yet, keeping the pending flag.
    pub async fn invalid_proposal_message(
        &self,
        id: &ProposalId,
        failure: ProposalFailure<'_>,
    ) -> Result<MessageTemplate, RepositoryError> {
        let url = self.links.proposal_url(id);
        let violations = match failure {
            ProposalFailure::Fetch(error) => {
                return Ok(fetch_failure_message(&url, &error.to_string()));
            }
            ProposalFailure::Violations(violations) => violations,
        };

        let stored = self.reviews.get(id).await?;
        let mut status = ReviewStatus::parse(stored.as_deref());
        if status.needs_assignment() {
            let picked = self.roster.pick(&mut rand::thread_rng()).map(str::to_string);
            if let Some(reviewer) = picked {
                info!(
                    event_name = "cfp.review.reviewer_assigned",
                    proposal_id = %id,
                    reviewer = %reviewer,
                    "assigned on-call reviewer"
                );
                status.reviewer = Some(reviewer);
                self.reviews.put(id, &status.encode()).await?;
            }
        }

        let notice = match (status.pending, status.reviewer) {
            (true, reviewer) => ReviewerNotice::Pending(reviewer),
            (false, Some(reviewer)) => ReviewerNotice::Assigned(reviewer),
            (false, None) => ReviewerNotice::Unassigned,
        };
        let messages: Vec<String> =
            violations.iter().map(|violation| violation.message.clone()).collect();
        Ok(invalid_proposal_message(&id.to_string(), &url, &messages, &notice))
    }

    /// Returns whether the stored value changed.
    pub async fn apply_action(
        &self,
        action: ReviewAction,
        id: &ProposalId,
    ) -> Result<bool, RepositoryError> {
        let stored = self.reviews.get(id).await?;
        let next = match action {
            ReviewAction::MarkPending => mark_pending(stored.as_deref()),
            ReviewAction::ClearPending => clear_pending(stored.as_deref()),
        };
        let Some(next) = next else {
            return Ok(false);
        };
        self.reviews.put(id, &next).await?;
        info!(
            event_name = "cfp.review.action_applied",
            proposal_id = %id,
            action = action.label(),
            "review status updated"
        );
        Ok(true)
    }

    pub async fn statuses(
        &self,
        ids: &[ProposalId],
    ) -> Result<HashMap<ProposalId, ReviewStatus>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let stored = self.reviews.get_many(ids).await?;
        Ok(stored
            .into_iter()
            .map(|(id, value)| (id, ReviewStatus::parse(Some(&value))))
            .collect())
    }
}
