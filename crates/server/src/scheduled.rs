//! Periodic jobs: announce new proposals and post the daily status digest.

use std::sync::Arc;
use std::time::Duration;

use cfpbot_core::config::ScheduleConfig;
use cfpbot_core::digest::{new_submission_ids, StatusDigest};
use cfpbot_core::domain::proposal::ProposalId;
use cfpbot_core::validation::ValidationOutcome;
use cfpbot_db::repositories::{RepositoryError, SnapshotRepository, LAST_PROPOSALS_KEY};
use cfpbot_slack::blocks::{new_proposal_message, status_digest_message};
use cfpbot_slack::client::{SlackApiError, SlackClient};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::fortee::ForteeError;
use crate::review::{ProposalFailure, ReviewService};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("proposal fetch failed: {0}")]
    Fetch(#[from] ForteeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Slack(#[from] SlackApiError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewProposalsReport {
    pub announced: usize,
    pub failed: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DigestReport {
    Skipped,
    Posted { digest: StatusDigest, thread_replies: usize, failed_replies: usize },
}

pub struct ProposalJobs {
    review: Arc<ReviewService>,
    snapshots: Arc<dyn SnapshotRepository>,
    slack: Arc<dyn SlackClient>,
    status_channel: String,
    bot_user_id: Option<String>,
}

impl ProposalJobs {
    pub fn new(
        review: Arc<ReviewService>,
        snapshots: Arc<dyn SnapshotRepository>,
        slack: Arc<dyn SlackClient>,
        status_channel: String,
        bot_user_id: Option<String>,
    ) -> Self {
        Self { review, snapshots, slack, status_channel, bot_user_id }
    }

    /// Announces proposals missing from the last snapshot, then replaces the
    /// snapshot. A failed announcement is logged and does not block the save.
    pub async fn check_new_proposals(&self) -> Result<NewProposalsReport, JobError> {
        let proposals = self.review.source().fetch_all().await?;
        let current: Vec<String> = proposals.iter().map(|proposal| proposal.uuid.to_string()).collect();
        let previous = self.snapshots.load(LAST_PROPOSALS_KEY).await?;
        let fresh = new_submission_ids(&current, &previous);

        let mut report = NewProposalsReport::default();
        if fresh.is_empty() {
            info!(event_name = "cfp.job.new_proposals.none", "no new proposals found");
        }
        for id in &fresh {
            let Some(proposal) = proposals.iter().find(|proposal| proposal.uuid.to_string() == *id)
            else {
                continue;
            };
            let message = new_proposal_message(
                self.bot_user_id.as_deref(),
                &self.review.links().proposal_url(&proposal.uuid),
                &proposal.title,
                &proposal.speaker.name,
            );
            match self.slack.post_message(&self.status_channel, &message, None).await {
                Ok(_) => report.announced += 1,
                Err(error) => {
                    report.failed += 1;
                    error!(
                        event_name = "cfp.job.new_proposals.post_failed",
                        proposal_id = %id,
                        error = %error,
                        "could not announce new proposal"
                    );
                }
            }
        }

        let mut snapshot = Vec::with_capacity(current.len());
        for id in current {
            if !snapshot.contains(&id) {
                snapshot.push(id);
            }
        }
        self.snapshots.save(LAST_PROPOSALS_KEY, &snapshot).await?;
        info!(
            event_name = "cfp.job.new_proposals.completed",
            announced = report.announced,
            failed = report.failed,
            known = snapshot.len(),
            "new proposal check completed"
        );
        Ok(report)
    }

    /// Posts the digest, then one thread reply per rejected proposal.
    pub async fn check_all_proposals_status(&self) -> Result<DigestReport, JobError> {
        let proposals = self.review.source().fetch_all().await?;
        if proposals.is_empty() {
            warn!(
                event_name = "cfp.job.status_digest.skipped",
                "no proposals returned; skipping status digest"
            );
            return Ok(DigestReport::Skipped);
        }

        let outcomes: Vec<(ProposalId, ValidationOutcome)> = proposals
            .iter()
            .map(|proposal| (proposal.uuid.clone(), self.review.validate(proposal)))
            .collect();
        let rejected: Vec<ProposalId> = outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_accepted())
            .map(|(id, _)| id.clone())
            .collect();
        let statuses = self.review.statuses(&rejected).await?;

        let digest = StatusDigest::build(outcomes.iter().map(|(id, outcome)| (id, outcome)), |id| {
            statuses.get(id).cloned().unwrap_or_default()
        });
        let posted = self
            .slack
            .post_message(&self.status_channel, &status_digest_message(&digest), None)
            .await?;

        let mut thread_replies = 0;
        let mut failed_replies = 0;
        for (id, outcome) in outcomes.iter().filter(|(_, outcome)| !outcome.is_accepted()) {
            let failure = ProposalFailure::Violations(outcome.violations());
            let result = match self.review.invalid_proposal_message(id, failure).await {
                Ok(message) => self
                    .slack
                    .post_message(&self.status_channel, &message, Some(&posted.ts))
                    .await
                    .map(|_| ())
                    .map_err(JobError::from),
                Err(error) => Err(JobError::from(error)),
            };
            match result {
                Ok(()) => thread_replies += 1,
                Err(error) => {
                    failed_replies += 1;
                    error!(
                        event_name = "cfp.job.status_digest.reply_failed",
                        proposal_id = %id,
                        error = %error,
                        "could not post review thread reply"
                    );
                }
            }
        }

        info!(
            event_name = "cfp.job.status_digest.completed",
            total = digest.total(),
            valid = digest.valid,
            pending = digest.pending,
            invalid = digest.invalid,
            thread_replies,
            "status digest posted"
        );
        Ok(DigestReport::Posted { digest, thread_replies, failed_replies })
    }
}

/// Runs both jobs on their intervals until `shutdown` flips to `true`. The
/// first run of each job happens one full interval after start.
pub fn spawn(
    jobs: Arc<ProposalJobs>,
    schedule: &ScheduleConfig,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let new_proposals = {
        let jobs = jobs.clone();
        every(
            "new_proposals",
            Duration::from_secs(schedule.new_proposals_interval_secs),
            shutdown.clone(),
            move || {
                let jobs = jobs.clone();
                async move { jobs.check_new_proposals().await.map(|_| ()) }
            },
        )
    };
    let status_digest = every(
        "status_digest",
        Duration::from_secs(schedule.status_digest_interval_secs),
        shutdown,
        move || {
            let jobs = jobs.clone();
            async move { jobs.check_all_proposals_status().await.map(|_| ()) }
        },
    );
    vec![new_proposals, status_digest]
}

fn every<F, Fut>(
    job: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut run: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<(), JobError>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(event_name = "cfp.job.scheduled", job, period_secs = period.as_secs(), "job scheduled");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(error) = run().await {
                        error!(event_name = "cfp.job.failed", job, error = %error, "scheduled job failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(event_name = "cfp.job.stopped", job, "job stopped");
                        break;
                    }
                }
            }
        }
    })
}
