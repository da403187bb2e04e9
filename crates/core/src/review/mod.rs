//! Reviewer assignment and the pending flag, as stored per proposal.
//!
//! The stored value is the reviewer's Slack user id, prefixed with
//! [`PENDING_PREFIX`] while a reviewer has put the proposal on hold. A bare
//! prefix means "pending, nobody assigned yet".

use rand::seq::SliceRandom;
use rand::Rng;

pub const PENDING_PREFIX: &str = "PENDING:";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReviewStatus {
    pub reviewer: Option<String>,
    pub pending: bool,
}

impl ReviewStatus {
    pub fn assigned(reviewer: impl Into<String>) -> Self {
        Self { reviewer: Some(reviewer.into()), pending: false }
    }

    pub fn parse(stored: Option<&str>) -> Self {
        let Some(raw) = stored else {
            return Self::default();
        };
        let (pending, reviewer) = match raw.strip_prefix(PENDING_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let reviewer = (!reviewer.is_empty()).then(|| reviewer.to_string());
        Self { reviewer, pending }
    }

    pub fn encode(&self) -> String {
        let reviewer = self.reviewer.as_deref().unwrap_or_default();
        if self.pending {
            format!("{PENDING_PREFIX}{reviewer}")
        } else {
            reviewer.to_string()
        }
    }

    pub fn needs_assignment(&self) -> bool {
        self.reviewer.is_none()
    }
}

/// New stored value after a "put on hold" action, or `None` when the
/// proposal is already pending.
pub fn mark_pending(stored: Option<&str>) -> Option<String> {
    let status = ReviewStatus::parse(stored);
    if status.pending {
        return None;
    }
    Some(ReviewStatus { pending: true, ..status }.encode())
}

/// New stored value after a "release hold" action, or `None` when there is
/// nothing to release.
pub fn clear_pending(stored: Option<&str>) -> Option<String> {
    let status = ReviewStatus::parse(stored);
    if !status.pending {
        return None;
    }
    Some(ReviewStatus { pending: false, ..status }.encode())
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OncallRoster {
    users: Vec<String>,
}

impl OncallRoster {
    pub fn new(users: Vec<String>) -> Self {
        let users = users
            .into_iter()
            .map(|user| user.trim().to_string())
            .filter(|user| !user.is_empty())
            .collect();
        Self { users }
    }

    /// Parses a comma separated list of Slack user ids.
    pub fn parse(csv: &str) -> Self {
        Self::new(csv.split(',').map(str::to_string).collect())
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.users.choose(rng).map(String::as_str)
    }
}
