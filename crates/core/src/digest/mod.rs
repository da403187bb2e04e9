use std::collections::HashSet;

use crate::domain::proposal::ProposalId;
use crate::review::ReviewStatus;
use crate::validation::ValidationOutcome;

/// Ids present in `current` but not in `previous`, in `current` order.
pub fn new_submission_ids<'a>(current: &'a [String], previous: &[String]) -> Vec<&'a str> {
    let known: HashSet<&str> = previous.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    current
        .iter()
        .map(String::as_str)
        .filter(|id| !known.contains(id) && seen.insert(*id))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    Valid,
    Pending,
    Invalid,
}

impl SubmissionState {
    pub fn square(self) -> &'static str {
        match self {
            Self::Valid => "🟩",
            Self::Pending => "🟨",
            Self::Invalid => "🟥",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusDigest {
    pub states: Vec<SubmissionState>,
    pub valid: usize,
    pub pending: usize,
    pub invalid: usize,
}

impl StatusDigest {
    /// Rejected proposals count as pending when a reviewer has put them on
    /// hold, otherwise as invalid.
    pub fn build<'a, I, F>(outcomes: I, mut review_status: F) -> Self
    where
        I: IntoIterator<Item = (&'a ProposalId, &'a ValidationOutcome)>,
        F: FnMut(&ProposalId) -> ReviewStatus,
    {
        let mut digest = Self::default();
        for (id, outcome) in outcomes {
            let state = if outcome.is_accepted() {
                digest.valid += 1;
                SubmissionState::Valid
            } else if review_status(id).pending {
                digest.pending += 1;
                SubmissionState::Pending
            } else {
                digest.invalid += 1;
                SubmissionState::Invalid
            };
            digest.states.push(state);
        }
        digest
    }

    pub fn total(&self) -> usize {
        self.states.len()
    }

    pub fn squares(&self) -> String {
        self.states.iter().map(|state| state.square()).collect()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{new_submission_ids, StatusDigest, SubmissionState};
    use crate::domain::proposal::{ProposalId, SubmissionRecord};
    use crate::review::ReviewStatus;
    use crate::validation::{ValidationOutcome, Validator};

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn new_ids_keep_current_order() {
        let current = ids(&["c", "a", "d", "b"]);
        let previous = ids(&["a", "b"]);
        assert_eq!(new_submission_ids(&current, &previous), vec!["c", "d"]);
    }

    #[test]
    fn empty_snapshot_makes_everything_new() {
        let current = ids(&["a", "b", "a"]);
        assert_eq!(new_submission_ids(&current, &[]), vec!["a", "b"]);
    }

    #[test]
    fn digest_counts_pending_separately_from_invalid() {
        let rejected_id = ProposalId(Uuid::from_u128(1));
        let pending_id = ProposalId(Uuid::from_u128(2));
        let accepted_id = ProposalId(Uuid::from_u128(3));

        let rejected = Validator::default().validate(&SubmissionRecord {
            id: rejected_id.clone(),
            title: String::new(),
            speaker_name: String::new(),
            speaker_name_reading: String::new(),
            abstract_text: String::new(),
            accepted: false,
        });
        assert!(!rejected.is_accepted());
        let accepted = accepted_outcome();

        let outcomes =
            vec![(&rejected_id, &rejected), (&pending_id, &rejected), (&accepted_id, &accepted)];
        let digest = StatusDigest::build(outcomes, |id| {
            if *id == pending_id {
                ReviewStatus { reviewer: Some("U1".to_string()), pending: true }
            } else {
                ReviewStatus::default()
            }
        });

        assert_eq!(
            digest.states,
            vec![SubmissionState::Invalid, SubmissionState::Pending, SubmissionState::Valid]
        );
        assert_eq!((digest.total(), digest.valid, digest.pending, digest.invalid), (3, 1, 1, 1));
        assert_eq!(digest.squares(), "🟥🟨🟩");
    }

    fn accepted_outcome() -> ValidationOutcome {
        let reading = "■お名前の呼び方（カナ）□ア■会社名/所属団体名 - Company/Organizations□イ■役職 - Job Title□ウ";
        let abstract_text = "■スピーカープロフィール (200文字以内) - Biography (Less than 400 letters)□\r\nbio\r\n■ トーク概要 (400文字以内) - Abstract (Less than 800 letters)□\r\nsummary";
        let outcome = Validator::default().validate(&SubmissionRecord {
            id: ProposalId(Uuid::from_u128(3)),
            title: String::new(),
            speaker_name: String::new(),
            speaker_name_reading: reading.to_string(),
            abstract_text: abstract_text.to_string(),
            accepted: false,
        });
        assert!(outcome.is_accepted());
        outcome
    }
}
