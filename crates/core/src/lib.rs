pub mod config;
pub mod digest;
pub mod domain;
pub mod errors;
pub mod links;
pub mod review;
pub mod validation;

pub use digest::{new_submission_ids, StatusDigest, SubmissionState};
pub use domain::proposal::{Proposal, ProposalId, ProposalListResponse, SubmissionRecord};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use links::ProposalLinks;
pub use review::{clear_pending, mark_pending, OncallRoster, ReviewStatus, PENDING_PREFIX};
pub use validation::{
    LengthExcess, RuleId, ValidatedSubmission, ValidationOutcome, ValidationRules, Validator,
    Violation, ViolationKind,
};
