use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use cfpbot_core::domain::proposal::ProposalId;

pub mod memory;
pub mod review;
pub mod snapshot;

pub use memory::{InMemoryReviewRepository, InMemorySnapshotRepository};
pub use review::SqlReviewRepository;
pub use snapshot::SqlSnapshotRepository;

/// Snapshot key of the proposal ids seen by the last new-proposal check.
pub const LAST_PROPOSALS_KEY: &str = "last_proposals_uuids";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Per-proposal review value: reviewer id, optionally `PENDING:`-prefixed.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn get(&self, id: &ProposalId) -> Result<Option<String>, RepositoryError>;
    async fn get_many(
        &self,
        ids: &[ProposalId],
    ) -> Result<HashMap<ProposalId, String>, RepositoryError>;
    async fn put(&self, id: &ProposalId, value: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    async fn load(&self, key: &str) -> Result<Vec<String>, RepositoryError>;
    async fn save(&self, key: &str, ids: &[String]) -> Result<(), RepositoryError>;
}
