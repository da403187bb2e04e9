pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{connect_with_settings, DbPool};
pub use repositories::{
    InMemoryReviewRepository, InMemorySnapshotRepository, RepositoryError, ReviewRepository,
    SnapshotRepository, SqlReviewRepository, SqlSnapshotRepository, LAST_PROPOSALS_KEY,
};
