use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite};

use cfpbot_core::domain::proposal::ProposalId;

use super::{RepositoryError, ReviewRepository};
use crate::DbPool;

pub struct SqlReviewRepository {
    pool: DbPool,
}

impl SqlReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<(ProposalId, String), RepositoryError> {
    let raw_id: String =
        row.try_get("proposal_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let value: String = row.try_get("value").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let id = ProposalId::parse(&raw_id)
        .map_err(|e| RepositoryError::Decode(format!("proposal_id `{raw_id}`: {e}")))?;
    Ok((id, value))
}

#[async_trait::async_trait]
impl ReviewRepository for SqlReviewRepository {
    async fn get(&self, id: &ProposalId) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM proposal_review WHERE proposal_id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => {
                Ok(Some(r.try_get("value").map_err(|e| RepositoryError::Decode(e.to_string()))?))
            }
            None => Ok(None),
        }
    }

    async fn get_many(
        &self,
        ids: &[ProposalId],
    ) -> Result<HashMap<ProposalId, String>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT proposal_id, value FROM proposal_review WHERE proposal_id IN (",
        );
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn put(&self, id: &ProposalId, value: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO proposal_review (proposal_id, value, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(proposal_id) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
        )
        .bind(id.to_string())
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use cfpbot_core::domain::proposal::ProposalId;

    use super::SqlReviewRepository;
    use crate::repositories::ReviewRepository;
    use crate::{connect_with_settings, migrations};

    async fn repository() -> (SqlReviewRepository, crate::DbPool) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        (SqlReviewRepository::new(pool.clone()), pool)
    }

    #[tokio::test]
    async fn put_then_get_overwrites_previous_value() {
        let (repo, pool) = repository().await;
        let id = ProposalId(Uuid::from_u128(42));

        assert_eq!(repo.get(&id).await.expect("get"), None);
        repo.put(&id, "U1").await.expect("put");
        repo.put(&id, "PENDING:U1").await.expect("overwrite");

        assert_eq!(repo.get(&id).await.expect("get").as_deref(), Some("PENDING:U1"));
        pool.close().await;
    }

    #[tokio::test]
    async fn get_many_returns_only_stored_ids() {
        let (repo, pool) = repository().await;
        let stored = ProposalId(Uuid::from_u128(1));
        let other = ProposalId(Uuid::from_u128(2));
        repo.put(&stored, "U9").await.expect("put");

        let values = repo.get_many(&[stored.clone(), other.clone()]).await.expect("get_many");
        assert_eq!(values.len(), 1);
        assert_eq!(values.get(&stored).map(String::as_str), Some("U9"));
        assert!(!values.contains_key(&other));

        assert!(repo.get_many(&[]).await.expect("empty lookup").is_empty());
        pool.close().await;
    }
}
