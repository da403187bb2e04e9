use chrono::Utc;
use sqlx::Row;

use super::{RepositoryError, SnapshotRepository};
use crate::DbPool;

pub struct SqlSnapshotRepository {
    pool: DbPool,
}

impl SqlSnapshotRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SnapshotRepository for SqlSnapshotRepository {
    async fn load(&self, key: &str) -> Result<Vec<String>, RepositoryError> {
        let row = sqlx::query("SELECT ids_json FROM proposal_snapshot WHERE snapshot_key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(Vec::new());
        };
        let ids_json: String =
            row.try_get("ids_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        serde_json::from_str(&ids_json)
            .map_err(|e| RepositoryError::Decode(format!("snapshot `{key}`: {e}")))
    }

    async fn save(&self, key: &str, ids: &[String]) -> Result<(), RepositoryError> {
        let ids_json =
            serde_json::to_string(ids).map_err(|e| RepositoryError::Decode(e.to_string()))?;

        sqlx::query(
            "INSERT INTO proposal_snapshot (snapshot_key, ids_json, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(snapshot_key) DO UPDATE SET
                 ids_json = excluded.ids_json,
                 updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(ids_json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqlSnapshotRepository;
    use crate::repositories::{SnapshotRepository, LAST_PROPOSALS_KEY};
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn missing_snapshot_loads_empty_and_saves_round_trip() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlSnapshotRepository::new(pool.clone());

        assert!(repo.load(LAST_PROPOSALS_KEY).await.expect("load").is_empty());

        repo.save(LAST_PROPOSALS_KEY, &["a".to_string(), "b".to_string()]).await.expect("save");
        repo.save(LAST_PROPOSALS_KEY, &["b".to_string(), "c".to_string()]).await.expect("resave");

        assert_eq!(repo.load(LAST_PROPOSALS_KEY).await.expect("load"), vec!["b", "c"]);
        pool.close().await;
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_a_decode_error() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        sqlx::query(
            "INSERT INTO proposal_snapshot (snapshot_key, ids_json, updated_at) VALUES (?, ?, ?)",
        )
        .bind(LAST_PROPOSALS_KEY)
        .bind("not json")
        .bind("2025-01-01T00:00:00Z")
        .execute(&pool)
        .await
        .expect("insert");

        let repo = SqlSnapshotRepository::new(pool.clone());
        let error = repo.load(LAST_PROPOSALS_KEY).await.expect_err("corrupt snapshot");
        assert!(error.to_string().contains(LAST_PROPOSALS_KEY));
        pool.close().await;
    }
}
