use std::collections::HashMap;

use tokio::sync::RwLock;

use cfpbot_core::domain::proposal::ProposalId;

use super::{RepositoryError, ReviewRepository, SnapshotRepository};

#[derive(Default)]
pub struct InMemoryReviewRepository {
    values: RwLock<HashMap<ProposalId, String>>,
}

#[async_trait::async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn get(&self, id: &ProposalId) -> Result<Option<String>, RepositoryError> {
        let values = self.values.read().await;
        Ok(values.get(id).cloned())
    }

    async fn get_many(
        &self,
        ids: &[ProposalId],
    ) -> Result<HashMap<ProposalId, String>, RepositoryError> {
        let values = self.values.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| values.get(id).map(|value| (id.clone(), value.clone())))
            .collect())
    }

    async fn put(&self, id: &ProposalId, value: &str) -> Result<(), RepositoryError> {
        let mut values = self.values.write().await;
        values.insert(id.clone(), value.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySnapshotRepository {
    snapshots: RwLock<HashMap<String, Vec<String>>>,
}

#[async_trait::async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn load(&self, key: &str) -> Result<Vec<String>, RepositoryError> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(key).cloned().unwrap_or_default())
    }

    async fn save(&self, key: &str, ids: &[String]) -> Result<(), RepositoryError> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(key.to_string(), ids.to_vec());
        Ok(())
    }
}
