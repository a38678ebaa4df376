use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::domain::Identifiable;
use crate::core::library::LibraryResult;
use crate::owners::domain::model::StoreOwnerEntity;
use crate::owners::repository::StoreOwnerRepository;

#[derive(Debug, Clone, Default)]
pub struct MemoryStoreOwnerRepository {
    owners: Arc<RwLock<HashMap<i64, StoreOwnerEntity>>>,
    last_id: Arc<AtomicI64>,
}

impl MemoryStoreOwnerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, entity: &StoreOwnerEntity) -> LibraryResult<i64> {
        let mut owners = self.owners.write().await;
        let store_owner_id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut stored = entity.clone();
        stored.store_owner_id = store_owner_id;
        stored.version = 0;
        owners.insert(store_owner_id, stored);
        Ok(store_owner_id)
    }
}

#[async_trait]
impl StoreOwnerRepository for MemoryStoreOwnerRepository {
    async fn find(&self, id: i64) -> LibraryResult<Option<StoreOwnerEntity>> {
        Ok(self.owners.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> LibraryResult<Vec<StoreOwnerEntity>> {
        let mut owners: Vec<StoreOwnerEntity> = self.owners.read().await.values().cloned().collect();
        owners.sort_by_key(Identifiable::id);
        Ok(owners)
    }

    async fn find_ids(&self) -> LibraryResult<Vec<i64>> {
        Ok(self.find_all().await?.iter().map(Identifiable::id).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::owners::domain::model::StoreOwnerEntity;
    use crate::owners::repository::StoreOwnerRepository;
    use crate::owners::repository::memory_store_owner_repository::MemoryStoreOwnerRepository;

    #[tokio::test]
    async fn test_should_create_and_list_owner_ids() {
        let owners_repo = MemoryStoreOwnerRepository::new();
        let first = owners_repo.create(&StoreOwnerEntity::new("Corner Books")).await.expect("should create owner");
        let second = owners_repo.create(&StoreOwnerEntity::new("Harbor Books")).await.expect("should create owner");
        assert_eq!(vec![first, second], owners_repo.find_ids().await.expect("should return ids"));
        let names: Vec<String> = owners_repo.find_all().await.expect("should list owners")
            .into_iter().map(|owner| owner.name).collect();
        assert_eq!(vec!["Corner Books".to_string(), "Harbor Books".to_string()], names);
    }

    #[tokio::test]
    async fn test_should_find_owner() {
        let owners_repo = MemoryStoreOwnerRepository::new();
        let owner_id = owners_repo.create(&StoreOwnerEntity::new("Corner Books")).await.expect("should create owner");
        let owner = owners_repo.find(owner_id).await.expect("should find").expect("owner should exist");
        assert_eq!("Corner Books", owner.name.as_str());
        assert_eq!(0, owner.version);
        assert!(owners_repo.find(owner_id + 1).await.expect("should find").is_none());
    }
}
