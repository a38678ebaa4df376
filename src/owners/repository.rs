pub mod ddb_store_owner_repository;
pub mod memory_store_owner_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::owners::domain::model::StoreOwnerEntity;

// The catalog only reads owners; they are registered outside of it.
#[async_trait]
pub trait StoreOwnerRepository: Sync + Send {
    // find an owner, None when it does not exist
    async fn find(&self, id: i64) -> LibraryResult<Option<StoreOwnerEntity>>;

    // all owners in id order
    async fn find_all(&self) -> LibraryResult<Vec<StoreOwnerEntity>>;

    // identifiers offered when a book picks its owner
    async fn find_ids(&self) -> LibraryResult<Vec<i64>>;
}
