use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::library::{LibraryError, LibraryResult};

#[async_trait]
pub trait Repository<Entity: Send + Sync + 'static>: Sync + Send {
    // create an entity and return the identifier assigned by the store
    async fn create(&self, entity: &Entity) -> LibraryResult<i64>;

    // updates an entity if its stored version still matches, returning the new version
    async fn update(&self, entity: &Entity) -> LibraryResult<i64>;

    // find an entity, None when it does not exist
    async fn find(&self, id: i64) -> LibraryResult<Option<Entity>>;

    // delete an entity, returning the number of removed records
    async fn delete(&self, id: i64) -> LibraryResult<usize>;

    // all entities in store-defined order
    async fn find_all(&self) -> LibraryResult<Vec<Entity>>;

    // get an entity or fail with not-found
    async fn get(&self, id: i64) -> LibraryResult<Entity> {
        self.find(id).await?
            .ok_or_else(|| LibraryError::not_found(format!("record not found for {}", id).as_str()))
    }

    async fn exists(&self, id: i64) -> LibraryResult<bool> {
        Ok(self.find(id).await?.is_some())
    }
}

// the version a conditional update writes; a version that can not advance never matches
pub fn next_version(version: i64) -> LibraryResult<i64> {
    version.checked_add(1).ok_or_else(|| LibraryError::concurrency_conflict(
        format!("version {} can not be advanced", version).as_str()))
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    DynamoDB,
    LocalDynamoDB,
}

#[cfg(test)]
mod tests {
    use crate::core::library::LibraryError;
    use crate::core::repository::next_version;

    #[tokio::test]
    async fn test_should_advance_version() {
        assert_eq!(1, next_version(0).expect("should advance version"));
        assert_eq!(i64::MAX, next_version(i64::MAX - 1).expect("should advance version"));
    }

    #[tokio::test]
    async fn test_should_not_advance_max_version() {
        assert!(matches!(next_version(i64::MAX), Err(LibraryError::ConcurrencyConflict { .. })));
    }
}
