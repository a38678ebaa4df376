use chrono::{NaiveDateTime, Utc};
use crate::core::domain::Identifiable;

// StoreOwnerEntity is the owner a book belongs to. Books reference it by store_owner_id,
// they never own it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOwnerEntity {
    pub store_owner_id: i64,
    pub version: i64,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl StoreOwnerEntity {
    pub fn new(name: &str) -> Self {
        Self {
            store_owner_id: 0,
            version: 0,
            name: name.to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for StoreOwnerEntity {
    fn id(&self) -> i64 {
        self.store_owner_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}
