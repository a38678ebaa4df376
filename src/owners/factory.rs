use aws_sdk_dynamodb::types::ScalarAttributeType;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::owners::repository::StoreOwnerRepository;
use crate::owners::repository::ddb_store_owner_repository::DDBStoreOwnerRepository;
use crate::utils::ddb::{build_db_client, create_table};

pub(crate) async fn create_store_owner_repository(config: &Configuration, store: RepositoryStore) -> Box<dyn StoreOwnerRepository> {
    let client = build_db_client(store, config.local_endpoint.as_str()).await;
    if store == RepositoryStore::LocalDynamoDB {
        let _ = create_table(&client, config.owners_table.as_str(), "store_owner_id", ScalarAttributeType::N).await;
        let _ = create_table(&client, config.counters_table.as_str(), "counter_name", ScalarAttributeType::S).await;
    }
    Box::new(DDBStoreOwnerRepository::new(client, config.owners_table.as_str(), config.counters_table.as_str()))
}
