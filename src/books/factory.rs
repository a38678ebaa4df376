use aws_sdk_dynamodb::types::ScalarAttributeType;
use crate::books::repository::BookRepository;
use crate::books::repository::ddb_book_repository::DDBBookRepository;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::utils::ddb::{build_db_client, create_table};

pub(crate) async fn create_book_repository(config: &Configuration, store: RepositoryStore) -> Box<dyn BookRepository> {
    let client = build_db_client(store, config.local_endpoint.as_str()).await;
    if store == RepositoryStore::LocalDynamoDB {
        let _ = create_table(&client, config.books_table.as_str(), "book_id", ScalarAttributeType::N).await;
        let _ = create_table(&client, config.counters_table.as_str(), "counter_name", ScalarAttributeType::S).await;
    }
    Box::new(DDBBookRepository::new(client, config.books_table.as_str(), config.counters_table.as_str()))
}
