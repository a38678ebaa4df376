use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use chrono::Utc;

use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::{next_version, Repository};
use crate::utils::ddb::{is_conditional_put_failure, is_conditional_update_failure, next_id, opt_binary, opt_string, parse_binary_attribute, parse_date_attribute, parse_decimal_attribute, parse_number_attribute, parse_string_attribute, string_date, SCAN_PAGE_SIZE};

#[derive(Debug)]
pub struct DDBBookRepository {
    client: Client,
    table_name: String,
    counters_table: String,
}

impl DDBBookRepository {
    pub(crate) fn new(client: Client, table_name: &str, counters_table: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            counters_table: counters_table.to_string(),
        }
    }
}

#[async_trait]
impl Repository<BookEntity> for DDBBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<i64> {
        let table_name: &str = self.table_name.as_ref();
        let book_id = next_id(&self.client, self.counters_table.as_str(), table_name).await?;
        let mut item = to_item(entity);
        item.insert("book_id".to_string(), AttributeValue::N(book_id.to_string()));
        item.insert("version".to_string(), AttributeValue::N("0".to_string()));
        match self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(book_id)")
            .set_item(Some(item))
            .send()
            .await {
            Ok(_) => Ok(book_id),
            Err(err) if is_conditional_put_failure(&err) => {
                Err(LibraryError::duplicate_key(format!("book {} already exists", book_id).as_str()))
            }
            Err(err) => Err(LibraryError::from(err)),
        }
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<i64> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();
        let version = next_version(entity.version)?;

        match self.client
            .update_item()
            .table_name(table_name)
            .key("book_id", AttributeValue::N(entity.book_id.to_string()))
            .update_expression("SET version = :version, title = :title, author_name = :author_name, publisher_name = :publisher_name, price = :price, image_url = :image_url, store_owner_id = :store_owner_id, cover_image_data = :cover_image_data, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N(version.to_string()))
            .expression_attribute_values(":title", AttributeValue::S(entity.title.to_string()))
            .expression_attribute_values(":author_name", AttributeValue::S(entity.author_name.to_string()))
            .expression_attribute_values(":publisher_name", AttributeValue::S(entity.publisher_name.to_string()))
            .expression_attribute_values(":price", AttributeValue::N(entity.price.to_string()))
            .expression_attribute_values(":image_url", opt_string(entity.image_url.as_ref()))
            .expression_attribute_values(":store_owner_id", AttributeValue::N(entity.store_owner_id.to_string()))
            .expression_attribute_values(":cover_image_data", opt_binary(entity.cover_image_data.as_ref()))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await {
            Ok(_) => Ok(version),
            Err(err) if is_conditional_update_failure(&err) => {
                Err(LibraryError::concurrency_conflict(
                    format!("book {} was changed or removed since version {}", entity.book_id, entity.version).as_str()))
            }
            Err(err) => Err(LibraryError::from(err)),
        }
    }

    async fn find(&self, id: i64) -> LibraryResult<Option<BookEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let out = self.client
            .get_item()
            .table_name(table_name)
            .key("book_id", AttributeValue::N(id.to_string()))
            .consistent_read(true)
            .send()
            .await?;
        Ok(out.item().map(map_to_book))
    }

    async fn delete(&self, id: i64) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let out = self.client.delete_item()
            .table_name(table_name)
            .key("book_id", AttributeValue::N(id.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await?;
        Ok(if out.attributes().is_some() { 1 } else { 0 })
    }

    async fn find_all(&self) -> LibraryResult<Vec<BookEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let mut records = vec![];
        let mut exclusive_start_key = None;
        loop {
            let out = self.client
                .scan()
                .table_name(table_name)
                .consistent_read(true)
                .set_exclusive_start_key(exclusive_start_key)
                .limit(SCAN_PAGE_SIZE)
                .send()
                .await?;
            if let Some(items) = out.items() {
                records.extend(items.iter().map(map_to_book));
            }
            exclusive_start_key = out.last_evaluated_key().cloned();
            if exclusive_start_key.is_none() {
                return Ok(records);
            }
        }
    }

    async fn exists(&self, id: i64) -> LibraryResult<bool> {
        let table_name: &str = self.table_name.as_ref();
        let out = self.client
            .get_item()
            .table_name(table_name)
            .key("book_id", AttributeValue::N(id.to_string()))
            .projection_expression("book_id")
            .consistent_read(true)
            .send()
            .await?;
        Ok(out.item().is_some())
    }
}

impl BookRepository for DDBBookRepository {}

fn to_item(entity: &BookEntity) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("book_id".to_string(), AttributeValue::N(entity.book_id.to_string())),
        ("version".to_string(), AttributeValue::N(entity.version.to_string())),
        ("title".to_string(), AttributeValue::S(entity.title.to_string())),
        ("author_name".to_string(), AttributeValue::S(entity.author_name.to_string())),
        ("publisher_name".to_string(), AttributeValue::S(entity.publisher_name.to_string())),
        ("price".to_string(), AttributeValue::N(entity.price.to_string())),
        ("image_url".to_string(), opt_string(entity.image_url.as_ref())),
        ("store_owner_id".to_string(), AttributeValue::N(entity.store_owner_id.to_string())),
        ("cover_image_data".to_string(), opt_binary(entity.cover_image_data.as_ref())),
        ("created_at".to_string(), string_date(entity.created_at)),
        ("updated_at".to_string(), string_date(entity.updated_at)),
    ])
}

fn map_to_book(map: &HashMap<String, AttributeValue>) -> BookEntity {
    BookEntity {
        book_id: parse_number_attribute("book_id", map),
        version: parse_number_attribute("version", map),
        title: parse_string_attribute("title", map).unwrap_or_default(),
        author_name: parse_string_attribute("author_name", map).unwrap_or_default(),
        publisher_name: parse_string_attribute("publisher_name", map).unwrap_or_default(),
        price: parse_decimal_attribute("price", map),
        image_url: parse_string_attribute("image_url", map),
        store_owner_id: parse_number_attribute("store_owner_id", map),
        cover_image_data: parse_binary_attribute("cover_image_data", map),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use aws_sdk_dynamodb::types::ScalarAttributeType;
    use lazy_static::lazy_static;
    use rust_decimal::Decimal;

    use crate::books::domain::model::BookEntity;
    use crate::books::repository::ddb_book_repository::{map_to_book, to_item, DDBBookRepository};
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let config = Configuration::new();
                let client = build_db_client(RepositoryStore::LocalDynamoDB, config.local_endpoint.as_str()).await;
                let _ = delete_table(&client, "books").await;
                let _ = create_table(&client, "books", "book_id", ScalarAttributeType::N).await;
                let _ = create_table(&client, "counters", "counter_name", ScalarAttributeType::S).await;
                client
            });
    }

    fn new_book() -> BookEntity {
        BookEntity::new("Dune", "Herbert", "Ace", Decimal::new(999, 2), 1)
    }

    #[tokio::test]
    async fn test_should_map_item_to_book() {
        let mut book = new_book();
        book.book_id = 7;
        book.image_url = Some("https://covers.example/dune.jpg".to_string());
        book.cover_image_data = Some(vec![0x01, 0x02]);
        let loaded = map_to_book(&to_item(&book));
        assert_eq!(book.book_id, loaded.book_id);
        assert_eq!(book.price, loaded.price);
        assert_eq!(book.image_url, loaded.image_url);
        assert_eq!(book.cover_image_data, loaded.cover_image_data);
    }

    #[tokio::test]
    async fn test_should_refuse_update_at_max_version() {
        let client = build_db_client(RepositoryStore::LocalDynamoDB, Configuration::new().local_endpoint.as_str()).await;
        let books_repo = DDBBookRepository::new(client, "books", "counters");
        let mut book = new_book();
        book.book_id = 7;
        book.version = i64::MAX;
        let res = books_repo.update(&book).await;
        assert!(matches!(res, Err(LibraryError::ConcurrencyConflict { .. })));
    }

    #[tokio::test]
    #[ignore = "requires dynamodb-local on localhost:8000"]
    async fn test_should_create_get_books() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "books", "counters");
        let mut book = new_book();
        book.cover_image_data = Some(vec![0x01, 0x02]);
        let book_id = books_repo.create(&book).await.expect("should create book");
        assert!(book_id > 0);

        let loaded = books_repo.get(book_id).await.expect("should return book");
        assert_eq!(book_id, loaded.book_id);
        assert_eq!(Some(vec![0x01, 0x02]), loaded.cover_image_data);
    }

    #[tokio::test]
    #[ignore = "requires dynamodb-local on localhost:8000"]
    async fn test_should_create_update_books() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "books", "counters");
        let mut book = new_book();
        book.book_id = books_repo.create(&book).await.expect("should create book");

        book.title = "Dune Messiah".to_string();
        let version = books_repo.update(&book).await.expect("should update book");
        assert_eq!(1, version);

        let stale = books_repo.update(&book).await;
        assert!(matches!(stale, Err(LibraryError::ConcurrencyConflict { .. })));

        let loaded = books_repo.get(book.book_id).await.expect("should return book");
        assert_eq!("Dune Messiah", loaded.title.as_str());
        assert_eq!(1, loaded.version);
    }

    #[tokio::test]
    #[ignore = "requires dynamodb-local on localhost:8000"]
    async fn test_should_create_scan_books() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "books", "counters");
        for _ in 0..5 {
            books_repo.create(&new_book()).await.expect("should create book");
        }
        let res = books_repo.find_all().await.expect("should return books");
        assert!(res.len() >= 5);
    }

    #[tokio::test]
    #[ignore = "requires dynamodb-local on localhost:8000"]
    async fn test_should_create_delete_books() {
        let books_repo = DDBBookRepository::new(CLIENT.get().await.clone(), "books", "counters");
        let book_id = books_repo.create(&new_book()).await.expect("should create book");

        let deleted = books_repo.delete(book_id).await.expect("should delete book");
        assert_eq!(1, deleted);
        let deleted = books_repo.delete(book_id).await.expect("should delete book");
        assert_eq!(0, deleted);

        assert!(!books_repo.exists(book_id).await.expect("should check book"));
        let loaded = books_repo.get(book_id).await;
        assert!(loaded.is_err());
    }
}
