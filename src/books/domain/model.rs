use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use crate::core::domain::Identifiable;

// BookEntity is the persisted book record. book_id is assigned by the store on insert and
// version is the concurrency token checked by every update.
#[derive(Debug, Clone, PartialEq)]
pub struct BookEntity {
    pub book_id: i64,
    pub version: i64,
    pub title: String,
    pub author_name: String,
    pub publisher_name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub store_owner_id: i64,
    pub cover_image_data: Option<Vec<u8>>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl BookEntity {
    pub fn new(title: &str, author_name: &str, publisher_name: &str, price: Decimal, store_owner_id: i64) -> Self {
        Self {
            book_id: 0,
            version: 0,
            title: title.to_string(),
            author_name: author_name.to_string(),
            publisher_name: publisher_name.to_string(),
            price,
            image_url: None,
            store_owner_id,
            cover_image_data: None,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for BookEntity {
    fn id(&self) -> i64 {
        self.book_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}
