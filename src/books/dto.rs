use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use crate::books::domain::Book;
use crate::core::domain::Identifiable;
use crate::owners::dto::StoreOwnerDto;
use crate::utils::blob;
use crate::utils::date::serializer;

// BookDto is a data transfer object for Catalog service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookDto {
    pub book_id: i64,
    pub version: i64,
    pub title: String,
    pub author_name: String,
    pub publisher_name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub store_owner_id: i64,
    #[serde(with = "blob::serializer")]
    pub cover_image_data: Option<Vec<u8>>,
    // joined on reads, never written
    pub store_owner: Option<StoreOwnerDto>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookDto {
    pub fn new(title: &str, author_name: &str, publisher_name: &str, price: Decimal, store_owner_id: i64) -> BookDto {
        BookDto {
            book_id: 0,
            version: 0,
            title: title.to_string(),
            author_name: author_name.to_string(),
            publisher_name: publisher_name.to_string(),
            price,
            image_url: None,
            store_owner_id,
            cover_image_data: None,
            store_owner: None,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for BookDto {
    fn id(&self) -> i64 {
        self.book_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Book for BookDto {
    fn store_owner_id(&self) -> i64 {
        self.store_owner_id
    }

    fn has_cover_image(&self) -> bool {
        self.cover_image_data.as_ref().map_or(false, |data| !data.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use crate::books::domain::Book;
    use crate::books::dto::BookDto;

    #[tokio::test]
    async fn test_should_build_books() {
        let book = BookDto::new("Dune", "Herbert", "Ace", Decimal::new(999, 2), 1);
        assert_eq!("Dune", book.title.as_str());
        assert_eq!("Ace", book.publisher_name.as_str());
        assert_eq!(1, book.store_owner_id());
        assert!(!book.has_cover_image());
    }

    #[tokio::test]
    async fn test_should_serialize_cover_and_price() {
        let mut book = BookDto::new("Dune", "Herbert", "Ace", Decimal::new(999, 2), 1);
        book.cover_image_data = Some(vec![0x01, 0x02]);
        assert!(book.has_cover_image());
        let json = serde_json::to_value(&book).expect("should serialize book");
        assert_eq!("AQI=", json["cover_image_data"].as_str().expect("cover should be a string"));
        assert_eq!("9.99", json["price"].as_str().expect("price should be a string"));
    }
}
