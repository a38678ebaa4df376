use std::collections::BTreeMap;
use rust_decimal::Decimal;
use serde::Serialize;
use crate::books::dto::BookDto;

// ValidationErrors maps a field name to the message shown next to it. The catalog only
// cares whether it is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

pub trait BookValidator: Sync + Send {
    fn validate(&self, book: &BookDto, owner_ids: &[i64]) -> ValidationErrors;
}

// FieldValidator checks the submitted fields of a book before any store write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldValidator;

impl FieldValidator {
    pub fn new() -> Self {
        Self
    }
}

impl BookValidator for FieldValidator {
    fn validate(&self, book: &BookDto, owner_ids: &[i64]) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if book.title.trim().is_empty() {
            errors.add("title", "title is required");
        }
        if book.author_name.trim().is_empty() {
            errors.add("author_name", "author name is required");
        }
        if book.publisher_name.trim().is_empty() {
            errors.add("publisher_name", "publisher name is required");
        }
        if book.price < Decimal::ZERO {
            errors.add("price", "price must not be negative");
        }
        if !owner_ids.contains(&book.store_owner_id) {
            errors.add("store_owner_id", format!("store owner {} does not exist", book.store_owner_id).as_str());
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use crate::books::dto::BookDto;
    use crate::catalog::domain::validation::{BookValidator, FieldValidator, ValidationErrors};

    #[tokio::test]
    async fn test_should_accept_valid_book() {
        let book = BookDto::new("Dune", "Herbert", "Ace", Decimal::new(999, 2), 1);
        assert!(FieldValidator::new().validate(&book, &[1, 2]).is_valid());
    }

    #[tokio::test]
    async fn test_should_accept_free_book() {
        let book = BookDto::new("Dune", "Herbert", "Ace", Decimal::ZERO, 1);
        assert!(FieldValidator::new().validate(&book, &[1]).is_valid());
    }

    #[tokio::test]
    async fn test_should_reject_blank_fields() {
        let book = BookDto::new(" ", "", "\t", Decimal::new(999, 2), 1);
        let errors = FieldValidator::new().validate(&book, &[1]);
        assert_eq!(3, errors.len());
        assert!(errors.get("title").is_some());
        assert!(errors.get("author_name").is_some());
        assert!(errors.get("publisher_name").is_some());
    }

    #[tokio::test]
    async fn test_should_reject_negative_price_and_unknown_owner() {
        let book = BookDto::new("Dune", "Herbert", "Ace", Decimal::new(-1, 2), 9);
        let errors = FieldValidator::new().validate(&book, &[1, 2]);
        assert!(!errors.is_valid());
        assert!(errors.get("price").is_some());
        assert_eq!(Some("store owner 9 does not exist"), errors.get("store_owner_id"));
    }

    #[tokio::test]
    async fn test_should_keep_first_message_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "first");
        errors.add("title", "second");
        assert_eq!(Some("first"), errors.get("title"));
        let json = serde_json::to_string(&errors).expect("should serialize errors");
        assert_eq!(r#"{"title":"first"}"#, json);
    }
}
