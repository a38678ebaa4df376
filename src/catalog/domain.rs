pub mod service;
pub mod upload;
pub mod validation;

use async_trait::async_trait;
use serde::Serialize;
use crate::books::dto::BookDto;
use crate::catalog::domain::upload::CoverImageUpload;
use crate::catalog::domain::validation::ValidationErrors;
use crate::core::library::LibraryResult;

/// The book-record lifecycle manager.
///
/// Reads return `NotFound` for absent or unknown identifiers. Submissions that fail field
/// validation come back as [`SubmitOutcome::Rejected`] without touching the store; store
/// failures and unresolved edit conflicts are returned as errors.
#[async_trait]
pub trait CatalogService: Sync + Send {
    async fn list_books(&self) -> LibraryResult<Vec<BookDto>>;
    async fn get_book_detail(&self, id: Option<i64>) -> LibraryResult<BookDto>;
    async fn prepare_create_form(&self) -> LibraryResult<BookForm>;
    async fn create_book(&self, book: BookDto, upload: Option<CoverImageUpload>) -> LibraryResult<SubmitOutcome>;
    async fn prepare_edit_form(&self, id: Option<i64>) -> LibraryResult<BookForm>;
    async fn edit_book(&self, id: i64, book: BookDto, upload: Option<CoverImageUpload>) -> LibraryResult<SubmitOutcome>;
    async fn prepare_delete_form(&self, id: Option<i64>) -> LibraryResult<BookDto>;
    async fn delete_book_confirmed(&self, id: i64) -> LibraryResult<()>;
    async fn book_exists(&self, id: i64) -> LibraryResult<bool>;
}

// BookForm is what a create/edit page is rendered from: the book being edited (if any),
// the owners it may point at and the errors of a rejected submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookForm {
    pub book: Option<BookDto>,
    pub owner_ids: Vec<i64>,
    pub selected_owner_id: Option<i64>,
    pub errors: ValidationErrors,
}

impl BookForm {
    pub fn new(book: Option<BookDto>, owner_ids: Vec<i64>) -> Self {
        let selected_owner_id = book.as_ref().map(|b| b.store_owner_id);
        Self {
            book,
            owner_ids,
            selected_owner_id,
            errors: ValidationErrors::new(),
        }
    }

    pub fn rejected(book: BookDto, owner_ids: Vec<i64>, errors: ValidationErrors) -> Self {
        Self {
            errors,
            ..Self::new(Some(book), owner_ids)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Completed(BookDto),
    Rejected(BookForm),
}

// UpdateOutcome classifies a conditional update once the store has answered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    Committed(i64),
    ConflictRecordGone,
    ConflictRecordStillPresent,
}
