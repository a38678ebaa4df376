use async_trait::async_trait;
use crate::books::dto::BookDto;
use crate::catalog::domain::{BookForm, CatalogService, SubmitOutcome};
use crate::catalog::domain::upload::CoverImageUpload;
use crate::core::command::{Command, CommandError};

pub struct UpdateBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl UpdateBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub struct UpdateBookCommandRequest {
    pub book_id: i64,
    pub book: BookDto,
    pub cover_image: Option<CoverImageUpload>,
}

impl UpdateBookCommandRequest {
    pub fn new(book_id: i64, book: BookDto, cover_image: Option<CoverImageUpload>) -> Self {
        Self {
            book_id,
            book,
            cover_image,
        }
    }
}

#[derive(Debug)]
pub enum UpdateBookCommandResponse {
    Updated(BookDto),
    Rejected(BookForm),
}

impl From<SubmitOutcome> for UpdateBookCommandResponse {
    fn from(other: SubmitOutcome) -> Self {
        match other {
            SubmitOutcome::Completed(book) => UpdateBookCommandResponse::Updated(book),
            SubmitOutcome::Rejected(form) => UpdateBookCommandResponse::Rejected(form),
        }
    }
}

#[async_trait]
impl Command<UpdateBookCommandRequest, UpdateBookCommandResponse> for UpdateBookCommand {
    async fn execute(&self, req: UpdateBookCommandRequest) -> Result<UpdateBookCommandResponse, CommandError> {
        self.catalog_service.edit_book(req.book_id, req.book, req.cover_image)
            .await.map_err(CommandError::from).map(UpdateBookCommandResponse::from)
    }
}
