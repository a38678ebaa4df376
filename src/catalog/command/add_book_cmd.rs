use async_trait::async_trait;
use crate::books::dto::BookDto;
use crate::catalog::domain::{BookForm, CatalogService, SubmitOutcome};
use crate::catalog::domain::upload::CoverImageUpload;
use crate::core::command::{Command, CommandError};

pub struct AddBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl AddBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub struct AddBookCommandRequest {
    pub book: BookDto,
    pub cover_image: Option<CoverImageUpload>,
}

impl AddBookCommandRequest {
    pub fn new(book: BookDto, cover_image: Option<CoverImageUpload>) -> Self {
        Self {
            book,
            cover_image,
        }
    }
}

#[derive(Debug)]
pub enum AddBookCommandResponse {
    Created(BookDto),
    Rejected(BookForm),
}

impl From<SubmitOutcome> for AddBookCommandResponse {
    fn from(other: SubmitOutcome) -> Self {
        match other {
            SubmitOutcome::Completed(book) => AddBookCommandResponse::Created(book),
            SubmitOutcome::Rejected(form) => AddBookCommandResponse::Rejected(form),
        }
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        self.catalog_service.create_book(req.book, req.cover_image)
            .await.map_err(CommandError::from).map(AddBookCommandResponse::from)
    }
}
