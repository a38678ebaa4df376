use async_trait::async_trait;
use serde::Serialize;
use crate::catalog::domain::{BookForm, CatalogService};
use crate::core::command::{Command, CommandError};

pub struct BookFormCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl BookFormCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookFormCommandRequest {
    Create,
    Edit { book_id: Option<i64> },
}

#[derive(Debug, Serialize)]
pub struct BookFormCommandResponse {
    pub form: BookForm,
}

impl BookFormCommandResponse {
    pub fn new(form: BookForm) -> Self {
        Self {
            form,
        }
    }
}

#[async_trait]
impl Command<BookFormCommandRequest, BookFormCommandResponse> for BookFormCommand {
    async fn execute(&self, req: BookFormCommandRequest) -> Result<BookFormCommandResponse, CommandError> {
        let res = match req {
            BookFormCommandRequest::Create => self.catalog_service.prepare_create_form().await,
            BookFormCommandRequest::Edit { book_id } => self.catalog_service.prepare_edit_form(book_id).await,
        };
        res.map_err(CommandError::from).map(BookFormCommandResponse::new)
    }
}
