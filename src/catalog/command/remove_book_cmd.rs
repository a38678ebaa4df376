use async_trait::async_trait;
use serde::Serialize;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub struct RemoveBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl RemoveBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug)]
pub struct RemoveBookCommandRequest {
    pub book_id: i64,
}

impl RemoveBookCommandRequest {
    pub fn new(book_id: i64) -> Self {
        Self {
            book_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RemoveBookCommandResponse {
    pub book_id: i64,
}

impl RemoveBookCommandResponse {
    pub fn new(book_id: i64) -> Self {
        Self {
            book_id,
        }
    }
}

#[async_trait]
impl Command<RemoveBookCommandRequest, RemoveBookCommandResponse> for RemoveBookCommand {
    async fn execute(&self, req: RemoveBookCommandRequest) -> Result<RemoveBookCommandResponse, CommandError> {
        self.catalog_service.delete_book_confirmed(req.book_id)
            .await.map_err(CommandError::from).map(|_| RemoveBookCommandResponse::new(req.book_id))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use crate::books::dto::BookDto;
    use crate::catalog::command::remove_book_cmd::{RemoveBookCommand, RemoveBookCommandRequest};
    use crate::catalog::domain::{CatalogService, SubmitOutcome};
    use crate::catalog::factory::MemoryCatalog;
    use crate::core::command::Command;

    #[tokio::test]
    async fn test_should_run_remove_book() {
        let catalog = MemoryCatalog::new().await;
        let book = BookDto::new("Dune", "Herbert", "Ace", Decimal::new(999, 2), 1);
        let book_id = match catalog.service().create_book(book, None).await.expect("should create book") {
            SubmitOutcome::Completed(book) => book.book_id,
            SubmitOutcome::Rejected(form) => panic!("unexpected rejection {:?}", form.errors),
        };

        let cmd = RemoveBookCommand::new(catalog.service());
        let res = cmd.execute(RemoveBookCommandRequest::new(book_id)).await.expect("should remove book");
        assert_eq!(book_id, res.book_id);
        assert!(!catalog.service().book_exists(book_id).await.expect("should check book"));

        cmd.execute(RemoveBookCommandRequest::new(book_id)).await.expect("removing twice should succeed");
    }
}
