use async_trait::async_trait;
use serde::Serialize;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub struct GetBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl GetBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

// BookView selects the page a single book is loaded for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookView {
    Detail,
    DeleteConfirmation,
}

#[derive(Debug)]
pub struct GetBookCommandRequest {
    pub book_id: Option<i64>,
    pub view: BookView,
}

impl GetBookCommandRequest {
    pub fn new(book_id: Option<i64>, view: BookView) -> Self {
        Self {
            book_id,
            view,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetBookCommandResponse {
    pub book: BookDto,
}

impl GetBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<GetBookCommandRequest, GetBookCommandResponse> for GetBookCommand {
    async fn execute(&self, req: GetBookCommandRequest) -> Result<GetBookCommandResponse, CommandError> {
        let res = match req.view {
            BookView::Detail => self.catalog_service.get_book_detail(req.book_id).await,
            BookView::DeleteConfirmation => self.catalog_service.prepare_delete_form(req.book_id).await,
        };
        res.map_err(CommandError::from).map(GetBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use crate::books::dto::BookDto;
    use crate::catalog::command::get_book_cmd::{BookView, GetBookCommand, GetBookCommandRequest};
    use crate::catalog::domain::{CatalogService, SubmitOutcome};
    use crate::catalog::factory::MemoryCatalog;
    use crate::core::command::{Command, CommandError};

    #[tokio::test]
    async fn test_should_run_get_book() {
        let catalog = MemoryCatalog::new().await;
        let book = BookDto::new("Dune", "Herbert", "Ace", Decimal::new(999, 2), 2);
        let book_id = match catalog.service().create_book(book, None).await.expect("should create book") {
            SubmitOutcome::Completed(book) => book.book_id,
            SubmitOutcome::Rejected(form) => panic!("unexpected rejection {:?}", form.errors),
        };

        let cmd = GetBookCommand::new(catalog.service());
        for view in [BookView::Detail, BookView::DeleteConfirmation] {
            let res = cmd.execute(GetBookCommandRequest::new(Some(book_id), view)).await.expect("should get book");
            assert_eq!(book_id, res.book.book_id);
            assert_eq!("Harbor Books", res.book.store_owner.expect("owner should be joined").name.as_str());
        }
    }

    #[tokio::test]
    async fn test_should_fail_get_book_without_id() {
        let catalog = MemoryCatalog::new().await;
        let cmd = GetBookCommand::new(catalog.service());
        let res = cmd.execute(GetBookCommandRequest::new(None, BookView::Detail)).await;
        assert!(matches!(res, Err(CommandError::NotFound { .. })));
        let res = cmd.execute(GetBookCommandRequest::new(Some(42), BookView::DeleteConfirmation)).await;
        assert!(matches!(res, Err(CommandError::NotFound { .. })));
    }
}
