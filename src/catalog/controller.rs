use std::collections::HashMap;
use std::str::FromStr;
use async_trait::async_trait;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    extract::multipart::Field,
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use rust_decimal::Decimal;
use crate::books::dto::BookDto;
use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest, AddBookCommandResponse};
use crate::catalog::command::book_form_cmd::{BookFormCommand, BookFormCommandRequest, BookFormCommandResponse};
use crate::catalog::command::get_book_cmd::{BookView, GetBookCommand, GetBookCommandRequest, GetBookCommandResponse};
use crate::catalog::command::list_books_cmd::{ListBooksCommand, ListBooksCommandRequest, ListBooksCommandResponse};
use crate::catalog::command::remove_book_cmd::{RemoveBookCommand, RemoveBookCommandRequest};
use crate::catalog::command::update_book_cmd::{UpdateBookCommand, UpdateBookCommandRequest, UpdateBookCommandResponse};
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::upload::CoverImageUpload;
use crate::catalog::factory;
use crate::core::command::{Command, CommandError};
use crate::core::controller::{AppState, multipart_to_server_error, ServerError};
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};

const BOOKS_PATH: &str = "/books";
const COVER_IMAGE_FIELD: &str = "cover_image_file";
const FORM_FIELDS_ALLOWANCE: usize = 64 * 1024;

// CatalogProvider builds the catalog service a request runs against.
#[async_trait]
pub trait CatalogProvider: Clone + Send + Sync + 'static {
    fn config(&self) -> &Configuration;
    async fn catalog_service(&self) -> Box<dyn CatalogService>;
}

#[async_trait]
impl CatalogProvider for AppState {
    fn config(&self) -> &Configuration {
        &self.config
    }

    async fn catalog_service(&self) -> Box<dyn CatalogService> {
        factory::create_catalog_service(&self.config, self.store).await
    }
}

pub fn catalog_router<S: CatalogProvider, B>(state: S) -> Router<(), B>
where
    B: axum::body::HttpBody + Send + 'static,
    B::Data: Into<axum::body::Bytes> + Send,
    B::Error: Into<axum::BoxError>,
{
    let limit = body_limit(state.config());
    Router::new()
        .route("/books", get(list_books::<S>).post(add_book::<S>))
        .route("/books/create", get(create_form::<S>))
        .route("/books/:id", get(find_book_by_id::<S>))
        .route("/books/:id/edit", get(edit_form::<S>).post(update_book::<S>))
        .route("/books/:id/delete", get(delete_form::<S>).post(remove_book::<S>))
        .layer(limit)
        .with_state(state)
}

// A cover up to twice the allowed size still reaches validation, so it comes back as a
// field error instead of a transport error.
fn body_limit(config: &Configuration) -> DefaultBodyLimit {
    let cover_bytes = usize::try_from(config.max_cover_image_bytes).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(cover_bytes.saturating_mul(2).saturating_add(FORM_FIELDS_ALLOWANCE))
}

fn library_to_server_error(err: LibraryError) -> ServerError {
    ServerError::from(CommandError::from(err))
}

// ids that do not parse are treated like absent ones
fn parse_id(book_id: &str) -> Option<i64> {
    book_id.parse::<i64>().ok()
}

async fn list_books<S: CatalogProvider>(
    State(state): State<S>) -> Result<Json<ListBooksCommandResponse>, ServerError> {
    let svc = state.catalog_service().await;
    let res = ListBooksCommand::new(svc).execute(ListBooksCommandRequest::default()).await?;
    Ok(Json(res))
}

async fn find_book_by_id<S: CatalogProvider>(
    State(state): State<S>,
    Path(book_id): Path<String>) -> Result<Json<GetBookCommandResponse>, ServerError> {
    let req = GetBookCommandRequest::new(parse_id(book_id.as_str()), BookView::Detail);
    let svc = state.catalog_service().await;
    let res = GetBookCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

async fn create_form<S: CatalogProvider>(
    State(state): State<S>) -> Result<Json<BookFormCommandResponse>, ServerError> {
    let svc = state.catalog_service().await;
    let res = BookFormCommand::new(svc).execute(BookFormCommandRequest::Create).await?;
    Ok(Json(res))
}

async fn add_book<S: CatalogProvider>(
    State(state): State<S>,
    multipart: Multipart) -> Result<Response, ServerError> {
    let (book, cover_image) = read_book_submission(multipart, state.config().max_cover_image_bytes).await?;
    let svc = state.catalog_service().await;
    let res = AddBookCommand::new(svc).execute(AddBookCommandRequest::new(book, cover_image)).await?;
    Ok(match res {
        AddBookCommandResponse::Created(_) => Redirect::to(BOOKS_PATH).into_response(),
        AddBookCommandResponse::Rejected(form) => (StatusCode::UNPROCESSABLE_ENTITY, Json(form)).into_response(),
    })
}

async fn edit_form<S: CatalogProvider>(
    State(state): State<S>,
    Path(book_id): Path<String>) -> Result<Json<BookFormCommandResponse>, ServerError> {
    let req = BookFormCommandRequest::Edit { book_id: parse_id(book_id.as_str()) };
    let svc = state.catalog_service().await;
    let res = BookFormCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

async fn update_book<S: CatalogProvider>(
    State(state): State<S>,
    Path(book_id): Path<String>,
    multipart: Multipart) -> Result<Response, ServerError> {
    let book_id = parse_id(book_id.as_str()).ok_or_else(|| library_to_server_error(
        LibraryError::not_found(format!("book not found for {}", book_id).as_str())))?;
    let (book, cover_image) = read_book_submission(multipart, state.config().max_cover_image_bytes).await?;
    let svc = state.catalog_service().await;
    let res = UpdateBookCommand::new(svc).execute(UpdateBookCommandRequest::new(book_id, book, cover_image)).await?;
    Ok(match res {
        UpdateBookCommandResponse::Updated(_) => Redirect::to(BOOKS_PATH).into_response(),
        UpdateBookCommandResponse::Rejected(form) => (StatusCode::UNPROCESSABLE_ENTITY, Json(form)).into_response(),
    })
}

async fn delete_form<S: CatalogProvider>(
    State(state): State<S>,
    Path(book_id): Path<String>) -> Result<Json<GetBookCommandResponse>, ServerError> {
    let req = GetBookCommandRequest::new(parse_id(book_id.as_str()), BookView::DeleteConfirmation);
    let svc = state.catalog_service().await;
    let res = GetBookCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

async fn remove_book<S: CatalogProvider>(
    State(state): State<S>,
    Path(book_id): Path<String>) -> Result<Redirect, ServerError> {
    // a non-numeric id can not name a stored book, so there is nothing to delete
    if let Some(book_id) = parse_id(book_id.as_str()) {
        let svc = state.catalog_service().await;
        RemoveBookCommand::new(svc).execute(RemoveBookCommandRequest::new(book_id)).await?;
    }
    Ok(Redirect::to(BOOKS_PATH))
}

async fn read_book_submission(mut multipart: Multipart, max_cover_bytes: u64) -> Result<(BookDto, Option<CoverImageUpload>), ServerError> {
    let mut fields = HashMap::new();
    let mut cover_image = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_to_server_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == COVER_IMAGE_FIELD {
            cover_image = Some(read_cover_image(field, max_cover_bytes).await?);
        } else {
            let value = field.text().await.map_err(multipart_to_server_error)?;
            fields.insert(name, value);
        }
    }
    let book = parse_book_fields(&fields).map_err(library_to_server_error)?;
    Ok((book, cover_image))
}

// Buffers at most max_cover_bytes; a longer cover keeps only its length so validation can reject it.
async fn read_cover_image(mut field: Field<'_>, max_cover_bytes: u64) -> Result<CoverImageUpload, ServerError> {
    let file_name = field.file_name().map(str::to_string);
    let mut bytes = Vec::new();
    let mut length: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(multipart_to_server_error)? {
        length = length.saturating_add(chunk.len() as u64);
        if length <= max_cover_bytes {
            bytes.extend_from_slice(&chunk);
        } else if !bytes.is_empty() {
            bytes = Vec::new();
        }
    }
    if length > max_cover_bytes {
        return Ok(CoverImageUpload::new(file_name, length, tokio::io::empty()));
    }
    Ok(CoverImageUpload::from_bytes(file_name, bytes))
}

fn parse_number<T: FromStr>(fields: &HashMap<String, String>, name: &str) -> LibraryResult<Option<T>> {
    match fields.get(name).map(|value| value.trim()).filter(|value| !value.is_empty()) {
        Some(value) => value.parse::<T>().map(Some).map_err(|_| LibraryError::validation(
            format!("{} is not a valid number: {}", name, value).as_str(), Some(name.to_string()))),
        None => Ok(None),
    }
}

fn parse_text(fields: &HashMap<String, String>, name: &str) -> String {
    fields.get(name).map(|value| value.trim().to_string()).unwrap_or_default()
}

// Text fields of a book form; missing numbers default to zero and blank text is left to validation.
pub(crate) fn parse_book_fields(fields: &HashMap<String, String>) -> LibraryResult<BookDto> {
    let cover_image_data = match fields.get("cover_image_data").filter(|value| !value.is_empty()) {
        Some(encoded) => Some(STANDARD.decode(encoded.trim()).map_err(|err| LibraryError::validation(
            format!("cover_image_data is not valid base64: {}", err).as_str(), Some("cover_image_data".to_string())))?),
        None => None,
    };
    Ok(BookDto {
        book_id: parse_number(fields, "book_id")?.unwrap_or_default(),
        version: parse_number(fields, "version")?.unwrap_or_default(),
        title: parse_text(fields, "title"),
        author_name: parse_text(fields, "author_name"),
        publisher_name: parse_text(fields, "publisher_name"),
        price: parse_number::<Decimal>(fields, "price")?.unwrap_or_default(),
        image_url: Some(parse_text(fields, "image_url")).filter(|url| !url.is_empty()),
        store_owner_id: parse_number(fields, "store_owner_id")?.unwrap_or_default(),
        cover_image_data,
        store_owner: None,
        created_at: Utc::now().naive_utc(),
        updated_at: Utc::now().naive_utc(),
    })
}
