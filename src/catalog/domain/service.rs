use std::collections::HashMap;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use crate::books::domain::Book;
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::catalog::domain::{BookForm, CatalogService, SubmitOutcome, UpdateOutcome};
use crate::catalog::domain::upload::CoverImageUpload;
use crate::catalog::domain::validation::BookValidator;
use crate::core::domain::{Configuration, Identifiable};
use crate::core::library::{LibraryError, LibraryResult};
use crate::owners::dto::StoreOwnerDto;
use crate::owners::repository::StoreOwnerRepository;

pub(crate) struct CatalogServiceImpl {
    max_cover_image_bytes: u64,
    book_repository: Box<dyn BookRepository>,
    owner_repository: Box<dyn StoreOwnerRepository>,
    validator: Box<dyn BookValidator>,
}

impl CatalogServiceImpl {
    pub(crate) fn new(config: &Configuration, book_repository: Box<dyn BookRepository>,
                      owner_repository: Box<dyn StoreOwnerRepository>,
                      validator: Box<dyn BookValidator>) -> Self {
        Self {
            max_cover_image_bytes: config.max_cover_image_bytes,
            book_repository,
            owner_repository,
            validator,
        }
    }

    async fn find_joined(&self, id: i64) -> LibraryResult<BookDto> {
        let book = self.book_repository.find(id).await?
            .ok_or_else(|| LibraryError::not_found(format!("book not found for {}", id).as_str()))?;
        let owner = self.owner_repository.find(book.store_owner_id).await?;
        let mut dto = BookDto::from(&book);
        dto.store_owner = owner.as_ref().map(StoreOwnerDto::from);
        Ok(dto)
    }

    // Returns the form to re-display when the submission is invalid.
    async fn check_submission(&self, book: &BookDto, upload: Option<&CoverImageUpload>) -> LibraryResult<Option<BookForm>> {
        let owner_ids = self.owner_repository.find_ids().await?;
        let mut errors = self.validator.validate(book, &owner_ids);
        if let Some(upload) = upload {
            if upload.len() > self.max_cover_image_bytes {
                errors.add("cover_image_file", format!("cover image must not exceed {} bytes",
                                                        self.max_cover_image_bytes).as_str());
            }
        }
        if errors.is_valid() {
            Ok(None)
        } else {
            warn!(book_id = book.id(), errors = errors.len(), "rejected book submission");
            Ok(Some(BookForm::rejected(book.clone(), owner_ids, errors)))
        }
    }

    async fn commit_update(&self, entity: &BookEntity) -> LibraryResult<UpdateOutcome> {
        match self.book_repository.update(entity).await {
            Ok(version) => Ok(UpdateOutcome::Committed(version)),
            Err(LibraryError::ConcurrencyConflict { message }) => {
                warn!(book_id = entity.book_id, version = entity.version, "{}", message);
                if self.book_exists(entity.book_id).await? {
                    Ok(UpdateOutcome::ConflictRecordStillPresent)
                } else {
                    Ok(UpdateOutcome::ConflictRecordGone)
                }
            }
            Err(err) => Err(err),
        }
    }
}

fn require_id(id: Option<i64>) -> LibraryResult<i64> {
    id.ok_or_else(|| LibraryError::not_found("book id is required"))
}

fn upload_file_name(upload: Option<&CoverImageUpload>) -> Option<String> {
    upload.filter(|upload| !upload.is_empty())
        .and_then(CoverImageUpload::file_name)
        .map(str::to_string)
}

async fn materialize_cover(upload: Option<CoverImageUpload>) -> LibraryResult<Option<Vec<u8>>> {
    match upload {
        Some(upload) if !upload.is_empty() => Ok(Some(upload.materialize().await?)),
        _ => Ok(None),
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn list_books(&self) -> LibraryResult<Vec<BookDto>> {
        let books = self.book_repository.find_all().await?;
        let owners: HashMap<i64, StoreOwnerDto> = self.owner_repository.find_all().await?
            .iter().map(|owner| (owner.id(), StoreOwnerDto::from(owner))).collect();
        Ok(books.iter().map(|book| {
            let mut dto = BookDto::from(book);
            dto.store_owner = owners.get(&book.store_owner_id).cloned();
            dto
        }).collect())
    }

    async fn get_book_detail(&self, id: Option<i64>) -> LibraryResult<BookDto> {
        self.find_joined(require_id(id)?).await
    }

    async fn prepare_create_form(&self) -> LibraryResult<BookForm> {
        Ok(BookForm::new(None, self.owner_repository.find_ids().await?))
    }

    async fn create_book(&self, book: BookDto, upload: Option<CoverImageUpload>) -> LibraryResult<SubmitOutcome> {
        if let Some(form) = self.check_submission(&book, upload.as_ref()).await? {
            return Ok(SubmitOutcome::Rejected(form));
        }
        let cover_file = upload_file_name(upload.as_ref());
        let mut entity = BookEntity::from(&book);
        if let Some(bytes) = materialize_cover(upload).await? {
            entity.cover_image_data = Some(bytes);
        }
        let now = Utc::now().naive_utc();
        entity.version = 0;
        entity.created_at = now;
        entity.updated_at = now;
        entity.book_id = self.book_repository.create(&entity).await?;

        let created = BookDto::from(&entity);
        info!(book_id = created.id(), store_owner_id = created.store_owner_id(),
            cover = created.has_cover_image(), cover_file = ?cover_file, "created book");
        Ok(SubmitOutcome::Completed(created))
    }

    async fn prepare_edit_form(&self, id: Option<i64>) -> LibraryResult<BookForm> {
        let book = self.book_repository.get(require_id(id)?).await
            .map(|b| BookDto::from(&b))?;
        Ok(BookForm::new(Some(book), self.owner_repository.find_ids().await?))
    }

    async fn edit_book(&self, id: i64, book: BookDto, upload: Option<CoverImageUpload>) -> LibraryResult<SubmitOutcome> {
        if id != book.book_id {
            return Err(LibraryError::not_found(
                format!("book id {} does not match submitted book {}", id, book.book_id).as_str()));
        }
        if let Some(form) = self.check_submission(&book, upload.as_ref()).await? {
            return Ok(SubmitOutcome::Rejected(form));
        }
        // the submitted form never carries the stored image, so start from the stored record
        let existing = self.book_repository.get(id).await?;
        let cover_file = upload_file_name(upload.as_ref());
        let mut entity = BookEntity::from(&book);
        entity.created_at = existing.created_at;
        entity.updated_at = Utc::now().naive_utc();
        entity.cover_image_data = match materialize_cover(upload).await? {
            Some(bytes) => Some(bytes),
            None => existing.cover_image_data,
        };

        match self.commit_update(&entity).await? {
            UpdateOutcome::Committed(version) => {
                entity.version = version;
                let updated = BookDto::from(&entity);
                info!(book_id = updated.id(), version = updated.version(),
                    cover = updated.has_cover_image(), cover_file = ?cover_file, "updated book");
                Ok(SubmitOutcome::Completed(updated))
            }
            UpdateOutcome::ConflictRecordGone => {
                Err(LibraryError::not_found(format!("book {} was removed while editing", id).as_str()))
            }
            UpdateOutcome::ConflictRecordStillPresent => {
                Err(LibraryError::concurrency_conflict(
                    format!("book {} was modified by another writer since version {}", id, book.version).as_str()))
            }
        }
    }

    async fn prepare_delete_form(&self, id: Option<i64>) -> LibraryResult<BookDto> {
        self.find_joined(require_id(id)?).await
    }

    async fn delete_book_confirmed(&self, id: i64) -> LibraryResult<()> {
        if let Some(book) = self.book_repository.find(id).await? {
            self.book_repository.delete(book.book_id).await?;
            info!(book_id = id, "deleted book");
        }
        Ok(())
    }

    async fn book_exists(&self, id: i64) -> LibraryResult<bool> {
        self.book_repository.exists(id).await
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            book_id: other.book_id,
            version: other.version,
            title: other.title.to_string(),
            author_name: other.author_name.to_string(),
            publisher_name: other.publisher_name.to_string(),
            price: other.price,
            image_url: other.image_url.clone(),
            store_owner_id: other.store_owner_id,
            cover_image_data: other.cover_image_data.clone(),
            store_owner: None,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&BookDto> for BookEntity {
    fn from(other: &BookDto) -> Self {
        Self {
            book_id: other.book_id,
            version: other.version,
            title: other.title.to_string(),
            author_name: other.author_name.to_string(),
            publisher_name: other.publisher_name.to_string(),
            price: other.price,
            image_url: other.image_url.clone(),
            store_owner_id: other.store_owner_id,
            cover_image_data: other.cover_image_data.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
