use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::{next_version, Repository};

/// In-memory book store with the same id assignment and version checks as the DynamoDB one.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookRepository {
    books: Arc<RwLock<HashMap<i64, BookEntity>>>,
    last_id: Arc<AtomicI64>,
    writes: Arc<AtomicUsize>,
}

impl MemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of inserts, updates and deletes that reached the store.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Repository<BookEntity> for MemoryBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<i64> {
        let mut books = self.books.write().await;
        let book_id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut stored = entity.clone();
        stored.book_id = book_id;
        stored.version = 0;
        books.insert(book_id, stored);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(book_id)
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<i64> {
        let mut books = self.books.write().await;
        match books.get_mut(&entity.book_id) {
            Some(stored) if stored.version == entity.version => {
                let mut updated = entity.clone();
                updated.version = next_version(entity.version)?;
                updated.updated_at = Utc::now().naive_utc();
                *stored = updated;
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(stored.version)
            }
            _ => Err(LibraryError::concurrency_conflict(
                format!("book {} was changed or removed since version {}", entity.book_id, entity.version).as_str())),
        }
    }

    async fn find(&self, id: i64) -> LibraryResult<Option<BookEntity>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> LibraryResult<usize> {
        let removed = self.books.write().await.remove(&id);
        if removed.is_some() {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn find_all(&self) -> LibraryResult<Vec<BookEntity>> {
        let mut books: Vec<BookEntity> = self.books.read().await.values().cloned().collect();
        books.sort_by_key(|book| book.book_id);
        Ok(books)
    }
}

impl BookRepository for MemoryBookRepository {}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use crate::books::domain::model::BookEntity;
    use crate::books::repository::memory_book_repository::MemoryBookRepository;
    use crate::core::library::LibraryError;
    use crate::core::repository::Repository;

    fn new_book() -> BookEntity {
        BookEntity::new("Dune", "Herbert", "Ace", Decimal::new(999, 2), 1)
    }

    #[tokio::test]
    async fn test_should_assign_ids_on_create() {
        let books_repo = MemoryBookRepository::new();
        let first = books_repo.create(&new_book()).await.expect("should create book");
        let second = books_repo.create(&new_book()).await.expect("should create book");
        assert_eq!(1, first);
        assert_eq!(2, second);
        let loaded = books_repo.get(second).await.expect("should return book");
        assert_eq!(second, loaded.book_id);
        assert_eq!(0, loaded.version);
    }

    #[tokio::test]
    async fn test_should_reject_stale_version() {
        let books_repo = MemoryBookRepository::new();
        let mut book = new_book();
        book.book_id = books_repo.create(&book).await.expect("should create book");

        book.title = "Dune Messiah".to_string();
        assert_eq!(1, books_repo.update(&book).await.expect("should update book"));
        let stale = books_repo.update(&book).await;
        assert!(matches!(stale, Err(LibraryError::ConcurrencyConflict { .. })));
        assert_eq!(2, books_repo.write_count());
    }

    #[tokio::test]
    async fn test_should_reject_max_version_without_write() {
        let books_repo = MemoryBookRepository::new();
        let mut book = new_book();
        book.book_id = books_repo.create(&book).await.expect("should create book");
        book.version = i64::MAX;
        let res = books_repo.update(&book).await;
        assert!(matches!(res, Err(LibraryError::ConcurrencyConflict { .. })));
        assert_eq!(1, books_repo.write_count());
        assert_eq!(0, books_repo.get(book.book_id).await.expect("should return book").version);
    }

    #[tokio::test]
    async fn test_should_report_conflict_for_removed_book() {
        let books_repo = MemoryBookRepository::new();
        let mut book = new_book();
        book.book_id = books_repo.create(&book).await.expect("should create book");
        assert_eq!(1, books_repo.delete(book.book_id).await.expect("should delete book"));

        let res = books_repo.update(&book).await;
        assert!(matches!(res, Err(LibraryError::ConcurrencyConflict { .. })));
    }

    #[tokio::test]
    async fn test_should_delete_and_check_existence() {
        let books_repo = MemoryBookRepository::new();
        let book_id = books_repo.create(&new_book()).await.expect("should create book");
        assert!(books_repo.exists(book_id).await.expect("should check book"));
        assert_eq!(1, books_repo.delete(book_id).await.expect("should delete book"));
        assert_eq!(0, books_repo.delete(book_id).await.expect("should delete book"));
        assert!(!books_repo.exists(book_id).await.expect("should check book"));
        assert!(matches!(books_repo.get(book_id).await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_list_books_in_id_order() {
        let books_repo = MemoryBookRepository::new();
        for _ in 0..3 {
            books_repo.create(&new_book()).await.expect("should create book");
        }
        let ids: Vec<i64> = books_repo.find_all().await.expect("should list books")
            .iter().map(|book| book.book_id).collect();
        assert_eq!(vec![1, 2, 3], ids);
    }
}
