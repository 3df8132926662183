use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::Mutex;
use crate::books::criteria::CriteriaQuery;
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;

// In-process store used for local runs and tests. Every check-then-write happens under one lock.
#[derive(Debug, Default)]
pub struct MemoryBookRepository {
    books: Mutex<HashMap<String, BookEntity>>,
}

impl MemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn title_taken(books: &HashMap<String, BookEntity>, title: &str, except_id: &str) -> bool {
    books.values().any(|b| b.title == title && b.book_id != except_id)
}

#[async_trait]
impl Repository<BookEntity> for MemoryBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let mut books = self.books.lock().await;
        if books.contains_key(&entity.book_id) {
            return Err(LibraryError::duplicate_key(format!("book {} already exists", entity.book_id).as_str()));
        }
        if title_taken(&books, entity.title.as_str(), "") {
            return Err(LibraryError::duplicate_key(format!("Book {} already exists.", entity.title).as_str()));
        }
        books.insert(entity.book_id.clone(), entity.clone());
        Ok(1)
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let mut books = self.books.lock().await;
        let current_version = match books.get(&entity.book_id) {
            Some(current) => current.version,
            None => return Err(LibraryError::not_found(format!("Book {} not found.", entity.book_id).as_str())),
        };
        if current_version != entity.version {
            return Err(LibraryError::database(
                format!("book {} was modified concurrently", entity.book_id).as_str(), None, false));
        }
        if title_taken(&books, entity.title.as_str(), entity.book_id.as_str()) {
            return Err(LibraryError::duplicate_key(format!("Book {} already exists.", entity.title).as_str()));
        }
        let mut updated = entity.clone();
        updated.version += 1;
        books.insert(updated.book_id.clone(), updated);
        Ok(1)
    }

    async fn get(&self, id: &str) -> LibraryResult<BookEntity> {
        self.books.lock().await.get(id).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("Book {} not found.", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.books.lock().await.remove(id).map(|_| 1)
            .ok_or_else(|| LibraryError::not_found(format!("Book {} not found.", id).as_str()))
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn find_by_title(&self, title: &str) -> LibraryResult<BookEntity> {
        self.books.lock().await.values().find(|b| b.title == title).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("Book {} not found.", title).as_str()))
    }

    async fn query(&self, query: &CriteriaQuery) -> LibraryResult<Vec<BookEntity>> {
        if query.is_empty_result() {
            return Ok(vec![]);
        }
        let books: Vec<BookEntity> = self.books.lock().await.values().cloned().collect();
        Ok(query.apply(books))
    }
}
