pub mod service;

use async_trait::async_trait;
use crate::books::criteria::BookCriteria;
use crate::books::dto::{BookCreate, BookDto, BookUpdate};
use crate::core::library::LibraryResult;

// CatalogService owns the local book records. It knows nothing about ownership.
#[async_trait]
pub trait CatalogService: Sync + Send {
    async fn add_book(&self, book: &BookCreate) -> LibraryResult<BookDto>;
    async fn remove_book(&self, id: &str) -> LibraryResult<()>;
    async fn update_book(&self, id: &str, update: &BookUpdate) -> LibraryResult<BookDto>;
    async fn find_book_by_id(&self, id: &str) -> LibraryResult<BookDto>;
    async fn find_book_by_title(&self, title: &str) -> LibraryResult<BookDto>;
    async fn list_books(&self, criteria: &BookCriteria) -> LibraryResult<Vec<BookDto>>;
}
