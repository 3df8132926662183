pub mod ddb_book_repository;
pub mod memory_book_repository;

use async_trait::async_trait;
use crate::books::criteria::CriteriaQuery;
use crate::books::domain::model::BookEntity;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;

// BookRepository keeps titles unique: create and update fail with DuplicateKey when another
// book already holds the title.
#[async_trait]
pub trait BookRepository: Repository<BookEntity> {
    async fn find_by_title(&self, title: &str) -> LibraryResult<BookEntity>;

    async fn query(&self, query: &CriteriaQuery) -> LibraryResult<Vec<BookEntity>>;
}
