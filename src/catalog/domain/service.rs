use std::sync::Arc;
use async_trait::async_trait;
use crate::books::criteria::{BookCriteria, CriteriaQueryBuilder};
use crate::books::domain::model::BookEntity;
use crate::books::dto::{BookCreate, BookDto, BookUpdate};
use crate::books::repository::BookRepository;
use crate::catalog::domain::CatalogService;
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;

pub(crate) struct CatalogServiceImpl {
    book_repository: Arc<dyn BookRepository>,
}

impl CatalogServiceImpl {
    pub(crate) fn new(_config: &Configuration, book_repository: Arc<dyn BookRepository>) -> Self {
        Self {
            book_repository,
        }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn add_book(&self, book: &BookCreate) -> LibraryResult<BookDto> {
        book.validate()?;
        let entity = BookEntity::from(book);
        let _ = self.book_repository.create(&entity).await?;
        Ok(BookDto::from(&entity))
    }

    async fn remove_book(&self, id: &str) -> LibraryResult<()> {
        self.book_repository.delete(id).await.map(|_| ())
    }

    async fn update_book(&self, id: &str, update: &BookUpdate) -> LibraryResult<BookDto> {
        update.validate()?;
        let mut entity = self.book_repository.get(id).await?;
        entity.apply_update(update);
        let _ = self.book_repository.update(&entity).await?;
        entity.version += 1;
        Ok(BookDto::from(&entity))
    }

    async fn find_book_by_id(&self, id: &str) -> LibraryResult<BookDto> {
        self.book_repository.get(id).await.map(|b| BookDto::from(&b))
    }

    async fn find_book_by_title(&self, title: &str) -> LibraryResult<BookDto> {
        self.book_repository.find_by_title(title).await.map(|b| BookDto::from(&b))
    }

    async fn list_books(&self, criteria: &BookCriteria) -> LibraryResult<Vec<BookDto>> {
        let query = CriteriaQueryBuilder::build(criteria);
        let res = self.book_repository.query(&query).await?;
        Ok(res.iter().map(BookDto::from).collect())
    }
}
