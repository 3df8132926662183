use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::books::dto::{BookCreate, BookUpdate};
use crate::core::domain::Identifiable;
use crate::utils::date::{now, serializer};

// BookEntity is the persisted catalog record. Ownership of the book lives in the
// external asset service and is keyed by book_id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntity {
    pub book_id: String,
    pub version: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub language: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl BookEntity {
    pub fn new(title: &str, author: &str) -> Self {
        let now = now();
        Self {
            book_id: Uuid::new_v4().to_string(),
            version: 0,
            title: title.to_string(),
            author: author.to_string(),
            isbn: None,
            publisher: None,
            published_date: None,
            language: None,
            created_at: now,
            updated_at: now,
        }
    }

    // applies only the fields present in the patch, id and created_at never change
    pub fn apply_update(&mut self, update: &BookUpdate) {
        if let Some(title) = update.title.value() {
            self.title = title.clone();
        }
        if let Some(author) = update.author.value() {
            self.author = author.clone();
        }
        if let Some(isbn) = update.isbn.value() {
            self.isbn = Some(isbn.clone());
        }
        if let Some(publisher) = update.publisher.value() {
            self.publisher = Some(publisher.clone());
        }
        if let Some(published_date) = update.published_date.value() {
            self.published_date = Some(*published_date);
        }
        if let Some(language) = update.language.value() {
            self.language = Some(language.clone());
        }
        self.updated_at = now();
    }
}

impl From<&BookCreate> for BookEntity {
    fn from(other: &BookCreate) -> Self {
        let mut entity = BookEntity::new(other.title.as_str(), other.author.as_str());
        entity.isbn = other.isbn.clone();
        entity.publisher = other.publisher.clone();
        entity.published_date = other.published_date;
        entity.language = other.language.clone();
        entity
    }
}

impl Identifiable for BookEntity {
    fn id(&self) -> String {
        self.book_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
