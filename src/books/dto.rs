use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use crate::books::domain::model::BookEntity;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult};
use crate::utils::date::serializer;

// BookDto is a data transfer object for Catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    #[serde(rename = "id")]
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

impl Identifiable for BookDto {
    fn id(&self) -> String {
        self.book_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            book_id: other.book_id.to_string(),
            version: other.version,
            title: other.title.to_string(),
            author: other.author.to_string(),
            isbn: other.isbn.clone(),
            publisher: other.publisher.clone(),
            published_date: other.published_date,
            language: other.language.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

// BookCreate is the draft of a new book, the id and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCreate {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub language: Option<String>,
}

impl BookCreate {
    pub fn new(title: &str, author: &str) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            isbn: None,
            publisher: None,
            published_date: None,
            language: None,
        }
    }

    pub fn validate(&self) -> LibraryResult<()> {
        if self.title.trim().is_empty() {
            return Err(LibraryError::validation("'title' is mandatory.", Some("title".to_string())));
        }
        if self.author.trim().is_empty() {
            return Err(LibraryError::validation("'author' is mandatory.", Some("author".to_string())));
        }
        Ok(())
    }
}

/// A single field of a partial update. A missing or `null` JSON value deserializes to
/// `Unchanged`, so a patch can overwrite a field but never clear it.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Unchanged,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unchanged
    }
}

impl<T> Patch<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Unchanged => None,
            Patch::Set(v) => Some(v),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Patch::Set(v),
            None => Patch::Unchanged,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

// BookUpdate carries the fields a caller wants to overwrite
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookUpdate {
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub author: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub isbn: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub publisher: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub published_date: Patch<NaiveDate>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub language: Patch<String>,
}

impl BookUpdate {
    pub fn validate(&self) -> LibraryResult<()> {
        if let Some(title) = self.title.value() {
            if title.trim().is_empty() {
                return Err(LibraryError::validation("'title' must not be blank.", Some("title".to_string())));
            }
        }
        if let Some(author) = self.author.value() {
            if author.trim().is_empty() {
                return Err(LibraryError::validation("'author' must not be blank.", Some("author".to_string())));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crate::books::domain::model::BookEntity;
    use crate::books::dto::{BookCreate, BookDto, BookUpdate, Patch};

    #[tokio::test]
    async fn test_should_build_book_dto_from_entity() {
        let book = BookEntity::new("Dune", "Frank Herbert");
        let dto = BookDto::from(&book);
        assert_eq!(book.book_id, dto.book_id);
        let json = serde_json::to_value(&dto).expect("should serialize");
        assert_eq!("Dune", json["title"]);
        assert_eq!(book.book_id.as_str(), json["id"]);
        assert!(json.get("createdAt").is_some());
    }

    #[tokio::test]
    async fn test_should_validate_create() {
        assert!(BookCreate::new("Dune", "Frank Herbert").validate().is_ok());
        assert!(BookCreate::new(" ", "Frank Herbert").validate().is_err());
        assert!(BookCreate::new("Dune", "").validate().is_err());
    }

    #[tokio::test]
    async fn test_should_parse_partial_update() {
        let update: BookUpdate = serde_json::from_str(r#"{"title": "Children of Dune", "isbn": null, "publishedDate": "1976-04-01"}"#)
            .expect("should parse update");
        assert_eq!(Patch::Set("Children of Dune".to_string()), update.title);
        assert_eq!(Patch::Unchanged, update.author);
        assert_eq!(Patch::Unchanged, update.isbn);
        assert_eq!(Patch::Set(NaiveDate::from_ymd_opt(1976, 4, 1).expect("valid date")), update.published_date);

        let json = serde_json::to_value(&update).expect("should serialize update");
        assert_eq!(2, json.as_object().map(|o| o.len()).unwrap_or_default());
    }
}
