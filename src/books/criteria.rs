use std::cmp::Ordering;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::BookEntity;
use crate::core::library::{LibraryError, LibraryResult, OrderBy, OrderDirection};

pub const DEFAULT_OFFSET: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 100;

// BookCriteria is the filter, sort and pagination request of a catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCriteria {
    pub offset: i64,
    pub limit: i64,
    pub ids: Option<Vec<String>>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub language: Option<String>,
    pub created_at: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub order_by: Vec<OrderBy>,
    pub order_direction: Vec<OrderDirection>,
}

impl Default for BookCriteria {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
            ids: None,
            title: None,
            author: None,
            isbn: None,
            publisher: None,
            published_date: None,
            language: None,
            created_at: None,
            from: None,
            to: None,
            order_by: vec![],
            order_direction: vec![],
        }
    }
}

impl BookCriteria {
    pub fn with_ids(mut self, ids: Vec<String>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn order(mut self, order_by: OrderBy, direction: OrderDirection) -> Self {
        self.order_by.push(order_by);
        self.order_direction.push(direction);
        self
    }

    // Normalizes and checks the criteria. An exact created-at date wins over a range.
    pub fn validate(&mut self) -> LibraryResult<()> {
        if self.created_at.is_some() {
            self.from = None;
            self.to = None;
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to < from {
                return Err(LibraryError::validation(
                    "Invalid dates input: 'to' must be 'later' than from", Some("to".to_string())));
            }
        }
        if self.order_by.len() != self.order_direction.len() {
            return Err(LibraryError::validation(
                format!("'orderBy' has {} elements but 'orderDirection' has {}",
                        self.order_by.len(), self.order_direction.len()).as_str(),
                Some("orderDirection".to_string())));
        }
        if self.offset < 0 {
            return Err(LibraryError::validation(
                "'offset' must be greater or equal to 0.", Some("offset".to_string())));
        }
        if self.limit < MIN_LIMIT || self.limit > MAX_LIMIT {
            return Err(LibraryError::validation(
                format!("'limit' must be between {} and {}.", MIN_LIMIT, MAX_LIMIT).as_str(),
                Some("limit".to_string())));
        }
        Ok(())
    }

    pub fn ids_param(&self) -> Option<String> {
        self.ids.as_ref().map(|ids| ids.join(","))
    }
}

pub fn parse_ids(ids: &str) -> Vec<String> {
    ids.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Author,
    Isbn,
    Publisher,
    Language,
}

impl TextField {
    pub fn name(&self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Author => "author",
            TextField::Isbn => "isbn",
            TextField::Publisher => "publisher",
            TextField::Language => "language",
        }
    }

    fn value<'a>(&self, book: &'a BookEntity) -> Option<&'a str> {
        match self {
            TextField::Title => Some(book.title.as_str()),
            TextField::Author => Some(book.author.as_str()),
            TextField::Isbn => book.isbn.as_deref(),
            TextField::Publisher => book.publisher.as_deref(),
            TextField::Language => book.language.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    IdIn(Vec<String>),
    Contains { field: TextField, value: String },
    PublishedOn(NaiveDate),
    CreatedOn(NaiveDate),
    CreatedFrom(NaiveDate),
    CreatedTo(NaiveDate),
}

impl Predicate {
    pub fn matches(&self, book: &BookEntity) -> bool {
        match self {
            Predicate::IdIn(ids) => ids.iter().any(|id| id == &book.book_id),
            Predicate::Contains { field, value } => {
                field.value(book).map(|v| v.contains(value.as_str())).unwrap_or(false)
            }
            Predicate::PublishedOn(date) => book.published_date == Some(*date),
            Predicate::CreatedOn(date) => book.created_at.date() == *date,
            Predicate::CreatedFrom(date) => book.created_at.date() >= *date,
            Predicate::CreatedTo(date) => book.created_at.date() <= *date,
        }
    }
}

/// The store-independent form of a listing: AND-ed predicates, ordering and a page window.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaQuery {
    pub predicates: Vec<Predicate>,
    pub ordering: Vec<(OrderBy, OrderDirection)>,
    pub offset: usize,
    pub limit: usize,
}

impl CriteriaQuery {
    pub fn matches(&self, book: &BookEntity) -> bool {
        self.predicates.iter().all(|p| p.matches(book))
    }

    // an empty id set can never match, stores may skip the read entirely
    pub fn is_empty_result(&self) -> bool {
        self.predicates.iter().any(|p| matches!(p, Predicate::IdIn(ids) if ids.is_empty()))
    }

    pub fn compare(&self, a: &BookEntity, b: &BookEntity) -> Ordering {
        let ordering = if self.ordering.is_empty() {
            a.created_at.cmp(&b.created_at)
        } else {
            self.ordering.iter().fold(Ordering::Equal, |acc, (key, dir)| {
                acc.then_with(|| {
                    let ord = match key {
                        OrderBy::Title => a.title.cmp(&b.title),
                        OrderBy::Author => a.author.cmp(&b.author),
                        OrderBy::CreatedAt => a.created_at.cmp(&b.created_at),
                    };
                    match dir {
                        OrderDirection::Asc => ord,
                        OrderDirection::Desc => ord.reverse(),
                    }
                })
            })
        };
        ordering.then_with(|| a.book_id.cmp(&b.book_id))
    }

    // filter, sort and then cut the page window
    pub fn apply(&self, books: Vec<BookEntity>) -> Vec<BookEntity> {
        if self.is_empty_result() {
            return vec![];
        }
        let mut matched: Vec<BookEntity> = books.into_iter().filter(|b| self.matches(b)).collect();
        matched.sort_by(|a, b| self.compare(a, b));
        matched.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

pub struct CriteriaQueryBuilder;

impl CriteriaQueryBuilder {
    pub fn build(criteria: &BookCriteria) -> CriteriaQuery {
        let mut predicates = vec![];
        if let Some(ids) = &criteria.ids {
            predicates.push(Predicate::IdIn(ids.clone()));
        }
        let text_filters = [
            (TextField::Title, &criteria.title),
            (TextField::Author, &criteria.author),
            (TextField::Isbn, &criteria.isbn),
            (TextField::Publisher, &criteria.publisher),
            (TextField::Language, &criteria.language),
        ];
        for (field, value) in text_filters {
            if let Some(value) = value {
                predicates.push(Predicate::Contains { field, value: value.clone() });
            }
        }
        if let Some(published_date) = criteria.published_date {
            predicates.push(Predicate::PublishedOn(published_date));
        }
        if let Some(created_at) = criteria.created_at {
            predicates.push(Predicate::CreatedOn(created_at));
        } else {
            if let Some(from) = criteria.from {
                predicates.push(Predicate::CreatedFrom(from));
            }
            if let Some(to) = criteria.to {
                predicates.push(Predicate::CreatedTo(to));
            }
        }
        CriteriaQuery {
            predicates,
            ordering: criteria.order_by.iter().copied()
                .zip(criteria.order_direction.iter().copied()).collect(),
            offset: criteria.offset.max(0) as usize,
            limit: criteria.limit.clamp(MIN_LIMIT, MAX_LIMIT) as usize,
        }
    }
}
