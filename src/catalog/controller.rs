use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use crate::books::criteria::{parse_ids, BookCriteria, DEFAULT_LIMIT, DEFAULT_OFFSET};
use crate::books::dto::{BookCreate, BookDto, BookUpdate};
use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
use crate::catalog::command::find_book_by_title_cmd::{FindBookByTitleCommand, FindBookByTitleCommandRequest};
use crate::catalog::command::get_book_cmd::{GetBookCommand, GetBookCommandRequest};
use crate::catalog::command::list_books_cmd::{ListBooksCommand, ListBooksCommandRequest};
use crate::catalog::command::remove_book_cmd::{RemoveBookCommand, RemoveBookCommandRequest};
use crate::catalog::command::update_book_cmd::{UpdateBookCommand, UpdateBookCommandRequest};
use crate::core::command::Command;
use crate::core::controller::{authorization, json_to_server_error, AppState, ServerError};
use crate::core::library::{LibraryError, LibraryResult, OrderBy, OrderDirection};

// Query string of GET /api/v1/books, list values are comma separated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookQueryParams {
    offset: Option<String>,
    limit: Option<String>,
    ids: Option<String>,
    title: Option<String>,
    author: Option<String>,
    isbn: Option<String>,
    publisher: Option<String>,
    published_date: Option<String>,
    language: Option<String>,
    created_at: Option<String>,
    from: Option<String>,
    to: Option<String>,
    order_by: Option<String>,
    order_direction: Option<String>,
}

fn parse_number(name: &str, value: Option<&String>, default: i64) -> LibraryResult<i64> {
    match value {
        Some(v) => v.trim().parse::<i64>().map_err(|_| LibraryError::validation(
            format!("'{}' must be a number.", name).as_str(), Some(name.to_string()))),
        None => Ok(default),
    }
}

fn parse_day(name: &str, value: Option<&String>) -> LibraryResult<Option<NaiveDate>> {
    match value {
        Some(v) => NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map(Some).map_err(|_| LibraryError::validation(
            format!("'{}' must be a date formatted as yyyy-MM-dd.", name).as_str(), Some(name.to_string()))),
        None => Ok(None),
    }
}

fn parse_list<T>(value: Option<&String>) -> LibraryResult<Vec<T>>
    where T: for<'a> TryFrom<&'a str, Error=LibraryError> {
    value.map(|v| parse_ids(v).iter().map(|s| T::try_from(s.as_str())).collect())
        .unwrap_or_else(|| Ok(vec![]))
}

impl TryFrom<BookQueryParams> for BookCriteria {
    type Error = LibraryError;

    fn try_from(params: BookQueryParams) -> Result<Self, Self::Error> {
        Ok(BookCriteria {
            offset: parse_number("offset", params.offset.as_ref(), DEFAULT_OFFSET)?,
            limit: parse_number("limit", params.limit.as_ref(), DEFAULT_LIMIT)?,
            ids: params.ids.as_deref().map(parse_ids),
            published_date: parse_day("publishedDate", params.published_date.as_ref())?,
            created_at: parse_day("createdAt", params.created_at.as_ref())?,
            from: parse_day("from", params.from.as_ref())?,
            to: parse_day("to", params.to.as_ref())?,
            order_by: parse_list::<OrderBy>(params.order_by.as_ref())?,
            order_direction: parse_list::<OrderDirection>(params.order_direction.as_ref())?,
            title: params.title,
            author: params.author,
            isbn: params.isbn,
            publisher: params.publisher,
            language: params.language,
        })
    }
}

pub(crate) async fn add_book(
    State(state): State<AppState>,
    headers: HeaderMap,
    json: Json<Value>) -> Result<(StatusCode, Json<BookDto>), ServerError> {
    let book: BookCreate = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let req = AddBookCommandRequest::new(authorization(&headers), book);
    let res = AddBookCommand::new(state.catalog, state.ownership, state.authenticator).execute(req).await?;
    Ok((StatusCode::CREATED, Json(res.book)))
}

pub(crate) async fn list_books(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<BookQueryParams>) -> Result<Json<Vec<BookDto>>, ServerError> {
    let criteria = BookCriteria::try_from(params)?;
    let req = ListBooksCommandRequest::new(authorization(&headers), criteria);
    let res = ListBooksCommand::new(state.catalog, state.ownership, state.authenticator).execute(req).await?;
    Ok(Json(res.books))
}

pub(crate) async fn find_book_by_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(book_id): Path<String>) -> Result<Json<BookDto>, ServerError> {
    let req = GetBookCommandRequest::new(authorization(&headers), book_id.as_str());
    let res = GetBookCommand::new(state.catalog, state.ownership, state.authenticator).execute(req).await?;
    Ok(Json(res.book))
}

pub(crate) async fn find_book_by_title(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(title): Path<String>) -> Result<Json<BookDto>, ServerError> {
    let req = FindBookByTitleCommandRequest::new(authorization(&headers), title.as_str());
    let res = FindBookByTitleCommand::new(state.catalog, state.ownership, state.authenticator).execute(req).await?;
    Ok(Json(res.book))
}

pub(crate) async fn update_book(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(book_id): Path<String>,
    json: Json<Value>) -> Result<Json<BookDto>, ServerError> {
    let update: BookUpdate = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let req = UpdateBookCommandRequest::new(authorization(&headers), book_id.as_str(), update);
    let res = UpdateBookCommand::new(state.catalog, state.ownership, state.authenticator).execute(req).await?;
    Ok(Json(res.book))
}

pub(crate) async fn remove_book(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(book_id): Path<String>) -> Result<StatusCode, ServerError> {
    let req = RemoveBookCommandRequest::new(authorization(&headers), book_id.as_str());
    let _ = RemoveBookCommand::new(state.catalog, state.ownership, state.authenticator).execute(req).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn app(state: AppState) -> Router<(), lambda_http::Body> {
    Router::new()
        .route("/api/v1/books", post(add_book).get(list_books))
        .route("/api/v1/books/title/:title", get(find_book_by_title))
        .route("/api/v1/books/:id",
               get(find_book_by_id).patch(update_book).delete(remove_book))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use axum::extract::{Path, Query, State};
    use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
    use axum::response::Json;
    use chrono::NaiveDate;
    use serde_json::json;
    use crate::books::criteria::BookCriteria;
    use crate::books::repository::memory_book_repository::MemoryBookRepository;
    use crate::catalog::controller::{add_book, find_book_by_id, find_book_by_title, list_books,
                                     remove_book, update_book, BookQueryParams};
    use crate::catalog::domain::service::CatalogServiceImpl;
    use crate::core::controller::AppState;
    use crate::core::domain::Configuration;
    use crate::core::library::{OrderBy, OrderDirection};
    use crate::core::security::{DigitalUser, StaticAuthenticator};
    use crate::gateway::memory::service::MemoryOwnershipService;

    fn state() -> AppState {
        let config = Configuration::new("test");
        AppState::with(
            Arc::new(CatalogServiceImpl::new(&config, Arc::new(MemoryBookRepository::new()))),
            Arc::new(MemoryOwnershipService::new()),
            Arc::new(StaticAuthenticator::new(DigitalUser::new("alice"))))
    }

    fn bearer() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer token"));
        headers
    }

    #[tokio::test]
    async fn test_should_serve_book_lifecycle() {
        let state = state();
        let (status, Json(book)) = add_book(State(state.clone()), bearer(),
                                            Json(json!({"title": "Dune", "author": "Frank Herbert"})))
            .await.expect("should add book");
        assert_eq!(StatusCode::CREATED, status);

        let Json(loaded) = find_book_by_id(State(state.clone()), bearer(), Path(book.book_id.to_string()))
            .await.expect("should get book");
        assert_eq!(book, loaded);

        let Json(by_title) = find_book_by_title(State(state.clone()), bearer(), Path("Dune".to_string()))
            .await.expect("should get book");
        assert_eq!(book.book_id, by_title.book_id);

        let Json(updated) = update_book(State(state.clone()), bearer(), Path(book.book_id.to_string()),
                                        Json(json!({"language": "en", "title": null})))
            .await.expect("should update book");
        assert_eq!("Dune", updated.title);
        assert_eq!(Some("en".to_string()), updated.language);

        let params = BookQueryParams { title: Some("Du".to_string()), ..BookQueryParams::default() };
        let Json(books) = list_books(State(state.clone()), bearer(), Query(params))
            .await.expect("should list books");
        assert_eq!(1, books.len());

        let status = remove_book(State(state.clone()), bearer(), Path(book.book_id.to_string()))
            .await.expect("should remove book");
        assert_eq!(StatusCode::NO_CONTENT, status);
        let (status, Json(err)) = remove_book(State(state), bearer(), Path(book.book_id.to_string()))
            .await.expect_err("should not remove twice");
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert_eq!("E-002", err.code);
    }

    #[tokio::test]
    async fn test_should_reject_missing_credentials() {
        let (status, Json(err)) = add_book(State(state()), HeaderMap::new(),
                                           Json(json!({"title": "Dune", "author": "Frank Herbert"})))
            .await.expect_err("should fail");
        assert_eq!(StatusCode::UNAUTHORIZED, status);
        assert_eq!("E-004", err.code);
    }

    #[tokio::test]
    async fn test_should_reject_bad_payload() {
        let (status, Json(err)) = add_book(State(state()), bearer(), Json(json!({"title": 1})))
            .await.expect_err("should fail");
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!("E-003", err.code);
    }

    #[tokio::test]
    async fn test_should_parse_query_params() {
        let params = BookQueryParams {
            offset: Some("5".to_string()),
            limit: Some("20".to_string()),
            ids: Some("a, b".to_string()),
            created_at: Some("2024-01-01".to_string()),
            order_by: Some("title,createdAt".to_string()),
            order_direction: Some("ASC,desc".to_string()),
            ..BookQueryParams::default()
        };
        let criteria = BookCriteria::try_from(params).expect("should parse");
        assert_eq!(5, criteria.offset);
        assert_eq!(20, criteria.limit);
        assert_eq!(Some(vec!["a".to_string(), "b".to_string()]), criteria.ids);
        assert_eq!(NaiveDate::from_ymd_opt(2024, 1, 1), criteria.created_at);
        assert_eq!(vec![OrderBy::Title, OrderBy::CreatedAt], criteria.order_by);
        assert_eq!(vec![OrderDirection::Asc, OrderDirection::Desc], criteria.order_direction);

        let bad = BookQueryParams { from: Some("01/01/2024".to_string()), ..BookQueryParams::default() };
        assert!(BookCriteria::try_from(bad).is_err());
        let bad = BookQueryParams { order_by: Some("rating".to_string()), ..BookQueryParams::default() };
        assert!(BookCriteria::try_from(bad).is_err());
    }

    #[tokio::test]
    async fn test_should_list_nothing_for_empty_id_filter() {
        let state = state();
        add_book(State(state.clone()), bearer(), Json(json!({"title": "Dune", "author": "Frank Herbert"})))
            .await.expect("should add book");

        let params = BookQueryParams { ids: Some("".to_string()), ..BookQueryParams::default() };
        assert_eq!(Some(Vec::<String>::new()), BookCriteria::try_from(params.clone()).expect("should parse").ids);
        let Json(books) = list_books(State(state.clone()), bearer(), Query(params))
            .await.expect("should list books");
        assert!(books.is_empty());

        let Json(books) = list_books(State(state), bearer(), Query(BookQueryParams::default()))
            .await.expect("should list books");
        assert_eq!(1, books.len());
    }

    #[tokio::test]
    async fn test_should_reject_mismatched_ordering() {
        let params = BookQueryParams {
            order_by: Some("title,author".to_string()),
            order_direction: Some("asc".to_string()),
            ..BookQueryParams::default()
        };
        let (status, Json(err)) = list_books(State(state()), bearer(), Query(params))
            .await.expect_err("should fail");
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!("E-003", err.code);
    }
}
