use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::books::criteria::BookCriteria;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::security::Authenticator;
use crate::gateway::assets::{AssetCriteria, OwnershipService};

// ListBooksCommand narrows a catalog listing to the ids the ownership service reports for the caller.
pub(crate) struct ListBooksCommand {
    catalog_service: Arc<dyn CatalogService>,
    ownership_service: Arc<dyn OwnershipService>,
    authenticator: Arc<dyn Authenticator>,
}

impl ListBooksCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>,
                      ownership_service: Arc<dyn OwnershipService>,
                      authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            catalog_service,
            ownership_service,
            authenticator,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListBooksCommandRequest {
    pub(crate) jwt: Option<String>,
    pub(crate) criteria: BookCriteria,
}

impl ListBooksCommandRequest {
    pub fn new(jwt: Option<String>, criteria: BookCriteria) -> Self {
        Self {
            jwt,
            criteria,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListBooksCommandResponse {
    pub(crate) books: Vec<BookDto>,
}

impl ListBooksCommandResponse {
    pub fn new(books: Vec<BookDto>) -> Self {
        Self {
            books,
        }
    }
}

// Replaces the id filter with the owned ids. With no id filter from the caller and nothing owned,
// the listing stays unfiltered by id.
fn reconcile(mut criteria: BookCriteria, owned_ids: Vec<String>) -> BookCriteria {
    if criteria.ids.is_none() && owned_ids.is_empty() {
        warn!("no owned books and no id filter, listing without id filter");
        return criteria;
    }
    criteria.ids = Some(owned_ids);
    criteria
}

#[async_trait]
impl Command<ListBooksCommandRequest, ListBooksCommandResponse> for ListBooksCommand {
    async fn execute(&self, req: ListBooksCommandRequest) -> Result<ListBooksCommandResponse, CommandError> {
        let mut criteria = req.criteria;
        criteria.validate()?;

        let jwt = req.jwt.as_deref();
        let user = self.authenticator.digital_user(jwt)?;
        let owned = self.ownership_service.list_ownership_records(
            jwt.unwrap_or_default(), user.id.as_str(), &AssetCriteria::from(&criteria)).await?;
        let owned_ids: Vec<String> = owned.into_iter().map(|asset| asset.external_id).collect();
        debug!(user = user.id.as_str(), owned = owned_ids.len(), "listing books");

        let criteria = reconcile(criteria, owned_ids);
        self.catalog_service.list_books(&criteria)
            .await.map_err(CommandError::from).map(ListBooksCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crate::books::criteria::BookCriteria;
    use crate::books::dto::BookCreate;
    use crate::catalog::command::fixtures::Fixture;
    use crate::catalog::command::list_books_cmd::{reconcile, ListBooksCommand, ListBooksCommandRequest};
    use crate::catalog::domain::CatalogService;
    use crate::core::command::{Command, CommandError};
    use crate::core::library::{OrderBy, OrderDirection};

    fn list_cmd(fixture: &Fixture) -> ListBooksCommand {
        ListBooksCommand::new(fixture.catalog(), fixture.ownership(), fixture.authenticator.clone())
    }

    fn titles(res: &[crate::books::dto::BookDto]) -> Vec<&str> {
        res.iter().map(|b| b.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_should_list_only_owned_books() {
        let fixture = Fixture::new();
        for title in ["b", "c", "a"] {
            fixture.owned_book("alice", title).await;
        }
        fixture.owned_book("bob", "d").await;

        let criteria = BookCriteria::default().order(OrderBy::Title, OrderDirection::Asc);
        let res = list_cmd(&fixture).execute(ListBooksCommandRequest::new(Fixture::jwt("alice"), criteria))
            .await.expect("should list books");
        assert_eq!(vec!["a", "b", "c"], titles(&res.books));
    }

    #[tokio::test]
    async fn test_should_narrow_caller_ids_to_owned_ids() {
        let fixture = Fixture::new();
        let mine = fixture.owned_book("alice", "mine").await;
        let theirs = fixture.owned_book("bob", "theirs").await;

        let criteria = BookCriteria::default().with_ids(vec![mine.book_id.to_string(), theirs.book_id.to_string()]);
        let res = list_cmd(&fixture).execute(ListBooksCommandRequest::new(Fixture::jwt("alice"), criteria))
            .await.expect("should list books");
        assert_eq!(vec!["mine"], titles(&res.books));
    }

    #[tokio::test]
    async fn test_should_return_nothing_when_caller_ids_are_not_owned() {
        let fixture = Fixture::new();
        let theirs = fixture.owned_book("bob", "theirs").await;

        let criteria = BookCriteria::default().with_ids(vec![theirs.book_id.to_string()]);
        let res = list_cmd(&fixture).execute(ListBooksCommandRequest::new(Fixture::jwt("alice"), criteria))
            .await.expect("should list books");
        assert!(res.books.is_empty());
    }

    #[tokio::test]
    async fn test_should_list_without_id_filter_when_nothing_is_owned() {
        let fixture = Fixture::new();
        fixture.owned_book("bob", "theirs").await;

        let res = list_cmd(&fixture).execute(ListBooksCommandRequest::new(Fixture::jwt("alice"), BookCriteria::default()))
            .await.expect("should list books");
        assert_eq!(vec!["theirs"], titles(&res.books));
    }

    #[tokio::test]
    async fn test_should_drop_date_range_when_exact_date_is_given() {
        let fixture = Fixture::new();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let criteria = BookCriteria {
            created_at: Some(day),
            from: Some(day),
            to: NaiveDate::from_ymd_opt(2024, 1, 5),
            ..BookCriteria::default()
        };
        let _ = list_cmd(&fixture).execute(ListBooksCommandRequest::new(Fixture::jwt("alice"), criteria))
            .await.expect("should list books");

        let sent = fixture.ownership.last_criteria().expect("should query ownership");
        assert_eq!(Some(day), sent.created_at);
        assert_eq!(None, sent.from);
        assert_eq!(None, sent.to);
    }

    #[tokio::test]
    async fn test_should_reject_mismatched_ordering_before_any_call() {
        let fixture = Fixture::new();
        let mut criteria = BookCriteria::default().order(OrderBy::Title, OrderDirection::Asc);
        criteria.order_by.push(OrderBy::Author);

        let res = list_cmd(&fixture).execute(ListBooksCommandRequest::new(Fixture::jwt("alice"), criteria)).await;
        assert!(matches!(res, Err(CommandError::ParameterValidation { .. })));
        assert!(fixture.ownership.calls().is_empty());
        assert!(fixture.catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn test_should_reject_inverted_date_range() {
        let fixture = Fixture::new();
        let criteria = BookCriteria {
            from: NaiveDate::from_ymd_opt(2024, 1, 5),
            to: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..BookCriteria::default()
        };
        let res = list_cmd(&fixture).execute(ListBooksCommandRequest::new(Fixture::jwt("alice"), criteria)).await;
        match res {
            Err(CommandError::ParameterValidation { message, .. }) => {
                assert_eq!("Invalid dates input: 'to' must be 'later' than from", message)
            }
            other => panic!("unexpected result {:?}", other.map(|r| r.books)),
        }
    }

    #[tokio::test]
    async fn test_should_respect_limit() {
        let fixture = Fixture::new();
        for i in 0..5 {
            fixture.owned_book("alice", format!("book {}", i).as_str()).await;
        }
        let criteria = BookCriteria { offset: 1, limit: 2, ..BookCriteria::default() }
            .order(OrderBy::Title, OrderDirection::Desc);
        let res = list_cmd(&fixture).execute(ListBooksCommandRequest::new(Fixture::jwt("alice"), criteria))
            .await.expect("should list books");
        assert_eq!(vec!["book 3", "book 2"], titles(&res.books));
    }

    #[tokio::test]
    async fn test_should_reconcile_ids() {
        let none = reconcile(BookCriteria::default(), vec![]);
        assert_eq!(None, none.ids);
        let empty = reconcile(BookCriteria::default().with_ids(vec!["x".to_string()]), vec![]);
        assert_eq!(Some(Vec::<String>::new()), empty.ids);
        let owned = reconcile(BookCriteria::default(), vec!["a".to_string()]);
        assert_eq!(Some(vec!["a".to_string()]), owned.ids);
    }

    #[tokio::test]
    async fn test_should_not_list_books_added_without_owner() {
        let fixture = Fixture::new();
        fixture.owned_book("alice", "mine").await;
        fixture.catalog.add_book(&BookCreate::new("stray", "author")).await.expect("should add book");

        let res = list_cmd(&fixture).execute(ListBooksCommandRequest::new(Fixture::jwt("alice"), BookCriteria::default()))
            .await.expect("should list books");
        assert_eq!(vec!["mine"], titles(&res.books));
    }
}
