use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::security::Authenticator;
use crate::gateway::assets::{AssetCriteria, OwnershipService};

// GetBookCommand only reads the catalog once the ownership service confirms the caller owns the
// book. A book without an ownership record is reported as missing.
pub(crate) struct GetBookCommand {
    catalog_service: Arc<dyn CatalogService>,
    ownership_service: Arc<dyn OwnershipService>,
    authenticator: Arc<dyn Authenticator>,
}

impl GetBookCommand {
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
pub(crate) struct GetBookCommandRequest {
    pub(crate) jwt: Option<String>,
    pub(crate) book_id: String,
}

impl GetBookCommandRequest {
    pub fn new(jwt: Option<String>, book_id: &str) -> Self {
        Self {
            jwt,
            book_id: book_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetBookCommandResponse {
    pub(crate) book: BookDto,
}

impl GetBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<GetBookCommandRequest, GetBookCommandResponse> for GetBookCommand {
    async fn execute(&self, req: GetBookCommandRequest) -> Result<GetBookCommandResponse, CommandError> {
        let jwt = req.jwt.as_deref();
        let user = self.authenticator.digital_user(jwt)?;
        let owned = self.ownership_service.list_ownership_records(
            jwt.unwrap_or_default(), user.id.as_str(), &AssetCriteria::book(req.book_id.as_str())).await?;
        if owned.is_empty() {
            debug!(book_id = req.book_id.as_str(), user = user.id.as_str(), "no ownership record");
            return Err(CommandError::not_found(format!("Book {} not found.", req.book_id).as_str()));
        }
        self.catalog_service.find_book_by_id(req.book_id.as_str())
            .await.map_err(CommandError::from).map(GetBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use crate::catalog::command::fixtures::Fixture;
    use crate::catalog::command::get_book_cmd::{GetBookCommand, GetBookCommandRequest};
    use crate::core::command::{Command, CommandError};

    fn get_cmd(fixture: &Fixture) -> GetBookCommand {
        GetBookCommand::new(fixture.catalog(), fixture.ownership(), fixture.authenticator.clone())
    }

    #[tokio::test]
    async fn test_should_run_get_book() {
        let fixture = Fixture::new();
        let book = fixture.owned_book("alice", "Dune").await;

        let loaded = get_cmd(&fixture).execute(GetBookCommandRequest::new(Fixture::jwt("alice"), book.book_id.as_str()))
            .await.expect("should get book");
        assert_eq!(book, loaded.book);
        assert_eq!(vec!["list"], fixture.ownership.calls());
        assert_eq!(vec!["find_book_by_id"], fixture.catalog.calls());
    }

    #[tokio::test]
    async fn test_should_not_read_catalog_for_books_of_other_users() {
        let fixture = Fixture::new();
        let book = fixture.owned_book("alice", "Dune").await;

        let res = get_cmd(&fixture).execute(GetBookCommandRequest::new(Fixture::jwt("bob"), book.book_id.as_str())).await;
        match res {
            Err(CommandError::NotFound { message }) => assert_eq!(format!("Book {} not found.", book.book_id), message),
            other => panic!("unexpected result {:?}", other.map(|r| r.book)),
        }
        assert!(fixture.catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn test_should_propagate_catalog_failure_for_owned_book() {
        let fixture = Fixture::new();
        let book = fixture.owned_book("alice", "Dune").await;
        fixture.catalog.fail_find.store(true, Ordering::SeqCst);

        let res = get_cmd(&fixture).execute(GetBookCommandRequest::new(Fixture::jwt("alice"), book.book_id.as_str())).await;
        assert!(matches!(res, Err(CommandError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_should_fail_without_credentials() {
        let fixture = Fixture::new();
        let res = get_cmd(&fixture).execute(GetBookCommandRequest::new(None, "any")).await;
        assert!(matches!(res, Err(CommandError::AuthenticationFailed { .. })));
        assert!(fixture.ownership.calls().is_empty());
    }

    #[tokio::test]
    async fn test_should_fail_when_ownership_lookup_fails() {
        let fixture = Fixture::new();
        let book = fixture.owned_book("alice", "Dune").await;
        fixture.ownership.fail_list.store(true, Ordering::SeqCst);

        let res = get_cmd(&fixture).execute(GetBookCommandRequest::new(Fixture::jwt("alice"), book.book_id.as_str())).await;
        assert!(matches!(res, Err(CommandError::Internal { retryable: true, .. })));
        assert!(fixture.catalog.calls().is_empty());
    }
}
