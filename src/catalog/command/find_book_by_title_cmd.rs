use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::security::Authenticator;
use crate::gateway::assets::{AssetCriteria, OwnershipService};

// Title lookup goes to the catalog first because only the catalog knows titles. The book is
// returned only when the caller owns it, otherwise it is reported as missing by title.
pub(crate) struct FindBookByTitleCommand {
    catalog_service: Arc<dyn CatalogService>,
    ownership_service: Arc<dyn OwnershipService>,
    authenticator: Arc<dyn Authenticator>,
}

impl FindBookByTitleCommand {
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
pub(crate) struct FindBookByTitleCommandRequest {
    pub(crate) jwt: Option<String>,
    pub(crate) title: String,
}

impl FindBookByTitleCommandRequest {
    pub fn new(jwt: Option<String>, title: &str) -> Self {
        Self {
            jwt,
            title: title.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FindBookByTitleCommandResponse {
    pub(crate) book: BookDto,
}

impl FindBookByTitleCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<FindBookByTitleCommandRequest, FindBookByTitleCommandResponse> for FindBookByTitleCommand {
    async fn execute(&self, req: FindBookByTitleCommandRequest) -> Result<FindBookByTitleCommandResponse, CommandError> {
        let jwt = req.jwt.as_deref();
        let user = self.authenticator.digital_user(jwt)?;
        let book = self.catalog_service.find_book_by_title(req.title.as_str()).await?;
        let owned = self.ownership_service.list_ownership_records(
            jwt.unwrap_or_default(), user.id.as_str(), &AssetCriteria::book(book.book_id.as_str())).await?;
        if owned.is_empty() {
            return Err(CommandError::not_found(format!("Book {} not found.", req.title).as_str()));
        }
        Ok(FindBookByTitleCommandResponse::new(book))
    }
}
