use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::{BookDto, BookUpdate};
use crate::catalog::command::get_book_cmd::{GetBookCommand, GetBookCommandRequest};
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::security::Authenticator;
use crate::gateway::assets::OwnershipService;

// UpdateBookCommand reuses the ownership gate of GetBookCommand before patching the catalog record.
// Ownership records carry no book content so the ownership service is not written to.
pub(crate) struct UpdateBookCommand {
    get_book: GetBookCommand,
    catalog_service: Arc<dyn CatalogService>,
}

impl UpdateBookCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>,
                      ownership_service: Arc<dyn OwnershipService>,
                      authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            get_book: GetBookCommand::new(catalog_service.clone(), ownership_service, authenticator),
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateBookCommandRequest {
    pub(crate) jwt: Option<String>,
    pub(crate) book_id: String,
    pub(crate) update: BookUpdate,
}

impl UpdateBookCommandRequest {
    pub fn new(jwt: Option<String>, book_id: &str, update: BookUpdate) -> Self {
        Self {
            jwt,
            book_id: book_id.to_string(),
            update,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateBookCommandResponse {
    pub(crate) book: BookDto,
}

impl UpdateBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<UpdateBookCommandRequest, UpdateBookCommandResponse> for UpdateBookCommand {
    async fn execute(&self, req: UpdateBookCommandRequest) -> Result<UpdateBookCommandResponse, CommandError> {
        let _ = self.get_book.execute(GetBookCommandRequest::new(req.jwt, req.book_id.as_str())).await?;
        self.catalog_service.update_book(req.book_id.as_str(), &req.update)
            .await.map_err(CommandError::from).map(UpdateBookCommandResponse::new)
    }
}
