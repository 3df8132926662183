use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use crate::catalog::domain::CatalogService;
use crate::catalog::saga::{DeleteEvent, DeleteState};
use crate::core::command::{Command, CommandError};
use crate::core::security::Authenticator;
use crate::gateway::assets::OwnershipService;

// RemoveBookCommand releases the caller's ownership record and then deletes the catalog record.
// If the catalog delete fails the book is left without an owner and the error is returned.
pub(crate) struct RemoveBookCommand {
    catalog_service: Arc<dyn CatalogService>,
    ownership_service: Arc<dyn OwnershipService>,
    authenticator: Arc<dyn Authenticator>,
}

impl RemoveBookCommand {
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
pub(crate) struct RemoveBookCommandRequest {
    pub(crate) jwt: Option<String>,
    pub(crate) book_id: String,
}

impl RemoveBookCommandRequest {
    pub fn new(jwt: Option<String>, book_id: &str) -> Self {
        Self {
            jwt,
            book_id: book_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RemoveBookCommandResponse {}

impl RemoveBookCommandResponse {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl Command<RemoveBookCommandRequest, RemoveBookCommandResponse> for RemoveBookCommand {
    async fn execute(&self, req: RemoveBookCommandRequest) -> Result<RemoveBookCommandResponse, CommandError> {
        let jwt = req.jwt.as_deref();
        let user = self.authenticator.digital_user(jwt)?;

        let state = DeleteState::Idle;
        let state = match self.ownership_service.delete_ownership_record(
            jwt.unwrap_or_default(), user.id.as_str(), req.book_id.as_str()).await {
            Ok(_) => state.advance(DeleteEvent::OwnershipReleased),
            Err(err) => {
                let state = state.advance(DeleteEvent::OwnershipReleaseFailed);
                warn!(book_id = req.book_id.as_str(), state = ?state, "ownership release failed: {}", err);
                return Err(CommandError::from(err));
            }
        };

        match self.catalog_service.remove_book(req.book_id.as_str()).await {
            Ok(_) => {
                let state = state.advance(DeleteEvent::RecordDeleted);
                info!(book_id = req.book_id.as_str(), state = ?state, "book removed");
                Ok(RemoveBookCommandResponse::new())
            }
            Err(err) => {
                let state = state.advance(DeleteEvent::RecordDeleteFailed);
                error!(book_id = req.book_id.as_str(), user = user.id.as_str(), state = ?state,
                    "ownership released but book could not be removed: {}", err);
                Err(CommandError::from(err))
            }
        }
    }
}
