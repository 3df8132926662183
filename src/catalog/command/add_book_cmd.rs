use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use crate::books::dto::{BookCreate, BookDto};
use crate::catalog::domain::CatalogService;
use crate::catalog::saga::{CreateEvent, CreateState};
use crate::core::command::{Command, CommandError};
use crate::core::library::LibraryResult;
use crate::core::security::Authenticator;
use crate::gateway::assets::{AssetRequest, AssetResponse, OwnershipService};

// AddBookCommand writes the book to the catalog and then registers the caller as its owner.
// When registration fails the catalog record is deleted again and the registration error is
// returned to the caller.
pub(crate) struct AddBookCommand {
    catalog_service: Arc<dyn CatalogService>,
    ownership_service: Arc<dyn OwnershipService>,
    authenticator: Arc<dyn Authenticator>,
}

impl AddBookCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>,
               ownership_service: Arc<dyn OwnershipService>,
               authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            catalog_service,
            ownership_service,
            authenticator,
        }
    }

    async fn register_owner(&self, jwt: Option<&str>, book: &BookDto) -> LibraryResult<AssetResponse> {
        let user = self.authenticator.digital_user(jwt)?;
        self.ownership_service.create_ownership_record(
            jwt.unwrap_or_default(), user.id.as_str(), &AssetRequest::book(book.book_id.as_str())).await
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddBookCommandRequest {
    pub(crate) jwt: Option<String>,
    pub(crate) book: BookCreate,
}

impl AddBookCommandRequest {
    pub fn new(jwt: Option<String>, book: BookCreate) -> Self {
        Self {
            jwt,
            book,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddBookCommandResponse {
    pub(crate) book: BookDto,
}

impl AddBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        let state = CreateState::Idle;
        let book = match self.catalog_service.add_book(&req.book).await {
            Ok(book) => book,
            Err(err) => {
                let state = state.advance(CreateEvent::RecordRejected);
                warn!(title = req.book.title.as_str(), state = ?state, "book rejected by catalog: {}", err);
                return Err(CommandError::from(err));
            }
        };
        let state = state.advance(CreateEvent::RecordCreated(book.book_id.to_string()));

        match self.register_owner(req.jwt.as_deref(), &book).await {
            Ok(_) => {
                let state = state.advance(CreateEvent::OwnershipRegistered).advance(CreateEvent::Completed);
                info!(book_id = book.book_id.as_str(), state = ?state, "book added");
                Ok(AddBookCommandResponse::new(book))
            }
            Err(err) => {
                error!(book_id = book.book_id.as_str(), retryable = err.retryable(),
                    "ownership registration failed, removing book: {}", err);
                if let Err(cleanup) = self.catalog_service.remove_book(book.book_id.as_str()).await {
                    error!(book_id = book.book_id.as_str(),
                        "failed to remove book after ownership registration failure: {}", cleanup);
                }
                let state = state.advance(CreateEvent::RegistrationFailed).advance(CreateEvent::CompensationFinished);
                warn!(book_id = book.book_id.as_str(), state = ?state, "book creation rolled back");
                Err(CommandError::from(err))
            }
        }
    }
}
