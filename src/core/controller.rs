use std::sync::Arc;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogService;
use crate::catalog::factory::create_catalog_service;
use crate::core::command::CommandError;
use crate::core::domain::Configuration;
use crate::core::library::LibraryError;
use crate::core::security::{Authenticator, JwtAuthenticator};
use crate::gateway::assets::OwnershipService;
use crate::gateway::factory::create_ownership_service;

// AppState holds the collaborators shared by all requests, they are built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub(crate) catalog: Arc<dyn CatalogService>,
    pub(crate) ownership: Arc<dyn OwnershipService>,
    pub(crate) authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    pub async fn new(config: Configuration) -> AppState {
        let catalog = create_catalog_service(&config).await;
        let ownership = create_ownership_service(&config);
        let authenticator = Arc::new(JwtAuthenticator::new(config.jwt_secret.as_str()));
        AppState {
            catalog,
            ownership,
            authenticator,
        }
    }

    pub(crate) fn with(catalog: Arc<dyn CatalogService>,
                       ownership: Arc<dyn OwnershipService>,
                       authenticator: Arc<dyn Authenticator>) -> AppState {
        AppState {
            catalog,
            ownership,
            authenticator,
        }
    }
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDto {
    pub code: String,
    pub http_status_code: u16,
    pub reason: String,
    pub message: String,
}

impl From<&CommandError> for ExceptionDto {
    fn from(err: &CommandError) -> Self {
        Self {
            code: err.code().to_string(),
            http_status_code: err.http_status_code(),
            reason: err.reason().to_string(),
            message: err.message().to_string(),
        }
    }
}

pub type ServerError = (StatusCode, Json<ExceptionDto>);

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    ServerError::from(CommandError::parameter_validation(format!("{}", err).as_str(), None))
}

// raw Authorization header, forwarded as is to the ownership service
pub(crate) fn authorization(headers: &HeaderMap) -> Option<String> {
    headers.get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ExceptionDto::from(&err)))
    }
}

impl From<LibraryError> for ServerError {
    fn from(err: LibraryError) -> Self {
        ServerError::from(CommandError::from(err))
    }
}
