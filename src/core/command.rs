use async_trait::async_trait;
use crate::core::library::LibraryError;

/// Caller-facing error classification returned by every catalog command.
#[derive(Debug)]
pub enum CommandError {
    AlreadyExists {
        message: String,
    },
    NotFound {
        message: String,
    },
    ParameterValidation {
        message: String,
        reason_code: Option<String>,
    },
    AuthenticationFailed {
        message: String,
    },
    AuthorizationFailed {
        message: String,
        reason_code: Option<String>,
    },
    Internal {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
}

impl CommandError {
    pub fn already_exists(message: &str) -> CommandError {
        CommandError::AlreadyExists { message: message.to_string() }
    }

    pub fn not_found(message: &str) -> CommandError {
        CommandError::NotFound { message: message.to_string() }
    }

    pub fn parameter_validation(message: &str, reason_code: Option<String>) -> CommandError {
        CommandError::ParameterValidation { message: message.to_string(), reason_code }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CommandError::AlreadyExists { .. } => "E-001",
            CommandError::NotFound { .. } => "E-002",
            CommandError::ParameterValidation { .. } => "E-003",
            CommandError::AuthenticationFailed { .. } => "E-004",
            CommandError::AuthorizationFailed { .. } => "E-005",
            CommandError::Internal { .. } => "E-006",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            CommandError::AlreadyExists { .. } => 409,
            CommandError::NotFound { .. } => 404,
            CommandError::ParameterValidation { .. } => 400,
            CommandError::AuthenticationFailed { .. } => 401,
            CommandError::AuthorizationFailed { .. } => 403,
            CommandError::Internal { .. } => 500,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            CommandError::AlreadyExists { .. } => "Resource already exists.",
            CommandError::NotFound { .. } => "Resource not found.",
            CommandError::ParameterValidation { .. } => "Parameter validation error.",
            CommandError::AuthenticationFailed { .. } => "Client not authenticated.",
            CommandError::AuthorizationFailed { .. } => "Client not authorized.",
            CommandError::Internal { .. } => "Internal server error.",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CommandError::AlreadyExists { message } => message,
            CommandError::NotFound { message } => message,
            CommandError::ParameterValidation { message, .. } => message,
            CommandError::AuthenticationFailed { message } => message,
            CommandError::AuthorizationFailed { message, .. } => message,
            CommandError::Internal { message, .. } => message,
        }
    }
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        match other {
            LibraryError::Database { message, reason_code, retryable } => {
                CommandError::Internal { message, reason_code, retryable }
            }
            LibraryError::AccessDenied { message, reason_code } => {
                CommandError::AuthorizationFailed { message, reason_code }
            }
            LibraryError::NotAuthenticated { message } => {
                CommandError::AuthenticationFailed { message }
            }
            LibraryError::DuplicateKey { message } => {
                CommandError::AlreadyExists { message }
            }
            LibraryError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                CommandError::Internal { message, reason_code, retryable }
            }
            LibraryError::Validation { message, reason_code } => {
                CommandError::ParameterValidation { message, reason_code }
            }
            LibraryError::Serialization { message } => {
                CommandError::Internal { message, reason_code: None, retryable: false }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Internal { message, reason_code, retryable: false }
            }
        }
    }
}
