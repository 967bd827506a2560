use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use fcm_tools::FcmError;
use ghazaresan_tools::GhazaresanApiError;
use thiserror::Error;

use crate::watcher::WatchError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Registration failed")]
    RegistrationFailed,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RegistrationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<WatchError> for ServerError {
    fn from(e: WatchError) -> Self {
        match e {
            WatchError::InvalidCredentials(_) => Self::InvalidCredentials,
            // Registration only ever produces the first two. Fetch and notify failures come from ticks.
            WatchError::CheckAborted(_) | WatchError::FetchFailed(_) | WatchError::NotifyFailed(_) => {
                Self::RegistrationFailed
            },
        }
    }
}

impl From<GhazaresanApiError> for ServerError {
    fn from(e: GhazaresanApiError) -> Self {
        Self::InitializeError(format!("Order API client: {e}"))
    }
}

impl From<FcmError> for ServerError {
    fn from(e: FcmError) -> Self {
        match e {
            FcmError::Configuration(s) => Self::ConfigurationError(s),
            e => Self::InitializeError(format!("Push client: {e}")),
        }
    }
}
