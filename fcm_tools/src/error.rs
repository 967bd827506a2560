use thiserror::Error;

#[derive(Debug, Error)]
pub enum FcmError {
    #[error("Invalid FCM configuration. {0}")]
    Configuration(String),
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Failed to parse private key: {0}")]
    KeyParseError(String),
    #[error("Failed to encode JWT: {0}")]
    JwtEncodeError(String),
    #[error("Access token request failed. Error {status}. {message}")]
    TokenRequestFailed { status: u16, message: String },
    #[error("Failed to parse token response: {0}")]
    TokenParseError(String),
    #[error("FCM send request failed: {0}")]
    SendRequestError(String),
    #[error("Failed to parse FCM response: {0}")]
    ResponseParseError(String),
    #[error("The device token is no longer registered. {0}")]
    Unregistered(String),
    #[error("FCM API error {status}. {message}")]
    ApiError { status: u16, message: String },
}
