use thiserror::Error;

#[derive(Debug, Error)]
pub enum GhazaresanApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Request could not be completed: {0}")]
    RequestError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Invalid token response")]
    MissingToken,
}
