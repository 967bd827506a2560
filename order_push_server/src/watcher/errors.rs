use fcm_tools::FcmError;
use ghazaresan_tools::GhazaresanApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Invalid credentials. {0}")]
    InvalidCredentials(String),
    #[error("The credential check did not complete. {0}")]
    CheckAborted(String),
    #[error("Could not fetch orders. {0}")]
    FetchFailed(#[from] GhazaresanApiError),
    #[error("Could not deliver push notification. {0}")]
    NotifyFailed(#[from] FcmError),
}
