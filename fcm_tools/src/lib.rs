//! Firebase Cloud Messaging (HTTP v1) client.
//!
//! Messages are authorised with a short-lived OAuth2 access token, obtained by signing a JWT with a Google service
//! account key and exchanging it at the key's token endpoint. Access tokens are cached until shortly before they expire.
mod client;
mod config;
mod error;
mod models;

pub use client::FcmClient;
pub use config::FcmConfig;
pub use error::FcmError;
pub use models::{
    AndroidConfig,
    AndroidMessagePriority,
    AndroidNotification,
    Message,
    Notification,
    NotificationPriority,
    ServiceAccountKey,
    Visibility,
};
