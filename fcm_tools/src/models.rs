use std::collections::BTreeMap;

use opn_common::Secret;
use serde::{Deserialize, Serialize};

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// The fields of a Google service account key file that are needed to mint access tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: Secret<String>,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Clone)]
pub(crate) struct TokenCache {
    pub access_token: Secret<String>,
    pub expires_at: i64,
}

/// Claims of the self-signed JWT that is exchanged for an access token.
#[derive(Debug, Serialize)]
pub(crate) struct JwtClaims {
    pub iss: String,
    pub sub: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendRequest<'a> {
    pub message: &'a Message,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendResponse {
    pub name: String,
}

//-------------------------------------------------  Message  ----------------------------------------------------------
/// A message addressed to a single device registration token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub token: String,
    pub notification: Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,
    /// FCM only accepts string values in the data payload.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl Message {
    pub fn new<T: Into<String>, S: Into<String>, B: Into<String>>(token: T, title: S, body: B) -> Self {
        Self {
            token: token.into(),
            notification: Notification { title: title.into(), body: body.into() },
            android: None,
            data: BTreeMap::new(),
        }
    }

    pub fn with_android(mut self, android: AndroidConfig) -> Self {
        self.android = Some(android);
        self
    }

    pub fn with_data<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.data.insert(key.into(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidConfig {
    pub priority: AndroidMessagePriority,
    /// Duration string in seconds, e.g. "60s"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<AndroidNotification>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AndroidMessagePriority {
    Normal,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AndroidNotification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_priority: Option<NotificationPriority>,
    pub default_sound: bool,
    pub default_vibrate_timings: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationPriority {
    PriorityMin,
    PriorityLow,
    PriorityDefault,
    PriorityHigh,
    PriorityMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Private,
    Public,
    Secret,
}
