use std::{env, time::Duration};

use crate::{FcmError, ServiceAccountKey};

pub const DEFAULT_FCM_BASE_URL: &str = "https://fcm.googleapis.com";
pub const DEFAULT_FCM_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub project_id: String,
    pub credentials: ServiceAccountKey,
    pub base_url: String,
    pub timeout: Duration,
}

impl FcmConfig {
    pub fn new(project_id: String, credentials: ServiceAccountKey) -> Self {
        Self { project_id, credentials, base_url: DEFAULT_FCM_BASE_URL.to_string(), timeout: DEFAULT_FCM_TIMEOUT }
    }

    /// Builds a configuration from the contents of a service account key file.
    pub fn from_credentials_json(project_id: &str, json: &str) -> Result<Self, FcmError> {
        if project_id.trim().is_empty() {
            return Err(FcmError::Configuration("The Firebase project id is empty".to_string()));
        }
        let credentials = serde_json::from_str::<ServiceAccountKey>(json)
            .map_err(|e| FcmError::Configuration(format!("Invalid service account JSON. {e}")))?;
        Ok(Self::new(project_id.trim().to_string(), credentials))
    }

    /// Reads `OPN_FIREBASE_CREDENTIALS` (the service account key JSON) and `OPN_FIREBASE_PROJECT_ID`. Both are
    /// required.
    pub fn try_from_env() -> Result<Self, FcmError> {
        let json = env::var("OPN_FIREBASE_CREDENTIALS")
            .map_err(|e| FcmError::Configuration(format!("{e} [OPN_FIREBASE_CREDENTIALS]")))?;
        let project_id = env::var("OPN_FIREBASE_PROJECT_ID")
            .map_err(|e| FcmError::Configuration(format!("{e} [OPN_FIREBASE_PROJECT_ID]")))?;
        let mut config = Self::from_credentials_json(&project_id, &json)?;
        if let Ok(url) = env::var("OPN_FCM_BASE_URL") {
            config.base_url = url;
        }
        Ok(config)
    }

    pub fn send_url(&self) -> String {
        format!("{}/v1/projects/{}/messages:send", self.base_url.trim_end_matches('/'), self.project_id)
    }
}
