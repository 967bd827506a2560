use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::*;
use opn_common::Secret;
use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;

use crate::{
    models::{GoogleTokenResponse, JwtClaims, SendRequest, SendResponse, TokenCache},
    FcmConfig,
    FcmError,
    Message,
};

const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Cached access tokens are refreshed this many seconds before they expire.
const TOKEN_EXPIRY_MARGIN: i64 = 60;

#[derive(Clone)]
pub struct FcmClient {
    config: FcmConfig,
    http_client: Client,
    token_cache: Arc<Mutex<Option<TokenCache>>>,
}

impl FcmClient {
    pub fn new(config: FcmConfig) -> Result<Self, FcmError> {
        let http_client =
            Client::builder().timeout(config.timeout).build().map_err(|e| FcmError::Initialization(e.to_string()))?;
        Ok(Self { config, http_client, token_cache: Arc::new(Mutex::new(None)) })
    }

    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }

    /// Delivers a single message and returns the message name assigned by FCM,
    /// e.g. `projects/orders-app/messages/0:1500415314455276%31bd1c96`.
    pub async fn send(&self, message: &Message) -> Result<String, FcmError> {
        let access_token = self.access_token().await?;
        let url = self.config.send_url();
        trace!("📲️ Sending FCM message to {url}");
        let response = self
            .http_client
            .post(url)
            .bearer_auth(access_token.reveal())
            .json(&SendRequest { message })
            .send()
            .await
            .map_err(|e| FcmError::SendRequestError(e.to_string()))?;
        match response.status() {
            status if status.is_success() => {
                let result =
                    response.json::<SendResponse>().await.map_err(|e| FcmError::ResponseParseError(e.to_string()))?;
                debug!("📲️ FCM accepted message {}", result.name);
                Ok(result.name)
            },
            StatusCode::NOT_FOUND => {
                let message = response.text().await.unwrap_or_default();
                Err(FcmError::Unregistered(message))
            },
            status => {
                let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                Err(FcmError::ApiError { status: status.as_u16(), message })
            },
        }
    }

    /// Returns a cached access token, or mints a new one if the cached token is missing or about to expire.
    pub async fn access_token(&self) -> Result<Secret<String>, FcmError> {
        // The cache lock is held across the token exchange, so concurrent senders wait for a single refresh.
        let mut cache = self.token_cache.lock().await;
        let now = Utc::now().timestamp();
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > now + TOKEN_EXPIRY_MARGIN {
                return Ok(cached.access_token.clone());
            }
        }
        debug!("📲️ Requesting a new FCM access token");
        let assertion = self.sign_assertion()?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
        let response = self
            .http_client
            .post(&self.config.credentials.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| FcmError::SendRequestError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(FcmError::TokenRequestFailed { status, message });
        }
        let token =
            response.json::<GoogleTokenResponse>().await.map_err(|e| FcmError::TokenParseError(e.to_string()))?;
        let access_token = Secret::new(token.access_token);
        *cache = Some(TokenCache { access_token: access_token.clone(), expires_at: now + token.expires_in });
        info!("📲️ New FCM access token acquired. It expires in {}s", token.expires_in);
        Ok(access_token)
    }

    fn sign_assertion(&self) -> Result<String, FcmError> {
        let credentials = &self.config.credentials;
        let now = Utc::now();
        let claims = JwtClaims {
            iss: credentials.client_email.clone(),
            sub: credentials.client_email.clone(),
            scope: MESSAGING_SCOPE.to_string(),
            aud: credentials.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let key = EncodingKey::from_rsa_pem(credentials.private_key.reveal().as_bytes())
            .map_err(|e| FcmError::KeyParseError(e.to_string()))?;
        let mut header = Header::new(Algorithm::RS256);
        header.kid = credentials.private_key_id.clone();
        encode(&header, &claims, &key).map_err(|e| FcmError::JwtEncodeError(e.to_string()))
    }
}
