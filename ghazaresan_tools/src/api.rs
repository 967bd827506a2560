use std::sync::Arc;

use log::*;
use opn_common::Secret;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN, REFERER},
    Client,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::GhazaresanConfig,
    data_objects::{AuthResponse, Credentials, OrdersQuery},
    AuthResult,
    GhazaresanApiError,
    Order,
};

const SECURITY_KEY_HEADER: &str = "securitykey";
const AUTHORIZATION_CODE_HEADER: &str = "authorizationcode";

#[derive(Clone)]
pub struct GhazaresanApi {
    config: GhazaresanConfig,
    client: Arc<Client>,
}

impl GhazaresanApi {
    pub fn new(config: GhazaresanConfig) -> Result<Self, GhazaresanApiError> {
        let mut headers = HeaderMap::with_capacity(5);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(config.security_key.reveal().as_str())
            .map_err(|e| GhazaresanApiError::Initialization(format!("Invalid security key. {e}")))?;
        headers.insert(SECURITY_KEY_HEADER, key);
        let origin = HeaderValue::from_str(&config.origin)
            .map_err(|e| GhazaresanApiError::Initialization(format!("Invalid origin. {e}")))?;
        headers.insert(ORIGIN, origin);
        let referer = HeaderValue::from_str(&config.referer())
            .map_err(|e| GhazaresanApiError::Initialization(format!("Invalid referer. {e}")))?;
        headers.insert(REFERER, referer);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GhazaresanApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    async fn post_query<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        headers: HeaderMap,
        body: &B,
    ) -> Result<T, GhazaresanApiError> {
        let url = self.url(path);
        trace!("🍔️ Sending POST request to {url}");
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| GhazaresanApiError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("🍔️ Request successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GhazaresanApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GhazaresanApiError::RequestError(e.to_string()))?;
            Err(GhazaresanApiError::QueryError { status, message })
        }
    }

    /// Exchanges a username and password for an authorization code.
    ///
    /// A successful HTTP response that does not carry a `Token` is reported as [`GhazaresanApiError::MissingToken`].
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Secret<String>, GhazaresanApiError> {
        let credentials = Credentials { username, password };
        debug!("🍔️ Authenticating {username}");
        let response =
            self.post_query::<AuthResponse, _>(&self.config.auth_path, HeaderMap::new(), &credentials).await?;
        match response.token {
            Some(token) if !token.is_empty() => {
                debug!("🍔️ {username} authenticated");
                Ok(Secret::new(token))
            },
            _ => Err(GhazaresanApiError::MissingToken),
        }
    }

    /// Like [`authenticate`](Self::authenticate), but folds every failure into an unsuccessful [`AuthResult`].
    pub async fn login(&self, username: &str, password: &str) -> AuthResult {
        match self.authenticate(username, password).await {
            Ok(token) => AuthResult::success(token),
            Err(GhazaresanApiError::QueryError { status, message }) => {
                debug!("🍔️ Authentication for {username} was rejected with status {status}. Response: {message}");
                AuthResult::failure(format!("Request failed with status code {status}"))
            },
            Err(e) => {
                debug!("🍔️ Authentication for {username} failed. {e}");
                AuthResult::failure(e.to_string())
            },
        }
    }

    /// Fetches the restaurant's current order list using an authorization code from [`authenticate`].
    ///
    /// [`authenticate`]: Self::authenticate
    pub async fn fetch_orders(&self, authorization_code: &str) -> Result<Vec<Order>, GhazaresanApiError> {
        let security_key = self.config.security_key.reveal();
        let query = OrdersQuery { authorization_code, security_key };
        let mut headers = HeaderMap::with_capacity(1);
        let code = HeaderValue::from_str(authorization_code)
            .map_err(|e| GhazaresanApiError::RequestError(format!("Authorization code is not a valid header. {e}")))?;
        headers.insert(AUTHORIZATION_CODE_HEADER, code);
        let orders = self.post_query::<Vec<Order>, _>(&self.config.orders_path, headers, &query).await?;
        debug!("🍔️ Fetched {} orders", orders.len());
        Ok(orders)
    }
}
