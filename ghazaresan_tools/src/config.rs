use std::{env, time::Duration};

use log::*;
use opn_common::Secret;

pub const DEFAULT_BASE_URL: &str = "https://app.ghazaresan.com/api/";
pub const DEFAULT_AUTH_PATH: &str = "Authorization/Authenticate";
pub const DEFAULT_ORDERS_PATH: &str = "Orders/GetOrders";
pub const DEFAULT_ORIGIN: &str = "https://portal.ghazaresan.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
// Shipped to every browser that loads the portal. It identifies the client application, not a user.
const PORTAL_SECURITY_KEY: &str = "Asdiw2737y#376";

#[derive(Debug, Clone)]
pub struct GhazaresanConfig {
    /// Base url of the API, e.g. "https://app.ghazaresan.com/api/"
    pub base_url: String,
    pub auth_path: String,
    pub orders_path: String,
    /// Sent as `Origin`, and with a trailing slash as `Referer`, on every request.
    pub origin: String,
    pub security_key: Secret<String>,
    /// Upper bound on a single request, including connecting and reading the body.
    pub timeout: Duration,
}

impl Default for GhazaresanConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            orders_path: DEFAULT_ORDERS_PATH.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            security_key: Secret::new(PORTAL_SECURITY_KEY.to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GhazaresanConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = Self::default();
        let base_url = env::var("OPN_GHAZARESAN_BASE_URL").unwrap_or_else(|_| {
            debug!("OPN_GHAZARESAN_BASE_URL not set, using {DEFAULT_BASE_URL}");
            defaults.base_url
        });
        let auth_path = env::var("OPN_GHAZARESAN_AUTH_PATH").unwrap_or(defaults.auth_path);
        let orders_path = env::var("OPN_GHAZARESAN_ORDERS_PATH").unwrap_or(defaults.orders_path);
        let origin = env::var("OPN_GHAZARESAN_ORIGIN").unwrap_or(defaults.origin);
        let security_key = env::var("OPN_GHAZARESAN_SECURITY_KEY").map(Secret::new).unwrap_or_else(|_| {
            debug!("OPN_GHAZARESAN_SECURITY_KEY not set, using the portal's published key");
            defaults.security_key
        });
        let timeout = env::var("OPN_UPSTREAM_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid configuration value for OPN_UPSTREAM_TIMEOUT ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        Self { base_url, auth_path, orders_path, origin, security_key, timeout }
    }

    /// A default configuration that sends all requests to `base_url` instead.
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    pub fn referer(&self) -> String {
        format!("{}/", self.origin.trim_end_matches('/'))
    }
}
