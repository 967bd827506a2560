use opn_common::Secret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `Status` value of an order that nobody at the restaurant has acted on yet.
pub const NEW_ORDER_STATUS: i64 = 0;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrdersQuery<'a> {
    pub authorization_code: &'a str,
    pub security_key: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(rename = "Token", default)]
    pub token: Option<String>,
}

/// The outcome of a login attempt. Login failures are values, not errors: a bad password, a malformed response and
/// an unreachable server all end up here with `success == false` and a human-readable `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthResult {
    pub success: bool,
    pub token: Option<Secret<String>>,
    pub message: Option<String>,
}

impl AuthResult {
    pub fn success(token: Secret<String>) -> Self {
        Self { success: true, token: Some(token), message: None }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self { success: false, token: None, message: Some(message.into()) }
    }

    /// The authorization code, if the login succeeded.
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().filter(|_| self.success).map(|t| t.reveal().as_str())
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("No message")
    }
}

/// An order record as returned by the orders endpoint.
///
/// Only `Status` is interpreted. Everything else is carried along untouched in `details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "Status", default)]
    pub status: Value,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Order {
    pub fn with_status(status: i64) -> Self {
        Self { status: Value::from(status), details: Map::new() }
    }

    /// The numeric status, if the record has one. Integral floats (`0.0`) are accepted.
    pub fn status_code(&self) -> Option<i64> {
        match &self.status {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            _ => None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.status_code() == Some(NEW_ORDER_STATUS)
    }
}

pub fn count_new_orders(orders: &[Order]) -> usize {
    orders.iter().filter(|o| o.is_new()).count()
}
