use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use opn_common::Secret;
use tokio::sync::RwLock;

/// A user whose orders are being watched. Keyed by push token in the [`UserRegistry`].
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub username: String,
    /// The upstream API has no refresh tokens, so the password is replayed on every tick.
    pub password: Secret<String>,
    /// Reserved for de-duplicating notifications. Nothing sets this yet.
    pub last_order_id: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl RegisteredUser {
    pub fn new<S: Into<String>>(username: S, password: Secret<String>) -> Self {
        Self { username: username.into(), password, last_order_id: None, registered_at: Utc::now() }
    }
}

/// In-memory map of push token to [`RegisteredUser`]. Cloning the registry gives another handle to the same map.
#[derive(Clone, Default)]
pub struct UserRegistry {
    users: Arc<RwLock<HashMap<String, RegisteredUser>>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry for `push_token`, returning the previous entry, if any.
    pub async fn insert(&self, push_token: &str, user: RegisteredUser) -> Option<RegisteredUser> {
        self.users.write().await.insert(push_token.to_string(), user)
    }

    pub async fn remove(&self, push_token: &str) -> Option<RegisteredUser> {
        self.users.write().await.remove(push_token)
    }

    pub async fn get(&self, push_token: &str) -> Option<RegisteredUser> {
        self.users.read().await.get(push_token).cloned()
    }

    pub async fn contains(&self, push_token: &str) -> bool {
        self.users.read().await.contains_key(push_token)
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}
