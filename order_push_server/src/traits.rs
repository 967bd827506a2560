//! The seams between the order poller and the outside world.
//!
//! The poller only ever talks to these traits. In production they are backed by [`ghazaresan_tools::GhazaresanApi`]
//! and [`fcm_tools::FcmClient`] (see [`crate::integrations`]); tests substitute mocks.
use async_trait::async_trait;
use fcm_tools::FcmError;
use ghazaresan_tools::{AuthResult, GhazaresanApiError, Order};

#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Log in with the user's credentials. Never fails outright; failures are reported in the [`AuthResult`].
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult;
    /// Fetch every order currently visible to the holder of `auth_token`.
    async fn fetch_orders(&self, auth_token: &str) -> Result<Vec<Order>, GhazaresanApiError>;
}

#[async_trait]
pub trait PushNotifier: Send + Sync {
    /// Tell the device behind `push_token` that `order_count` new orders are waiting. Returns the push service's
    /// message id.
    async fn notify_new_orders(&self, push_token: &str, order_count: usize) -> Result<String, FcmError>;
}
