use async_trait::async_trait;
use fcm_tools::FcmError;
use ghazaresan_tools::{AuthResult, GhazaresanApiError, Order};
use mockall::mock;
use opn_common::Secret;

use crate::traits::{OrderSource, PushNotifier};

mock! {
    pub Upstream {}
    #[async_trait]
    impl OrderSource for Upstream {
        async fn authenticate(&self, username: &str, password: &str) -> AuthResult;
        async fn fetch_orders(&self, auth_token: &str) -> Result<Vec<Order>, GhazaresanApiError>;
    }
}

mock! {
    pub Pusher {}
    #[async_trait]
    impl PushNotifier for Pusher {
        async fn notify_new_orders(&self, push_token: &str, order_count: usize) -> Result<String, FcmError>;
    }
}

pub fn auth_ok(token: &str) -> AuthResult {
    AuthResult::success(Secret::new(token.to_string()))
}

pub fn orders_with_status(statuses: &[i64]) -> Vec<Order> {
    statuses.iter().map(|s| Order::with_status(*s)).collect()
}

/// An upstream that accepts any credentials and never gets called for orders.
pub fn accepting_upstream() -> MockUpstream {
    let mut upstream = MockUpstream::new();
    upstream.expect_authenticate().returning(|_, _| auth_ok("T1"));
    upstream.expect_fetch_orders().never();
    upstream
}

/// An upstream that rejects every login.
pub fn rejecting_upstream() -> MockUpstream {
    let mut upstream = MockUpstream::new();
    upstream.expect_authenticate().returning(|_, _| AuthResult::failure("Request failed with status code 401"));
    upstream.expect_fetch_orders().never();
    upstream
}

pub fn silent_pusher() -> MockPusher {
    let mut pusher = MockPusher::new();
    pusher.expect_notify_new_orders().never();
    pusher
}
