use async_trait::async_trait;
use ghazaresan_tools::{AuthResult, GhazaresanApi, GhazaresanApiError, Order};

use crate::traits::OrderSource;

#[async_trait]
impl OrderSource for GhazaresanApi {
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult {
        self.login(username, password).await
    }

    async fn fetch_orders(&self, auth_token: &str) -> Result<Vec<Order>, GhazaresanApiError> {
        GhazaresanApi::fetch_orders(self, auth_token).await
    }
}
