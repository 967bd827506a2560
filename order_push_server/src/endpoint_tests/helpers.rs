use std::time::Duration;

use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use log::debug;
use serde_json::Value;

use crate::{
    routes::{health, RegisterRoute, UnregisterRoute},
    server::json_config,
    test_utils::mocks::{MockPusher, MockUpstream},
    traits::{OrderSource, PushNotifier},
    watcher::WatcherApi,
};

/// Long enough that no tick fires while a test is running.
pub const NO_TICKS: Duration = Duration::from_secs(3600);

pub type TestApi = WatcherApi<MockUpstream, MockPusher>;

pub fn watcher_api(upstream: MockUpstream, pusher: MockPusher) -> web::Data<TestApi> {
    web::Data::new(WatcherApi::new(upstream, pusher, NO_TICKS))
}

/// Sends `req` to an app with the public routes mounted, and returns the status and parsed JSON body.
pub async fn send<O, P>(api: &web::Data<WatcherApi<O, P>>, req: TestRequest) -> (StatusCode, Value)
where
    O: OrderSource + 'static,
    P: PushNotifier + 'static,
{
    let app = App::new()
        .app_data(json_config())
        .app_data(api.clone())
        .service(health)
        .service(RegisterRoute::<O, P>::new())
        .service(UnregisterRoute::<O, P>::new());
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let bytes = res.into_body().try_into_bytes().expect("Body should be complete");
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()));
    (status, body)
}

pub fn register_request(username: &str, password: &str, fcm_token: &str) -> TestRequest {
    TestRequest::post().uri("/register").set_json(serde_json::json!({
        "username": username,
        "password": password,
        "fcmToken": fcm_token,
    }))
}

pub fn unregister_request(fcm_token: &str) -> TestRequest {
    TestRequest::post().uri("/unregister").set_json(serde_json::json!({ "fcmToken": fcm_token }))
}
