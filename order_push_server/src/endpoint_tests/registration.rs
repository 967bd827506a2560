use actix_web::{
    http::{header::ContentType, StatusCode},
    test::TestRequest,
    web,
};
use async_trait::async_trait;
use ghazaresan_tools::{AuthResult, GhazaresanApiError, Order};
use serde_json::json;

use super::helpers::*;
use crate::{test_utils::mocks::*, traits::OrderSource, watcher::WatcherApi};

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let api = watcher_api(MockUpstream::new(), silent_pusher());
    for path in ["/", "/health"] {
        let (status, body) = send(&api, TestRequest::get().uri(path)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "running"}));
    }
}

#[actix_web::test]
async fn register_with_valid_credentials() {
    let _ = env_logger::try_init().ok();
    let mut upstream = MockUpstream::new();
    upstream
        .expect_authenticate()
        .withf(|username, password| username == "kababi" && password == "hunter2")
        .times(1)
        .returning(|_, _| auth_ok("T1"));
    upstream.expect_fetch_orders().never();
    let api = watcher_api(upstream, silent_pusher());

    let (status, body) = send(&api, register_request("kababi", "hunter2", "device-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Registration successful"}));
    assert!(api.is_watching("device-1").await);
    let user = api.get("device-1").await.expect("device-1 should be registered");
    assert_eq!(user.username, "kababi");
    assert_eq!(user.password.reveal(), "hunter2");
    api.shutdown().await;
}

#[actix_web::test]
async fn register_with_bad_credentials() {
    let _ = env_logger::try_init().ok();
    let api = watcher_api(rejecting_upstream(), silent_pusher());

    let (status, body) = send(&api, register_request("kababi", "wrong", "device-1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid credentials"}));
    assert!(api.get("device-1").await.is_none());
    assert!(!api.is_watching("device-1").await);
}

#[actix_web::test]
async fn register_twice_keeps_one_watcher() {
    let _ = env_logger::try_init().ok();
    let mut upstream = MockUpstream::new();
    upstream.expect_authenticate().times(2).returning(|_, _| auth_ok("T1"));
    upstream.expect_fetch_orders().never();
    let api = watcher_api(upstream, silent_pusher());

    let (status, _) = send(&api, register_request("kababi", "old", "device-1")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&api, register_request("kababi", "new", "device-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(api.watched_count().await, 1);
    assert_eq!(api.registry().len().await, 1);
    let user = api.get("device-1").await.expect("device-1 should be registered");
    assert_eq!(user.password.reveal(), "new");
    api.shutdown().await;
}

#[actix_web::test]
async fn register_rejects_unreadable_bodies() {
    let _ = env_logger::try_init().ok();
    let api = watcher_api(MockUpstream::new(), silent_pusher());

    let req = TestRequest::post().uri("/register").set_json(json!({"username": "kababi"}));
    let (status, body) = send(&api, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err = body["error"].as_str().unwrap_or_default();
    assert!(err.starts_with("Could not read request body"), "was: {body}");

    let (status, body) = send(&api, register_request("kababi", "hunter2", "  ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Could not read request body: fcmToken must not be empty"}));
    assert_eq!(api.registry().len().await, 0);
}

#[actix_web::test]
async fn unregister_stops_watching() {
    let _ = env_logger::try_init().ok();
    let api = watcher_api(accepting_upstream(), silent_pusher());

    let (status, _) = send(&api, register_request("kababi", "hunter2", "device-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(api.is_watching("device-1").await);

    let (status, body) = send(&api, unregister_request("device-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
    assert!(!api.is_watching("device-1").await);
    assert!(api.get("device-1").await.is_none());
}

#[actix_web::test]
async fn unregister_unknown_token() {
    let _ = env_logger::try_init().ok();
    let api = watcher_api(MockUpstream::new(), silent_pusher());

    let (status, body) = send(&api, unregister_request("never-registered")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let req = TestRequest::post().uri("/unregister").set_json(json!({}));
    let (status, body) = send(&api, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
}

#[actix_web::test]
async fn unregister_without_a_json_body() {
    let _ = env_logger::try_init().ok();
    let api = watcher_api(accepting_upstream(), silent_pusher());
    let (status, _) = send(&api, register_request("kababi", "hunter2", "device-1")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&api, TestRequest::post().uri("/unregister")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let req = TestRequest::post()
        .uri("/unregister")
        .insert_header(ContentType::plaintext())
        .set_payload(r#"{"fcmToken":"device-1"}"#);
    let (status, body) = send(&api, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let req = TestRequest::post().uri("/unregister").insert_header(ContentType::json()).set_payload("{not json");
    let (status, body) = send(&api, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    // None of these carried a readable token, so the registration stands
    assert!(api.is_watching("device-1").await);
    api.shutdown().await;
}

/// An upstream that blows up while checking credentials.
struct PanickingUpstream;

#[async_trait]
impl OrderSource for PanickingUpstream {
    async fn authenticate(&self, _username: &str, _password: &str) -> AuthResult {
        panic!("login response had an unexpected shape")
    }

    async fn fetch_orders(&self, _auth_token: &str) -> Result<Vec<Order>, GhazaresanApiError> {
        Ok(vec![])
    }
}

#[actix_web::test]
async fn register_reports_unexpected_failures() {
    let _ = env_logger::try_init().ok();
    let api = web::Data::new(WatcherApi::new(PanickingUpstream, silent_pusher(), NO_TICKS));

    let (status, body) = send(&api, register_request("kababi", "hunter2", "device-1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Registration failed"}));
    assert!(api.get("device-1").await.is_none());
}
