//! Integration tests for the lookup proxy API.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use lookup_proxy::{
    api::{create_router, ApiKey, AppState, RateLimitState, RouterConfig},
    PendingLogins,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use telegram_client::{
    ImportedUser, MockConnector, MockTelegramApi, SignInOutcome, TelegramApi, TelegramError,
    UserRecord,
};
use tower::ServiceExt;

const API_KEY: &str = "test-key";
const PHONE: &str = "+15555550100";

fn create_test_app(connector: MockConnector) -> (Router, PendingLogins) {
    create_test_app_with(connector, RateLimitState::permissive())
}

fn create_test_app_with(
    connector: MockConnector,
    rate_limit: RateLimitState,
) -> (Router, PendingLogins) {
    let pending = PendingLogins::new(Duration::from_secs(60));
    let state = AppState::new(Arc::new(connector), pending.clone());
    let config = RouterConfig::new(
        ApiKey::new(&SecretString::new(API_KEY.into())),
        rate_limit,
    );
    (create_router(state, config), pending)
}

/// A connector handing out one client per connect, built by `setup`.
fn connector_with<F>(times: usize, setup: F) -> MockConnector
where
    F: Fn(&mut MockTelegramApi) + Send + 'static,
{
    let mut connector = MockConnector::new();
    connector.expect_connect().times(times).returning(move |_| {
        let mut api = MockTelegramApi::new();
        setup(&mut api);
        Ok(Box::new(api) as Box<dyn TelegramApi>)
    });
    connector
}

fn post(uri: &str, key: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn account_body() -> Value {
    json!({ "app_id": 12345, "api_hash": "abcdef", "phone_number": PHONE })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app(MockConnector::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["pending_logins"], 0);
}

#[tokio::test]
async fn test_missing_api_key_makes_no_vendor_calls() {
    let mut connector = MockConnector::new();
    connector.expect_connect().never();
    let (app, _) = create_test_app(connector);

    for uri in [
        "/v1/api/auth/send-code",
        "/v1/api/auth/login",
        "/v1/api/accounts",
    ] {
        let (status, json) = send(&app, post(uri, None, account_body())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            json,
            json!({ "data": {}, "message": "api key is invalid", "code": 401 })
        );
    }
}

#[tokio::test]
async fn test_wrong_api_key() {
    let mut connector = MockConnector::new();
    connector.expect_connect().never();
    let (app, _) = create_test_app(connector);

    let (status, json) = send(
        &app,
        post("/v1/api/auth/send-code", Some("nope"), account_body()),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], 401);
}

#[tokio::test]
async fn test_send_code_sends_and_parks() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(false));
        api.expect_request_login_code().times(1).returning(|_| Ok(()));
        api.expect_disconnect().never();
    });
    let (app, pending) = create_test_app(connector);

    let (status, json) = send(
        &app,
        post("/v1/api/auth/send-code", Some(API_KEY), account_body()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["code"], 201);
    assert_eq!(json["message"], "login code sent");
    assert_eq!(json["data"], json!({}));
    assert_eq!(pending.len().await, 1);
}

#[tokio::test]
async fn test_send_code_already_authorized() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(true));
        api.expect_request_login_code().never();
        api.expect_disconnect().times(1).returning(|| Ok(()));
    });
    let (app, pending) = create_test_app(connector);

    let (status, json) = send(
        &app,
        post("/v1/api/auth/send-code", Some(API_KEY), account_body()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 200);
    assert!(pending.is_empty().await);
}

#[tokio::test]
async fn test_send_code_failure() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(false));
        api.expect_request_login_code()
            .returning(|_| Err(TelegramError::FloodWait { seconds: 30 }));
        api.expect_disconnect().times(1).returning(|| Ok(()));
    });
    let (app, pending) = create_test_app(connector);

    let (status, json) = send(
        &app,
        post("/v1/api/auth/send-code", Some(API_KEY), account_body()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], 500);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("send code request is failed"));
    assert!(pending.is_empty().await);
}

#[tokio::test]
async fn test_malformed_body() {
    let mut connector = MockConnector::new();
    connector.expect_connect().never();
    let (app, _) = create_test_app(connector);

    let (status, json) = send(
        &app,
        post(
            "/v1/api/auth/send-code",
            Some(API_KEY),
            json!({ "app_id": 12345, "api_hash": "abcdef" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["code"], 413);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("request body is malformed"));
}

#[tokio::test]
async fn test_send_code_then_login() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(false));
        api.expect_request_login_code().times(1).returning(|_| Ok(()));
        api.expect_sign_in()
            .withf(|code| code == "12345")
            .times(1)
            .returning(|_| Ok(SignInOutcome::Authorized));
        api.expect_disconnect().times(1).returning(|| Ok(()));
    });
    let (app, pending) = create_test_app(connector);

    let (status, _) = send(
        &app,
        post("/v1/api/auth/send-code", Some(API_KEY), account_body()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut body = account_body();
    body["code"] = json!("12345");
    let (status, json) = send(&app, post("/v1/api/auth/login", Some(API_KEY), body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "login is successful");
    assert!(pending.is_empty().await);
}

#[tokio::test]
async fn test_login_without_pending_code_sends_one() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(false));
        api.expect_request_login_code().times(1).returning(|_| Ok(()));
        api.expect_sign_in().never();
    });
    let (app, pending) = create_test_app(connector);

    let (status, json) = send(
        &app,
        post("/v1/api/auth/login", Some(API_KEY), account_body()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "login code sent");
    assert_eq!(pending.len().await, 1);
}

#[tokio::test]
async fn test_login_pending_without_code_is_malformed() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(false));
        api.expect_request_login_code().times(1).returning(|_| Ok(()));
        api.expect_sign_in().never();
    });
    let (app, pending) = create_test_app(connector);

    send(&app, post("/v1/api/auth/login", Some(API_KEY), account_body())).await;
    let (status, json) = send(
        &app,
        post("/v1/api/auth/login", Some(API_KEY), account_body()),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["code"], 413);
    // The session keeps waiting for its code
    assert_eq!(pending.len().await, 1);
}

#[tokio::test]
async fn test_login_password_required() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(false));
        api.expect_request_login_code().returning(|_| Ok(()));
        api.expect_sign_in()
            .returning(|_| Ok(SignInOutcome::PasswordRequired));
        api.expect_check_password().never();
        api.expect_disconnect().never();
    });
    let (app, pending) = create_test_app(connector);

    send(&app, post("/v1/api/auth/send-code", Some(API_KEY), account_body())).await;

    let mut body = account_body();
    body["code"] = json!("12345");
    let (status, json) = send(&app, post("/v1/api/auth/login", Some(API_KEY), body)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], 401);
    // Parked for a follow-up carrying the password
    assert_eq!(pending.len().await, 1);
}

#[tokio::test]
async fn test_login_password_in_follow_up_request() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(false));
        api.expect_request_login_code().times(1).returning(|_| Ok(()));
        api.expect_sign_in()
            .times(1)
            .returning(|_| Ok(SignInOutcome::PasswordRequired));
        api.expect_check_password()
            .withf(|password| password == "hunter2")
            .times(1)
            .returning(|_| Ok(()));
        api.expect_disconnect().times(1).returning(|| Ok(()));
    });
    let (app, pending) = create_test_app(connector);

    send(&app, post("/v1/api/auth/send-code", Some(API_KEY), account_body())).await;

    let mut body = account_body();
    body["code"] = json!("12345");
    let (status, _) = send(&app, post("/v1/api/auth/login", Some(API_KEY), body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // No new code is requested; only the password is sent
    let mut body = account_body();
    body["password"] = json!("hunter2");
    let (status, json) = send(&app, post("/v1/api/auth/login", Some(API_KEY), body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "login is successful");
    assert!(pending.is_empty().await);
}

#[tokio::test]
async fn test_path_like_phone_number_is_rejected() {
    let mut connector = MockConnector::new();
    connector.expect_connect().never();
    let (app, _) = create_test_app(connector);

    for uri in [
        "/v1/api/auth/send-code",
        "/v1/api/auth/login",
        "/v1/api/accounts",
    ] {
        let body = json!({
            "app_id": 12345,
            "api_hash": "abcdef",
            "phone_number": "/tmp/x",
            "phone_numbers": "+15555551234"
        });
        let (status, json) = send(&app, post(uri, Some(API_KEY), body)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["code"], 413);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("phone_number is invalid"));
    }
}

#[tokio::test]
async fn test_login_with_password() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(false));
        api.expect_request_login_code().returning(|_| Ok(()));
        api.expect_sign_in()
            .returning(|_| Ok(SignInOutcome::PasswordRequired));
        api.expect_check_password()
            .withf(|password| password == "hunter2")
            .times(1)
            .returning(|_| Ok(()));
        api.expect_disconnect().times(1).returning(|| Ok(()));
    });
    let (app, _) = create_test_app(connector);

    send(&app, post("/v1/api/auth/send-code", Some(API_KEY), account_body())).await;

    let mut body = account_body();
    body["code"] = json!("12345");
    body["password"] = json!("hunter2");
    let (status, json) = send(&app, post("/v1/api/auth/login", Some(API_KEY), body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "login is successful");
}

#[tokio::test]
async fn test_login_invalid_code_can_retry() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(false));
        api.expect_request_login_code().times(1).returning(|_| Ok(()));
        api.expect_sign_in()
            .returning(|_| Err(TelegramError::InvalidCode));
    });
    let (app, pending) = create_test_app(connector);

    send(&app, post("/v1/api/auth/send-code", Some(API_KEY), account_body())).await;

    let mut body = account_body();
    body["code"] = json!("00000");
    let (status, json) = send(&app, post("/v1/api/auth/login", Some(API_KEY), body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("login is failed"));
    assert_eq!(pending.len().await, 1);
}

#[tokio::test]
async fn test_accounts_unauthorized() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(false));
        api.expect_request_login_code().never();
        api.expect_disconnect().times(1).returning(|| Ok(()));
    });
    let (app, _) = create_test_app(connector);

    let mut body = account_body();
    body["phone_numbers"] = json!("+15555551234");
    let (status, json) = send(&app, post("/v1/api/accounts", Some(API_KEY), body)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        json,
        json!({
            "data": {},
            "message": "session is not authorized, login first",
            "code": 401
        })
    );
}

#[tokio::test]
async fn test_accounts_checks_each_distinct_number() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(true));
        api.expect_import_contact()
            .withf(|phone| phone == "+15555551234")
            .times(1)
            .returning(|_| {
                Ok(vec![ImportedUser {
                    id: 42,
                    access_hash: Some(7),
                }])
            });
        api.expect_import_contact()
            .withf(|phone| phone == "+15555550000")
            .times(1)
            .returning(|_| Ok(vec![]));
        api.expect_delete_contact()
            .times(1)
            .returning(|_| Ok(vec![UserRecord::with_id(42)]));
        api.expect_disconnect().times(1).returning(|| Ok(()));
    });
    let (app, _) = create_test_app(connector);

    let mut body = account_body();
    body["phone_numbers"] = json!("+15555551234, +1 5555551234,+15555550000");
    let (status, json) = send(&app, post("/v1/api/accounts", Some(API_KEY), body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 200);

    let data = json["data"].as_object().unwrap();
    let keys: Vec<&String> = data.keys().collect();
    assert_eq!(keys, ["+15555551234", "+15555550000"]);
    assert_eq!(data["+15555551234"]["status"], "registered");
    assert_eq!(data["+15555550000"]["status"], "not_registered");
}

#[tokio::test]
async fn test_accounts_empty_numbers() {
    let mut connector = MockConnector::new();
    connector.expect_connect().never();
    let (app, _) = create_test_app(connector);

    let mut body = account_body();
    body["phone_numbers"] = json!(" , ");
    let (status, json) = send(&app, post("/v1/api/accounts", Some(API_KEY), body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["code"], 413);
}

#[tokio::test]
async fn test_app_id_as_string() {
    let mut connector = MockConnector::new();
    connector
        .expect_connect()
        .withf(|credentials| credentials.api_id == 12345)
        .times(1)
        .returning(|_| {
            let mut api = MockTelegramApi::new();
            api.expect_is_authorized().returning(|| Ok(true));
            api.expect_disconnect().returning(|| Ok(()));
            Ok(Box::new(api) as Box<dyn TelegramApi>)
        });
    let (app, _) = create_test_app(connector);

    let (status, _) = send(
        &app,
        post(
            "/v1/api/auth/send-code",
            Some(API_KEY),
            json!({ "app_id": "12345", "api_hash": "abcdef", "phone_number": PHONE }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_default_credentials_fill_missing_fields() {
    let mut connector = MockConnector::new();
    connector
        .expect_connect()
        .withf(|credentials| credentials.api_id == 777 && credentials.phone_number == PHONE)
        .times(1)
        .returning(|_| {
            let mut api = MockTelegramApi::new();
            api.expect_is_authorized().returning(|| Ok(true));
            api.expect_disconnect().returning(|| Ok(()));
            Ok(Box::new(api) as Box<dyn TelegramApi>)
        });

    let pending = PendingLogins::new(Duration::from_secs(60));
    let state = AppState::new(Arc::new(connector), pending)
        .with_defaults(Some(777), Some(SecretString::new("default-hash".into())));
    let config = RouterConfig::new(
        ApiKey::new(&SecretString::new(API_KEY.into())),
        RateLimitState::permissive(),
    );
    let app = create_router(state, config);

    let (status, _) = send(
        &app,
        post(
            "/v1/api/auth/send-code",
            Some(API_KEY),
            json!({ "phone_number": PHONE }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let connector = connector_with(1, |api| {
        api.expect_is_authorized().returning(|| Ok(true));
        api.expect_disconnect().returning(|| Ok(()));
    });
    let (app, _) = create_test_app_with(connector, RateLimitState::new(1));

    let (status, _) = send(
        &app,
        post("/v1/api/auth/send-code", Some(API_KEY), account_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app,
        post("/v1/api/auth/send-code", Some(API_KEY), account_body()),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], 429);
}
