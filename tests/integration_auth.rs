//! Authentication flow integration tests
//!
//! Tests the login surface over real HTTP:
//! - Registration and login round trips
//! - Rate limiting of failed logins
//! - Bearer authentication for protected routes

mod common;

use std::time::Duration;

use common::*;
use login_shield::auth::AuthConfig;
use login_shield::ledger::LedgerConfig;
use login_shield::models::LoginResponse;
use reqwest::StatusCode;

/// Test 1: Registration returns the created user
#[tokio::test]
async fn test_register() {
    let (addr, _shutdown) = run_test_server(create_test_state()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/api/v1/users", addr))
        .json(&register_body("user@example.com", "hunter2"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["email"], "user@example.com");
    assert!(body.get("password").is_none());
}

/// Test 2: Registering the same email twice conflicts
#[tokio::test]
async fn test_register_duplicate() {
    let (addr, _shutdown) = run_test_server(create_test_state()).await;
    let client = reqwest::Client::new();

    let url = format!("http://{}/api/v1/users", addr);
    let body = register_body("user@example.com", "hunter2");

    let first = client.post(&url).json(&body).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client.post(&url).json(&body).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

/// Test 3: Login round trip returns a bearer token
#[tokio::test]
async fn test_login_success() {
    let (addr, _shutdown) = run_test_server(create_test_state()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{}/api/v1/users", addr))
        .json(&register_body("user@example.com", "hunter2"))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("http://{}/api/v1/users/login", addr))
        .json(&login_body("user@example.com", "hunter2"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let login: LoginResponse = response.json().await.unwrap();
    assert_eq!(login.token_type, "bearer");
    assert!(!login.access_token.is_empty());
    assert_eq!(login.user.email, "user@example.com");
}

/// Test 4: Wrong password is unauthorized
#[tokio::test]
async fn test_login_wrong_password() {
    let (addr, _shutdown) = run_test_server(create_test_state()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{}/api/v1/users", addr))
        .json(&register_body("user@example.com", "hunter2"))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("http://{}/api/v1/users/login", addr))
        .json(&login_body("user@example.com", "swordfish"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

/// Test 5: Unknown users get the same unauthorized response
#[tokio::test]
async fn test_login_unknown_user() {
    let (addr, _shutdown) = run_test_server(create_test_state()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/api/v1/users/login", addr))
        .json(&login_body("ghost@example.com", "whatever"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test 6: The sixth failed login inside the window is rate limited
#[tokio::test]
async fn test_login_rate_limited() {
    let (addr, _shutdown) = run_test_server(create_test_state()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{}/api/v1/users", addr))
        .json(&register_body("user@example.com", "hunter2"))
        .send()
        .await
        .unwrap();

    let login_url = format!("http://{}/api/v1/users/login", addr);
    for _ in 0..5 {
        let response = client
            .post(&login_url)
            .json(&login_body("user@example.com", "swordfish"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = client
        .post(&login_url)
        .json(&login_body("user@example.com", "swordfish"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // The ledger counters are visible through the metrics endpoint
    let metrics: serde_json::Value = client
        .get(format!("http://{}/metrics", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(metrics["attempts_recorded_total"], 5);
    assert_eq!(metrics["rate_limited_total"], 1);
    assert_eq!(metrics["fail_open_total"], 0);
}

/// Test 7: A bearer token grants access to protected routes
#[tokio::test]
async fn test_authenticated_user_lookup() {
    let (addr, _shutdown) = run_test_server(create_test_state()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{}/api/v1/users", addr))
        .json(&register_body("user@example.com", "hunter2"))
        .send()
        .await
        .unwrap();

    let login: LoginResponse = client
        .post(format!("http://{}/api/v1/users/login", addr))
        .json(&login_body("user@example.com", "hunter2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let response = client
        .get(format!("http://{}/api/v1/users/{}", addr, login.user.id))
        .bearer_auth(&login.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["email"], "user@example.com");
}

/// Test 8: Protected routes reject requests without a token
#[tokio::test]
async fn test_protected_route_requires_token() {
    let (addr, _shutdown) = run_test_server(create_test_state()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{}/api/v1/users/1", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test 9: Protected routes reject garbage tokens
#[tokio::test]
async fn test_protected_route_rejects_garbage() {
    let (addr, _shutdown) = run_test_server(create_test_state()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{}/api/v1/users/1", addr))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test 10: An expired bearer token is rejected with a distinct message
#[tokio::test]
async fn test_expired_token_rejected() {
    let state = create_test_state_with(
        LedgerConfig::default(),
        AuthConfig {
            token_duration: Duration::from_millis(10),
        },
    );
    let (addr, _shutdown) = run_test_server(state).await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{}/api/v1/users", addr))
        .json(&register_body("user@example.com", "hunter2"))
        .send()
        .await
        .unwrap();

    let login: LoginResponse = client
        .post(format!("http://{}/api/v1/users/login", addr))
        .json(&login_body("user@example.com", "hunter2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Claims carry whole seconds, so wait out the full second
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let response = client
        .get(format!("http://{}/api/v1/users/{}", addr, login.user.id))
        .bearer_auth(&login.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Token has expired");
}

/// Test 11: Health endpoint is open and reports the version
#[tokio::test]
async fn test_health() {
    let (addr, _shutdown) = run_test_server(create_test_state()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "up and running");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
