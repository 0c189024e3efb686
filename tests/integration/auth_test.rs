//! Integration tests for authentication and session flows.

mod helpers;

use http::StatusCode;
use serde_json::json;

use bookpath_entity::user::{SubscriptionTier, UserRole};
use helpers::{PASSWORD, TestApp};

const EMAIL: &str = "reader@bookpath.test";

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "email": EMAIL, "username": "reader", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["email"], EMAIL);
    assert_eq!(response.body["data"]["role"], "user");
    assert!(response.body["data"].get("password_hash").is_none());

    let (access, refresh) = app.login(EMAIL).await;
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());
}

#[tokio::test]
async fn test_register_weak_password_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "email": EMAIL, "username": "reader", "password": "short" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "POLICY_VIOLATION");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new().await;
    app.create_user(EMAIL, UserRole::User, SubscriptionTier::Free)
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "email": EMAIL, "username": "someone-else", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_invalid_body() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "email": "not-an-email", "username": "reader", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_look_alike() {
    let app = TestApp::new().await;
    app.create_user(EMAIL, UserRole::User, SubscriptionTier::Free)
        .await;

    let wrong = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": EMAIL, "password": "Not-The-Password-1" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "nobody@bookpath.test", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, unknown.body);
    assert_eq!(wrong.error_code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_fifth_failure_locks_with_retry_after() {
    let app = TestApp::new().await;
    app.create_user(EMAIL, UserRole::User, SubscriptionTier::Free)
        .await;
    let bad = json!({ "email": EMAIL, "password": "Not-The-Password-1" });

    for _ in 0..4 {
        let response = app
            .request("POST", "/api/auth/login", Some(bad.clone()), None)
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let fifth = app
        .request("POST", "/api/auth/login", Some(bad), None)
        .await;
    assert_eq!(fifth.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(fifth.error_code(), "ACCOUNT_LOCKED");
    assert!(fifth.body["unlock_at"].is_string());
    let retry: i64 = fifth.headers["retry-after"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=120).contains(&retry));

    // The correct password is refused while locked.
    let correct = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": EMAIL, "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(correct.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;
    app.create_user(EMAIL, UserRole::User, SubscriptionTier::Free)
        .await;

    let anonymous = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.error_code(), "UNAUTHENTICATED");

    let garbage = app
        .request("GET", "/api/auth/me", None, Some("not.a.jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let (access, _) = app.login(EMAIL).await;
    let me = app.request("GET", "/api/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["email"], EMAIL);
}

#[tokio::test]
async fn test_logout_revokes_access_and_refresh() {
    let app = TestApp::new().await;
    app.create_user(EMAIL, UserRole::User, SubscriptionTier::Free)
        .await;
    let (access, refresh) = app.login(EMAIL).await;
    let (other_access, _) = app.login(EMAIL).await;

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(json!({ "refresh_token": refresh })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let reused = app.request("GET", "/api/auth/me", None, Some(&access)).await;
    assert_eq!(reused.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reused.error_code(), "TOKEN_REVOKED");

    let refreshed = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);

    // Other sessions are untouched.
    let other = app
        .request("GET", "/api/auth/me", None, Some(&other_access))
        .await;
    assert_eq!(other.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_without_body() {
    let app = TestApp::new().await;
    app.create_user(EMAIL, UserRole::User, SubscriptionTier::Free)
        .await;
    let (access, refresh) = app.login(EMAIL).await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let refreshed = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_all_makes_tokens_stale() {
    let app = TestApp::new().await;
    app.create_user(EMAIL, UserRole::User, SubscriptionTier::Free)
        .await;
    let (first, _) = app.login(EMAIL).await;
    let (second, _) = app.login(EMAIL).await;

    let response = app
        .request("POST", "/api/auth/logout-all", None, Some(&first))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["token_version"], 1);

    for token in [&first, &second] {
        let me = app.request("GET", "/api/auth/me", None, Some(token)).await;
        assert_eq!(me.status, StatusCode::UNAUTHORIZED);
        assert_eq!(me.error_code(), "TOKEN_STALE");
    }
}

#[tokio::test]
async fn test_change_password_rotates_tokens() {
    let app = TestApp::new().await;
    app.create_user(EMAIL, UserRole::User, SubscriptionTier::Free)
        .await;
    let (old_access, _) = app.login(EMAIL).await;
    let new_password = "Another-Shelf-77";

    let response = app
        .request(
            "POST",
            "/api/auth/change-password",
            Some(json!({ "current_password": PASSWORD, "new_password": new_password })),
            Some(&old_access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let new_access = response.body["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let stale = app
        .request("GET", "/api/auth/me", None, Some(&old_access))
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);
    assert_eq!(stale.error_code(), "TOKEN_STALE");

    let fresh = app
        .request("GET", "/api/auth/me", None, Some(&new_access))
        .await;
    assert_eq!(fresh.status, StatusCode::OK);

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": EMAIL, "password": new_password })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_reuse_rejected() {
    let app = TestApp::new().await;
    app.create_user(EMAIL, UserRole::User, SubscriptionTier::Free)
        .await;
    let (access, _) = app.login(EMAIL).await;

    let response = app
        .request(
            "POST",
            "/api/auth/change-password",
            Some(json!({ "current_password": PASSWORD, "new_password": PASSWORD })),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "POLICY_VIOLATION");

    // A rejected change leaves the session valid.
    let me = app.request("GET", "/api/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rotates_pair() {
    let app = TestApp::new().await;
    app.create_user(EMAIL, UserRole::User, SubscriptionTier::Free)
        .await;
    let (access, refresh) = app.login(EMAIL).await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["access_token"].is_string());

    let replay = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.error_code(), "TOKEN_REVOKED");

    let as_refresh = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refresh_token": access })),
            None,
        )
        .await;
    assert_eq!(as_refresh.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_store_outage_fails_closed() {
    let app = TestApp::new().await;
    app.create_user(EMAIL, UserRole::User, SubscriptionTier::Free)
        .await;
    let (access, _) = app.login(EMAIL).await;

    app.store.set_unavailable(true);

    let me = app.request("GET", "/api/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(me.error_code(), "STORE_UNAVAILABLE");

    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health.body["data"]["database"], "unreachable");
}

#[tokio::test]
async fn test_health_ok() {
    let app = TestApp::new().await;
    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["data"]["status"], "ok");
}
