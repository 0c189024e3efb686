//! Integration tests for role and subscription-tier route guards.

mod helpers;

use http::StatusCode;
use uuid::Uuid;

use bookpath_database::CredentialStore;
use bookpath_entity::user::{SubscriptionTier, UserRole};
use helpers::TestApp;

#[tokio::test]
async fn test_pro_route_requires_token_first() {
    let app = TestApp::new().await;

    let response = app
        .request("GET", "/api/subscription/pro", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_free_tier_gets_payment_required() {
    let app = TestApp::new().await;
    app.create_user("free@bookpath.test", UserRole::User, SubscriptionTier::Free)
        .await;
    let (access, _) = app.login("free@bookpath.test").await;

    let response = app
        .request("GET", "/api/subscription/pro", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(response.error_code(), "SUBSCRIPTION_REQUIRED");
}

#[tokio::test]
async fn test_pro_tier_allowed() {
    let app = TestApp::new().await;
    app.create_user("pro@bookpath.test", UserRole::User, SubscriptionTier::Pro)
        .await;
    let (access, _) = app.login("pro@bookpath.test").await;

    let response = app
        .request("GET", "/api/subscription/pro", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["subscription_tier"], "pro");
}

#[tokio::test]
async fn test_tier_read_from_current_record() {
    let app = TestApp::new().await;
    let user = app
        .create_user("upgrade@bookpath.test", UserRole::User, SubscriptionTier::Free)
        .await;
    let (access, _) = app.login("upgrade@bookpath.test").await;

    let mut upgraded = app.store.find_by_id(user.id).await.unwrap().unwrap();
    upgraded.subscription_tier = SubscriptionTier::Pro;
    app.store.put(upgraded).await;

    let response = app
        .request("GET", "/api/subscription/pro", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_regular_user_cannot_revoke_sessions() {
    let app = TestApp::new().await;
    let target = app
        .create_user("target@bookpath.test", UserRole::User, SubscriptionTier::Free)
        .await;
    app.create_user("user@bookpath.test", UserRole::User, SubscriptionTier::Pro)
        .await;
    let (access, _) = app.login("user@bookpath.test").await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/revoke-sessions", target.id),
            None,
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn test_household_admin_revokes_sessions() {
    let app = TestApp::new().await;
    app.create_user("target@bookpath.test", UserRole::User, SubscriptionTier::Free)
        .await;
    app.create_user(
        "chefe@bookpath.test",
        UserRole::Chefaodacasa,
        SubscriptionTier::Free,
    )
    .await;
    let (target_access, _) = app.login("target@bookpath.test").await;
    let (admin_access, _) = app.login("chefe@bookpath.test").await;
    let target_id = app
        .request("GET", "/api/auth/me", None, Some(&target_access))
        .await
        .body["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{target_id}/revoke-sessions"),
            None,
            Some(&admin_access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["token_version"], 1);

    let me = app
        .request("GET", "/api/auth/me", None, Some(&target_access))
        .await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.error_code(), "TOKEN_STALE");

    // The administrator's own session is unaffected.
    let own = app
        .request("GET", "/api/auth/me", None, Some(&admin_access))
        .await;
    assert_eq!(own.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_sessions_unknown_user() {
    let app = TestApp::new().await;
    app.create_user(
        "chefe@bookpath.test",
        UserRole::Chefaodacasa,
        SubscriptionTier::Free,
    )
    .await;
    let (admin_access, _) = app.login("chefe@bookpath.test").await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/revoke-sessions", Uuid::now_v7()),
            None,
            Some(&admin_access),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
