//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use bookpath_api::{AppState, build_app};
use bookpath_auth::service::RegisterUser;
use bookpath_cache::memory::MemoryCacheProvider;
use bookpath_cache::provider::CacheManager;
use bookpath_core::config::cache::MemoryCacheConfig;
use bookpath_core::config::{
    AppConfig, AuthConfig, CacheConfig, DatabaseConfig, LoggingConfig, ServerConfig,
};
use bookpath_database::MemoryUserRepository;
use bookpath_entity::user::{SubscriptionTier, User, UserRole};

/// Password satisfying the default complexity policy.
pub const PASSWORD: &str = "Reading-List-42";

/// Test application backed by in-memory stores.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for seeding accounts directly
    pub state: AppState,
    /// Credential store, for outage simulation and inspection
    pub store: Arc<MemoryUserRepository>,
}

/// Parsed response
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `error` code of an error body.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://unused/bookpath_test".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
            operation_timeout_ms: 500,
        },
        cache: CacheConfig::default(),
        auth: AuthConfig {
            jwt_secret: "integration-test-secret-at-least-32-bytes".to_string(),
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
            ..AuthConfig::default()
        },
        logging: LoggingConfig::default(),
    }
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let config = test_config();
        config.validate().expect("test config must be valid");

        let store = Arc::new(MemoryUserRepository::new());
        let cache = Arc::new(CacheManager::from_provider(Arc::new(
            MemoryCacheProvider::new(&MemoryCacheConfig::default()),
        )));

        let state = AppState::new(config, store.clone(), cache).expect("Failed to build state");
        let router = build_app(state.clone());

        Self {
            router,
            state,
            store,
        }
    }

    /// Seed an account with the shared test password.
    pub async fn create_user(&self, email: &str, role: UserRole, tier: SubscriptionTier) -> User {
        let username = email.split('@').next().unwrap_or(email).to_string();
        self.state
            .auth
            .register(RegisterUser {
                email: email.to_string(),
                username,
                password: PASSWORD.to_string(),
                role,
                subscription_tier: tier,
            })
            .await
            .expect("Failed to create test user")
    }

    /// Log in through the API and return the access and refresh tokens.
    pub async fn login(&self, email: &str) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        let data = &response.body["data"];
        (
            data["access_token"].as_str().unwrap().to_string(),
            data["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = match body {
            Some(body) => req
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&body).expect("Failed to serialize body"),
                )),
            None => req.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
