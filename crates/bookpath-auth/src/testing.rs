//! Shared fixtures for unit tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use bookpath_cache::memory::MemoryCacheProvider;
use bookpath_cache::provider::CacheManager;
use bookpath_core::config::AuthConfig;
use bookpath_core::config::cache::MemoryCacheConfig;
use bookpath_core::error::AppError;
use bookpath_core::result::AppResult;
use bookpath_core::traits::CacheProvider;
use bookpath_database::{CredentialStore, MemoryUserRepository};
use bookpath_entity::user::{PasswordHistory, SubscriptionTier, User, UserRole};

use crate::attempts::LoginAttemptGovernor;
use crate::context::AuthContext;
use crate::jwt::{JwtDecoder, JwtEncoder, RevocationList, TokenType, TokenValidator};
use crate::service::{AuthService, RegisterUser};

/// Defaults with cheap Argon2 parameters and a fixed secret.
pub fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "unit-test-secret-that-is-long-enough".to_string(),
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        ..AuthConfig::default()
    }
}

pub fn sample_user() -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        email: "sample@bookpath.test".to_string(),
        username: "sample".to_string(),
        password_hash: "h0".to_string(),
        password_history: PasswordHistory::new(),
        failed_login_attempts: 0,
        account_locked_until: None,
        token_version: 0,
        role: UserRole::User,
        subscription_tier: SubscriptionTier::Free,
        two_factor_enabled: false,
        two_factor_secret: None,
        password_changed_at: None,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn memory_cache() -> Arc<CacheManager> {
    Arc::new(CacheManager::from_provider(Arc::new(
        MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 10_000 }),
    )))
}

/// An ephemeral store whose every call fails as unreachable.
#[derive(Debug)]
struct UnavailableCache;

#[async_trait]
impl CacheProvider for UnavailableCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::store_unavailable("test outage"))
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Err(AppError::store_unavailable("test outage"))
    }
    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(AppError::store_unavailable("test outage"))
    }
    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Err(AppError::store_unavailable("test outage"))
    }
    async fn incr_with_ttl(&self, _key: &str, _ttl: Duration) -> AppResult<i64> {
        Err(AppError::store_unavailable("test outage"))
    }
    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
    async fn flush_all(&self) -> AppResult<()> {
        Err(AppError::store_unavailable("test outage"))
    }
}

pub fn unavailable_cache() -> Arc<CacheManager> {
    Arc::new(CacheManager::from_provider(Arc::new(UnavailableCache)))
}

/// In-memory stores plus every component wired over them.
pub struct Harness {
    pub store: Arc<MemoryUserRepository>,
    pub cache: Arc<CacheManager>,
    pub governor: LoginAttemptGovernor,
    pub revocations: RevocationList,
    pub validator: TokenValidator,
    pub service: AuthService,
}

impl Harness {
    pub async fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryUserRepository::new());
        let cache = memory_cache();
        let dyn_store: Arc<dyn CredentialStore> = store.clone();

        let revocations = RevocationList::new(&config, cache.clone());
        Self {
            governor: LoginAttemptGovernor::new(&config, cache.clone(), dyn_store.clone()),
            validator: TokenValidator::new(
                JwtDecoder::new(&config),
                revocations.clone(),
                dyn_store.clone(),
            ),
            revocations,
            service: AuthService::new(&config, dyn_store, cache.clone()).unwrap(),
            store,
            cache,
        }
    }

    /// Registers a principal through the service.
    pub async fn create_user(&self, email: &str, password: &str) -> User {
        let username = email.split('@').next().unwrap().to_string();
        self.service
            .register(RegisterUser {
                email: email.to_string(),
                username,
                password: password.to_string(),
                role: UserRole::User,
                subscription_tier: SubscriptionTier::Free,
            })
            .await
            .unwrap()
    }

    /// A context for the principal as currently stored.
    pub async fn context_for(&self, user_id: Uuid) -> AuthContext {
        let user = self.store.find_by_id(user_id).await.unwrap().unwrap();
        let claims = JwtEncoder::new(&test_config()).claims_for(&user, TokenType::Access, Utc::now());
        AuthContext { user, claims }
    }
}
