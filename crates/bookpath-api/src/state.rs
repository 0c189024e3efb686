//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use bookpath_auth::AuthService;
use bookpath_cache::provider::CacheManager;
use bookpath_core::config::AppConfig;
use bookpath_database::CredentialStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Ephemeral store (Redis or in-memory)
    pub cache: Arc<CacheManager>,
    /// Credential store (PostgreSQL or in-memory)
    pub store: Arc<dyn CredentialStore>,
    /// Login, token, and password operations
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Builds the state, wiring an [`AuthService`] over the given stores.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn CredentialStore>,
        cache: Arc<CacheManager>,
    ) -> bookpath_core::AppResult<Self> {
        let auth = AuthService::new(&config.auth, Arc::clone(&store), Arc::clone(&cache))?;
        Ok(Self {
            config: Arc::new(config),
            cache,
            store,
            auth: Arc::new(auth),
        })
    }
}
