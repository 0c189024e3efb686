//! Auth service: the operations exposed to the HTTP layer and CLI.

mod account;
mod login;
mod session;

use std::sync::Arc;

use bookpath_cache::provider::CacheManager;
use bookpath_core::config::AuthConfig;
use bookpath_core::result::AppResult;
use bookpath_database::CredentialStore;

use crate::attempts::LoginAttemptGovernor;
use crate::jwt::{JwtDecoder, JwtEncoder, RevocationList, TokenValidator};
use crate::password::{PasswordHasher, PasswordValidator};

pub use account::RegisterUser;
pub use login::LoginResult;

/// Orchestrates login, token validation, logout, and password changes.
///
/// Built once at startup from injected store handles and shared behind an
/// `Arc`.
#[derive(Debug, Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
    policy: PasswordValidator,
    governor: LoginAttemptGovernor,
    encoder: JwtEncoder,
    validator: TokenValidator,
    revocations: RevocationList,
}

impl AuthService {
    /// Wires every component from configuration and store handles.
    ///
    /// Fails only on invalid Argon2 parameters.
    pub fn new(
        config: &AuthConfig,
        store: Arc<dyn CredentialStore>,
        cache: Arc<CacheManager>,
    ) -> AppResult<Self> {
        let revocations = RevocationList::new(config, Arc::clone(&cache));
        let validator = TokenValidator::new(
            JwtDecoder::new(config),
            revocations.clone(),
            Arc::clone(&store),
        );

        Ok(Self {
            hasher: Arc::new(PasswordHasher::new(config)?),
            policy: PasswordValidator::new(config),
            governor: LoginAttemptGovernor::new(config, cache, Arc::clone(&store)),
            encoder: JwtEncoder::new(config),
            validator,
            revocations,
            store,
        })
    }

    /// The credential store this service reads and writes.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }
}
