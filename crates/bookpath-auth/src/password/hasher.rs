//! Argon2id password hashing and verification.

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use bookpath_core::config::AuthConfig;
use bookpath_core::error::AppError;
use bookpath_core::result::AppResult;

/// Handles password hashing and verification using Argon2id.
///
/// Hashing is CPU-bound; async callers should go through the `*_blocking`
/// helpers, which move the work onto tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash verified against when the email is unknown, so that response
    /// time does not reveal whether an account exists.
    dummy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher with the configured Argon2id cost parameters.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;

        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash_password("bookpath-timing-equalizer")?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored PHC string.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only for unparseable hashes.
    pub fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// True if `password` matches any of `hashes`.
    pub fn matches_any<'a>(
        &self,
        password: &str,
        hashes: impl IntoIterator<Item = &'a str>,
    ) -> AppResult<bool> {
        for hash in hashes {
            if self.verify_password(password, hash)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Burns one verification's worth of work. The result is discarded.
    pub fn dummy_verify(&self, password: &str) {
        let _ = self.verify_password(password, &self.dummy_hash);
    }

    /// [`hash_password`](Self::hash_password) on the blocking pool.
    pub async fn hash_blocking(self: Arc<Self>, password: String) -> AppResult<String> {
        run_blocking(move || self.hash_password(&password)).await
    }

    /// [`verify_password`](Self::verify_password) on the blocking pool.
    pub async fn verify_blocking(self: Arc<Self>, password: String, hash: String) -> AppResult<bool> {
        run_blocking(move || self.verify_password(&password, &hash)).await
    }

    /// [`dummy_verify`](Self::dummy_verify) on the blocking pool.
    pub async fn dummy_verify_blocking(self: Arc<Self>, password: String) {
        let _ = run_blocking(move || {
            self.dummy_verify(&password);
            Ok(())
        })
        .await;
    }
}

async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Password task failed: {e}")))?
}
