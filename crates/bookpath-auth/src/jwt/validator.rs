//! Full request-token validation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use bookpath_core::error::AppError;
use bookpath_core::result::AppResult;
use bookpath_database::CredentialStore;

use super::claims::TokenType;
use super::decoder::JwtDecoder;
use super::revocation::RevocationList;
use crate::context::AuthContext;

/// Validates a presented token against the stores.
///
/// Checks run in a fixed order and stop at the first failure:
///
/// 1. signature, expiry, issuer, audience, then token type
/// 2. revocation marker
/// 3. principal exists
/// 4. token version matches
/// 5. principal is not locked
///
/// Results are never cached; a revocation or version bump is visible to the
/// very next request.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    decoder: JwtDecoder,
    revocations: RevocationList,
    store: Arc<dyn CredentialStore>,
}

impl TokenValidator {
    /// Creates a validator.
    pub fn new(
        decoder: JwtDecoder,
        revocations: RevocationList,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            decoder,
            revocations,
            store,
        }
    }

    /// Validates `token` as a token of type `expected`.
    pub async fn validate(
        &self,
        token: &str,
        expected: TokenType,
        now: DateTime<Utc>,
    ) -> AppResult<AuthContext> {
        let claims = self.decoder.decode(token)?;
        if claims.typ != expected {
            return Err(AppError::unauthenticated(format!(
                "Expected a {} token",
                match expected {
                    TokenType::Access => "access",
                    TokenType::Refresh => "refresh",
                }
            )));
        }

        if self.revocations.is_revoked(claims.jti).await? {
            warn!(user_id = %claims.sub, jti = %claims.jti, "Revoked token presented");
            return Err(AppError::token_revoked());
        }

        let user = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(AppError::principal_not_found)?;

        if claims.ver != user.token_version {
            warn!(
                user_id = %user.id,
                token_version = claims.ver,
                current_version = user.token_version,
                "Stale token presented"
            );
            return Err(AppError::token_stale());
        }

        if let Some(until) = user.locked_until_at(now) {
            return Err(AppError::account_locked(until));
        }

        Ok(AuthContext { user, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookpath_core::error::ErrorKind;

    use crate::jwt::JwtEncoder;
    use crate::testing::{Harness, test_config};

    #[tokio::test]
    async fn test_valid_access_token() {
        let h = Harness::new().await;
        let user = h.create_user("reader@bookpath.test", "Reading-List-42").await;
        let (token, _) = JwtEncoder::new(&test_config())
            .issue(&user, TokenType::Access)
            .unwrap();

        let ctx = h
            .validator
            .validate(&token, TokenType::Access, Utc::now())
            .await
            .unwrap();
        assert_eq!(ctx.user_id(), user.id);
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_as_access() {
        let h = Harness::new().await;
        let user = h.create_user("reader@bookpath.test", "Reading-List-42").await;
        let (token, _) = JwtEncoder::new(&test_config())
            .issue(&user, TokenType::Refresh)
            .unwrap();

        let err = h
            .validator
            .validate(&token, TokenType::Access, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn test_revocation_checked_before_principal() {
        let h = Harness::new().await;
        let user = h.create_user("reader@bookpath.test", "Reading-List-42").await;
        let (token, claims) = JwtEncoder::new(&test_config())
            .issue(&user, TokenType::Access)
            .unwrap();

        h.revocations.revoke(&claims, Utc::now()).await.unwrap();
        h.store.remove(user.id).await;

        let err = h
            .validator
            .validate(&token, TokenType::Access, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenRevoked);
    }

    #[tokio::test]
    async fn test_revoked_token_stays_revoked_through_leeway() {
        let h = Harness::new().await;
        let user = h.create_user("reader@bookpath.test", "Reading-List-42").await;
        let encoder = JwtEncoder::new(&test_config());
        let now = Utc::now();
        let mut claims = encoder.claims_for(&user, TokenType::Access, now);
        claims.exp = now.timestamp() + 2;
        let token = encoder.sign(&claims).unwrap();

        h.revocations.revoke(&claims, now).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(3500)).await;

        // Past `exp` but inside the default leeway, so the token still decodes.
        let err = h
            .validator
            .validate(&token, TokenType::Access, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenRevoked);
    }

    #[tokio::test]
    async fn test_deleted_principal() {
        let h = Harness::new().await;
        let user = h.create_user("reader@bookpath.test", "Reading-List-42").await;
        let (token, _) = JwtEncoder::new(&test_config())
            .issue(&user, TokenType::Access)
            .unwrap();
        h.store.remove(user.id).await;

        let err = h
            .validator
            .validate(&token, TokenType::Access, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PrincipalNotFound);
    }

    #[tokio::test]
    async fn test_stale_checked_before_lock() {
        let h = Harness::new().await;
        let user = h.create_user("reader@bookpath.test", "Reading-List-42").await;
        let (token, _) = JwtEncoder::new(&test_config())
            .issue(&user, TokenType::Access)
            .unwrap();

        let now = Utc::now();
        h.store
            .set_lock(user.id, 5, now + chrono::Duration::minutes(2))
            .await
            .unwrap();
        let err = h
            .validator
            .validate(&token, TokenType::Access, now)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccountLocked);
        assert!(err.unlock_at.is_some());

        h.store.bump_token_version(user.id).await.unwrap();
        let err = h
            .validator
            .validate(&token, TokenType::Access, now)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenStale);
    }

    #[tokio::test]
    async fn test_revocation_store_outage_fails_closed() {
        let h = Harness::new().await;
        let user = h.create_user("reader@bookpath.test", "Reading-List-42").await;
        let (token, _) = JwtEncoder::new(&test_config())
            .issue(&user, TokenType::Access)
            .unwrap();

        let validator = TokenValidator::new(
            JwtDecoder::new(&test_config()),
            RevocationList::new(&test_config(), crate::testing::unavailable_cache()),
            h.store.clone(),
        );
        let err = validator
            .validate(&token, TokenType::Access, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::StoreUnavailable);
    }
}
