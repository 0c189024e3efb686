//! Token validation, refresh, and logout flows.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use bookpath_core::error::{AppError, ErrorKind};
use bookpath_core::events::{self, DomainEvent, UserEvent};
use bookpath_core::result::AppResult;
use bookpath_entity::user::User;

use super::AuthService;
use crate::context::AuthContext;
use crate::jwt::{TokenPair, TokenType};

impl AuthService {
    /// Validates an access token presented on a request.
    pub async fn authenticate_request(&self, token: &str) -> AppResult<AuthContext> {
        self.validator
            .validate(token, TokenType::Access, Utc::now())
            .await
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// The presented refresh token is revoked, so each one can be used once.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let now = Utc::now();
        let ctx = self
            .validator
            .validate(refresh_token, TokenType::Refresh, now)
            .await?;

        self.revocations.revoke(&ctx.claims, now).await?;
        let tokens = self.encoder.issue_pair(&ctx.user)?;

        info!(user_id = %ctx.user.id, "Token pair refreshed");
        Ok(tokens)
    }

    /// Issues a new pair for a principal already loaded by the caller,
    /// e.g. the record returned by [`change_password`](Self::change_password).
    pub fn issue_tokens(&self, user: &User) -> AppResult<TokenPair> {
        self.encoder.issue_pair(user)
    }

    /// Revokes the presented access token and, if supplied, a refresh token.
    ///
    /// Other tokens of the same principal stay valid. An expired refresh
    /// token needs no marker and is ignored; one belonging to another
    /// principal is refused before anything is revoked.
    pub async fn logout(&self, ctx: &AuthContext, refresh_token: Option<&str>) -> AppResult<()> {
        let now = Utc::now();

        let refresh = match refresh_token {
            Some(token) => match self.validator.validate(token, TokenType::Refresh, now).await {
                Ok(refresh) if refresh.user.id == ctx.user.id => Some(refresh.claims),
                Ok(_) => {
                    warn!(user_id = %ctx.user.id, "Logout presented another principal's refresh token");
                    return Err(AppError::unauthenticated(
                        "Refresh token does not belong to this session",
                    ));
                }
                Err(e) if is_already_dead(e.kind) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        self.revocations.revoke(&ctx.claims, now).await?;
        self.audit_revoked(ctx.user.id, ctx.claims.jti);

        if let Some(claims) = refresh {
            self.revocations.revoke(&claims, now).await?;
            self.audit_revoked(ctx.user.id, claims.jti);
        }

        info!(user_id = %ctx.user.id, "Logged out");
        Ok(())
    }

    /// Invalidates every outstanding token of the caller.
    pub async fn logout_all(&self, ctx: &AuthContext) -> AppResult<i64> {
        self.bump_version(ctx.user.id, ctx.user.id).await
    }

    /// Invalidates every outstanding token of `target`, on behalf of `actor`.
    pub async fn revoke_sessions(&self, actor: Option<Uuid>, target: Uuid) -> AppResult<i64> {
        if self.store.find_by_id(target).await?.is_none() {
            return Err(AppError::not_found(format!("User {target} not found")));
        }
        let version = self.bump_version(target, actor.unwrap_or(target)).await?;
        warn!(user_id = %target, actor = ?actor, "Sessions revoked by administrator");
        Ok(version)
    }

    async fn bump_version(&self, user_id: Uuid, actor: Uuid) -> AppResult<i64> {
        let token_version = self.store.bump_token_version(user_id).await?;
        info!(user_id = %user_id, token_version, "All sessions invalidated");
        events::record(&DomainEvent::new(
            Some(actor),
            UserEvent::SessionsRevoked {
                user_id,
                token_version,
            },
        ));
        Ok(token_version)
    }

    fn audit_revoked(&self, user_id: Uuid, jti: Uuid) {
        events::record(&DomainEvent::new(
            Some(user_id),
            UserEvent::TokenRevoked { user_id, jti },
        ));
    }
}

/// Failures meaning the token can no longer be used anyway.
fn is_already_dead(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::TokenExpired | ErrorKind::TokenRevoked | ErrorKind::TokenStale
    )
}
