//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookpath_core::config::AuthConfig;
use bookpath_core::error::AppError;
use bookpath_core::result::AppResult;
use bookpath_entity::user::User;

use super::claims::{Claims, TokenType};

/// Signs access and refresh tokens (HS256).
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    issuer: String,
    audience: String,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            access_ttl: chrono::Duration::minutes(config.jwt_access_ttl_minutes as i64),
            refresh_ttl: chrono::Duration::hours(config.jwt_refresh_ttl_hours as i64),
        }
    }

    /// Claims for a new token of `typ` bound to the principal's current version.
    pub fn claims_for(&self, user: &User, typ: TokenType, now: DateTime<Utc>) -> Claims {
        let ttl = match typ {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        Claims {
            sub: user.id,
            ver: user.token_version,
            jti: Uuid::new_v4(),
            role: user.role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            typ,
        }
    }

    /// Signs arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Issues a single token of `typ` for `user`.
    pub fn issue(&self, user: &User, typ: TokenType) -> AppResult<(String, Claims)> {
        let claims = self.claims_for(user, typ, Utc::now());
        let token = self.sign(&claims)?;
        Ok((token, claims))
    }

    /// Issues an access and a refresh token for `user`.
    pub fn issue_pair(&self, user: &User) -> AppResult<TokenPair> {
        let (access_token, access) = self.issue(user, TokenType::Access)?;
        let (refresh_token, refresh) = self.issue(user, TokenType::Refresh)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at: access.expires_at(),
            refresh_expires_at: refresh.expires_at(),
        })
    }
}
