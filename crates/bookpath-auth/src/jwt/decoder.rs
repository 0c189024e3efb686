//! Signature, expiry, issuer, and audience verification.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use bookpath_core::config::AuthConfig;
use bookpath_core::error::AppError;
use bookpath_core::result::AppResult;

use super::claims::Claims;

/// Verifies token cryptography and registered claims.
///
/// This is only the first validation step; revocation, version, and lock
/// checks live in [`TokenValidator`](super::TokenValidator).
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.jwt_leeway_seconds;
        validation.set_issuer(&[config.jwt_issuer.as_str()]);
        validation.set_audience(&[config.jwt_audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes `token`, mapping expiry to `TokenExpired` and every other
    /// failure to `Unauthenticated`.
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::token_expired(),
                JwtErrorKind::InvalidSignature => {
                    AppError::unauthenticated("Invalid token signature")
                }
                JwtErrorKind::InvalidIssuer | JwtErrorKind::InvalidAudience => {
                    AppError::unauthenticated("Token was not issued for this service")
                }
                other => {
                    debug!(reason = ?other, "Token rejected");
                    AppError::unauthenticated("Malformed or invalid token")
                }
            })
    }
}
