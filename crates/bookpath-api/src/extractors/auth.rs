//! `AuthUser` extractor: the principal attached by the guard middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use bookpath_auth::AuthContext;
use bookpath_core::error::AppError;

use crate::error::ApiError;

/// Authenticated principal available in handlers.
///
/// Only present on routes behind [`gate`](crate::middleware::gate::gate),
/// which validates the bearer token and inserts the context into request
/// extensions.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

impl AuthUser {
    /// Returns the inner `AuthContext`.
    pub fn context(&self) -> &AuthContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = AuthContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::unauthenticated("Authentication required").into())
    }
}
