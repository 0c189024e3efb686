//! Guard middleware: validates the bearer token and runs a route's
//! [`GuardPipeline`] before the handler.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use bookpath_auth::GuardPipeline;
use bookpath_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// State handed to [`gate`]: the app plus the pipeline for one route group.
#[derive(Debug, Clone)]
pub struct GateState {
    /// Shared application state.
    pub app: AppState,
    /// Guards for the routes this layer wraps.
    pub pipeline: Arc<GuardPipeline>,
}

impl GateState {
    /// Pairs the app state with a pipeline.
    pub fn new(app: AppState, pipeline: GuardPipeline) -> Self {
        Self {
            app,
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// `Ok(None)` when the header is absent; a header with another scheme is an
/// error rather than an anonymous request.
fn bearer_token(request: &Request) -> Result<Option<&str>, AppError> {
    let Some(value) = request.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::unauthenticated("Invalid Authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(|| AppError::unauthenticated("Invalid Authorization header format"))
}

/// Validates the presented token (if any), runs the pipeline, and attaches
/// the resulting [`AuthContext`](bookpath_auth::AuthContext) for handlers.
pub async fn gate(
    State(gate): State<GateState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)?.map(str::to_owned);
    let ctx = match token {
        Some(token) => Some(gate.app.auth.authenticate_request(&token).await?),
        None => None,
    };

    gate.pipeline.check(ctx.as_ref())?;

    if let Some(ctx) = ctx {
        request.extensions_mut().insert(ctx);
    }
    Ok(next.run(request).await)
}
