//! Account administration.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::dto::response::{ApiResponse, SessionsRevokedResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/admin/users/{id}/revoke-sessions
pub async fn revoke_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionsRevokedResponse>>, ApiError> {
    let token_version = state
        .auth
        .revoke_sessions(Some(auth.user_id()), user_id)
        .await?;

    Ok(Json(ApiResponse::ok(SessionsRevokedResponse {
        user_id,
        token_version,
    })))
}
