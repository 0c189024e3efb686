//! Auth handlers: register, login, refresh, logout, password change, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use bookpath_auth::service::RegisterUser;
use bookpath_entity::user::{SubscriptionTier, UserRole};

use crate::dto::request::{
    ChangePasswordRequest, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
};
use crate::dto::response::{
    ApiResponse, LoginResponse, MessageResponse, SessionsRevokedResponse, TokenResponse,
    UserResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let user = state
        .auth
        .register(RegisterUser {
            email: req.email,
            username: req.username,
            password: req.password,
            role: UserRole::User,
            subscription_tier: SubscriptionTier::Free,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(&user))),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let result = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        tokens: result.tokens.into(),
        user: UserResponse::from(&result.user),
    })))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let tokens = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok(tokens.into())))
}

/// POST /api/auth/logout
///
/// The body is optional; `{"refresh_token": "..."}` also revokes that token.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<Json<LogoutRequest>>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    state
        .auth
        .logout(auth.context(), req.refresh_token.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Logged out successfully".to_string(),
    })))
}

/// POST /api/auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<SessionsRevokedResponse>>, ApiError> {
    let token_version = state.auth.logout_all(auth.context()).await?;

    Ok(Json(ApiResponse::ok(SessionsRevokedResponse {
        user_id: auth.user_id(),
        token_version,
    })))
}

/// POST /api/auth/change-password
///
/// Every previously issued token becomes stale; the response carries a
/// fresh pair so the caller stays signed in.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = state
        .auth
        .change_password(auth.context(), &req.current_password, &req.new_password)
        .await?;
    let tokens = state.auth.issue_tokens(&user)?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        tokens: tokens.into(),
        user: UserResponse::from(&user),
    })))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok(UserResponse::from(&auth.user)))
}
