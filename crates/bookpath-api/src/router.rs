//! Route definitions for the BookPath HTTP API.
//!
//! All routes are mounted under `/api`. Each group carries the
//! [`GuardPipeline`] that [`gate`](middleware::gate::gate) runs before its
//! handlers; public routes have no gate.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use bookpath_auth::GuardPipeline;
use bookpath_entity::user::{SubscriptionTier, UserRole};

use crate::handlers;
use crate::middleware::gate::{GateState, gate};
use crate::state::AppState;

/// Build the complete Axum router.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(public_routes())
        .merge(session_routes(&state))
        .merge(subscription_routes(&state))
        .merge(admin_routes(&state));

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Attaches `pipeline` to every route of `routes`.
fn guarded(
    routes: Router<AppState>,
    state: &AppState,
    pipeline: GuardPipeline,
) -> Router<AppState> {
    routes.route_layer(axum_middleware::from_fn_with_state(
        GateState::new(state.clone(), pipeline),
        gate,
    ))
}

/// Health, registration, login, refresh
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
}

/// Endpoints for any signed-in principal
fn session_routes(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/logout-all", post(handlers::auth::logout_all))
        .route("/auth/change-password", post(handlers::auth::change_password))
        .route("/auth/me", get(handlers::auth::me));
    guarded(routes, state, GuardPipeline::authenticated())
}

/// Pro-only features
fn subscription_routes(state: &AppState) -> Router<AppState> {
    let routes = Router::new().route("/subscription/pro", get(handlers::subscription::pro_probe));
    guarded(
        routes,
        state,
        GuardPipeline::authenticated().require_tier([SubscriptionTier::Pro]),
    )
}

/// Household administrator endpoints
fn admin_routes(state: &AppState) -> Router<AppState> {
    let routes = Router::new().route(
        "/admin/users/{id}/revoke-sessions",
        post(handlers::admin::users::revoke_sessions),
    );
    guarded(
        routes,
        state,
        GuardPipeline::authenticated().require_role([UserRole::Chefaodacasa]),
    )
}
