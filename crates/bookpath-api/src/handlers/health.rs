//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use bookpath_core::traits::CacheProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

fn describe(result: &bookpath_core::AppResult<bool>) -> &'static str {
    match result {
        Ok(true) => "connected",
        Ok(false) => "unreachable",
        Err(_) => "error",
    }
}

/// GET /api/health
///
/// Returns 503 when either store is unhealthy.
pub async fn health(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let (database, cache) = tokio::join!(state.store.health_check(), state.cache.health_check());
    let healthy = matches!(database, Ok(true)) && matches!(cache, Ok(true));

    if !healthy {
        tracing::warn!(
            database = describe(&database),
            cache = describe(&cache),
            "Health check degraded"
        );
    }

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: describe(&database).to_string(),
            cache: describe(&cache).to_string(),
        })),
    )
}
