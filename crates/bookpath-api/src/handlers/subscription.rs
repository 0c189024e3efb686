//! Subscription-gated handlers.

use axum::Json;

use crate::dto::response::{ApiResponse, EntitlementResponse};
use crate::extractors::AuthUser;

/// GET /api/subscription/pro
///
/// Reachable only by pro subscribers; the tier guard answers 402 otherwise.
pub async fn pro_probe(auth: AuthUser) -> Json<ApiResponse<EntitlementResponse>> {
    Json(ApiResponse::ok(EntitlementResponse {
        subscription_tier: auth.tier(),
        entitled: true,
    }))
}
