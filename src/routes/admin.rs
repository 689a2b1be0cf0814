use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::admin::{CleanupSummary, StatsResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/cleanup", post(cleanup))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Marketplace counters", body = ApiResponse<StatsResponse>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<StatsResponse>>> {
    Ok(Json(admin_service::stats(&state, &user).await?))
}

/// Wipes marketplace data except admin accounts and orders.
#[utoipa::path(
    post,
    path = "/api/admin/cleanup",
    responses(
        (status = 200, description = "Rows removed per table", body = ApiResponse<CleanupSummary>),
        (status = 403, description = "Admin only, or cleanup disabled"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn cleanup(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CleanupSummary>>> {
    Ok(Json(admin_service::cleanup(&state, &user).await?))
}
