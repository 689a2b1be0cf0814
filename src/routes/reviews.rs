use axum::{
    Json, Router,
    extract::State,
    routing::{delete, patch},
};

use crate::{
    error::AppResult,
    middleware::{auth::AuthUser, extract::EntityId},
    models::Review,
    response::ApiResponse,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/approve", patch(approve_review))
        .route("/{id}", delete(delete_review))
}

#[utoipa::path(
    patch,
    path = "/api/reviews/{id}/approve",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review approved", body = ApiResponse<Review>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Review not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn approve_review(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
) -> AppResult<Json<ApiResponse<Review>>> {
    Ok(Json(review_service::approve_review(&state, &user, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(("id" = i32, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review removed"),
        (status = 404, description = "Review not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(review_service::delete_review(&state, &user, id).await?))
}
