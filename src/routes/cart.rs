use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get},
};

use crate::{
    dto::cart::{AddToCartRequest, CartList},
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{AppJson, EntityId},
    },
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_list).post(add_to_cart))
        .route("/{product_id}", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart lines for products still on sale", body = ApiResponse<CartList>),
        (status = 401, description = "User identity missing"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartList>>> {
    Ok(Json(cart_service::list_cart(&state, &user).await?))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = ApiResponse<CartList>),
        (status = 404, description = "Product not available"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartList>>> {
    let add = payload.validate()?;
    Ok(Json(cart_service::add_to_cart(&state, &user, add).await?))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{product_id}",
    params(("product_id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Updated cart", body = ApiResponse<CartList>),
        (status = 404, description = "Not in cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(product_id): EntityId,
) -> AppResult<Json<ApiResponse<CartList>>> {
    Ok(Json(cart_service::remove_from_cart(&state, &user, product_id).await?))
}
