use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};

use crate::{
    dto::orders::{CreateOrderRequest, OrderList, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{AppJson, AppQuery, EntityId},
    },
    models::Order,
    response::ApiResponse,
    routes::params::OrderListParams,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{id}", patch(update_order_status))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order recorded as submitted", body = ApiResponse<Order>),
        (status = 400, description = "Missing or malformed field"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let new_order = payload.validate()?;
    let resp = order_service::create_order(&state, new_order).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderListParams),
    responses(
        (status = 200, description = "Orders, newest first", body = ApiResponse<OrderList>),
        (status = 400, description = "phone is required"),
        (status = 401, description = "shopId or includeAll without identity"),
        (status = 403, description = "Not the shop owner or an admin"),
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    AppQuery(params): AppQuery<OrderListParams>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let request = params.validate()?;
    Ok(Json(order_service::list_orders(&state, user.as_ref(), request).await?))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    params(("id" = i32, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
    AppJson(payload): AppJson<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let status = payload.validate()?;
    Ok(Json(order_service::update_order_status(&state, &user, id, status).await?))
}
