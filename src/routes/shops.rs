//! Shop lookup and admin shop management, plus the partner dashboard's
//! shop endpoints and the profile save that mirrors onto the shop.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};

use crate::{
    dto::shops::{ProfileResponse, ProfileUpdateRequest, ShopList, ShopRequest},
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{AppJson, AppQuery, EntityId},
    },
    models::Shop,
    response::ApiResponse,
    routes::params::IncludeAllParams,
    services::shop_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shops).post(create_shop))
        .route("/mine", get(my_shop))
        .route("/{id}", get(get_shop))
        .route("/{id}/verify", patch(verify_shop))
}

pub fn partner_router() -> Router<AppState> {
    Router::new()
        .route("/shop", get(my_shop))
        .route("/shop/create-default", post(create_default_shop))
        .route("/shop/{owner_id}", get(shop_by_owner))
}

pub fn user_router() -> Router<AppState> {
    Router::new().route("/profile", patch(update_profile))
}

#[utoipa::path(
    get,
    path = "/api/shops",
    params(IncludeAllParams),
    responses(
        (status = 200, description = "Live shops, or every shop for admins", body = ApiResponse<ShopList>),
    ),
    tag = "Shops"
)]
pub async fn list_shops(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    AppQuery(params): AppQuery<IncludeAllParams>,
) -> AppResult<Json<ApiResponse<ShopList>>> {
    let include_all = params.include_all()?;
    Ok(Json(shop_service::list_shops(&state, user.as_ref(), include_all).await?))
}

#[utoipa::path(
    get,
    path = "/api/shops/mine",
    responses(
        (status = 200, description = "The caller's shop, or null", body = ApiResponse<Option<Shop>>),
        (status = 401, description = "User identity missing"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shops"
)]
pub async fn my_shop(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Option<Shop>>>> {
    Ok(Json(shop_service::my_shop(&state, &user).await?))
}

#[utoipa::path(
    get,
    path = "/api/shops/{id}",
    params(("id" = i32, Path, description = "Shop ID")),
    responses(
        (status = 200, description = "Shop", body = ApiResponse<Shop>),
        (status = 404, description = "Shop not found"),
    ),
    tag = "Shops"
)]
pub async fn get_shop(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    EntityId(id): EntityId,
) -> AppResult<Json<ApiResponse<Shop>>> {
    Ok(Json(shop_service::get_shop(&state, user.as_ref(), id).await?))
}

#[utoipa::path(
    post,
    path = "/api/shops",
    request_body = ShopRequest,
    responses(
        (status = 201, description = "Shop created for the given owner", body = ApiResponse<Shop>),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Owner already has a shop"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shops"
)]
pub async fn create_shop(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ShopRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Shop>>)> {
    let new_shop = payload.validate(true)?;
    let resp = shop_service::create_shop(&state, &user, new_shop).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/shops/{id}/verify",
    params(("id" = i32, Path, description = "Shop ID")),
    responses(
        (status = 200, description = "Shop marked verified", body = ApiResponse<Shop>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Shop not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shops"
)]
pub async fn verify_shop(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
) -> AppResult<Json<ApiResponse<Shop>>> {
    Ok(Json(shop_service::verify_shop(&state, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/partner/shop/{owner_id}",
    params(("owner_id" = i32, Path, description = "Owner user ID")),
    responses(
        (status = 200, description = "The owner's shop, or null", body = ApiResponse<Option<Shop>>),
        (status = 400, description = "Invalid id"),
    ),
    tag = "Partner"
)]
pub async fn shop_by_owner(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    EntityId(owner_id): EntityId,
) -> AppResult<Json<ApiResponse<Option<Shop>>>> {
    Ok(Json(shop_service::shop_by_owner(&state, user.as_ref(), owner_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/partner/shop/create-default",
    request_body = ShopRequest,
    responses(
        (status = 201, description = "Shop created, caller promoted to seller", body = ApiResponse<Shop>),
        (status = 200, description = "Caller already had a shop; returned unchanged", body = ApiResponse<Shop>),
        (status = 401, description = "User identity missing"),
    ),
    security(("bearer_auth" = [])),
    tag = "Partner"
)]
pub async fn create_default_shop(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ShopRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Shop>>)> {
    let (resp, created) = shop_service::create_default_shop(&state, &user, payload).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/user/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile saved on the user and their shop", body = ApiResponse<ProfileResponse>),
        (status = 401, description = "User identity missing"),
    ),
    security(("bearer_auth" = [])),
    tag = "Partner"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ProfileUpdateRequest>,
) -> AppResult<Json<ApiResponse<ProfileResponse>>> {
    let update = payload.validate()?;
    Ok(Json(shop_service::update_profile(&state, &user, update).await?))
}
