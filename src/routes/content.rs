//! Admin-managed storefront content.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};

use crate::{
    dto::content::{
        BannerList, BannerRequest, CategoryList, CategoryRequest, OfferList, OfferRequest,
    },
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{AppJson, AppQuery, EntityId, FormOrJson},
    },
    models::{Banner, Category, Offer},
    response::ApiResponse,
    routes::params::OfferParams,
    services::content_service,
    state::AppState,
};

pub fn categories_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", patch(update_category).delete(delete_category))
}

pub fn offers_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_offers).post(create_offer))
        .route("/{id}", patch(update_offer).delete(delete_offer))
}

pub fn banners_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_banners).post(create_banner))
        .route("/{id}", patch(update_banner).delete(delete_banner))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "All categories by name", body = ApiResponse<CategoryList>)),
    tag = "Content"
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<ApiResponse<CategoryList>>> {
    Ok(Json(content_service::list_categories(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body(content = CategoryRequest, description = "JSON, or multipart with an optional `image` file"),
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 409, description = "Name already used"),
    ),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    form: FormOrJson<CategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let fields = form.data.validate_new()?;
    let resp = content_service::create_category(&state, &user, fields, form.file).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    request_body(content = CategoryRequest, description = "JSON, or multipart with an optional `image` file"),
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
    form: FormOrJson<CategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let fields = form.data.validate_patch();
    Ok(Json(
        content_service::update_category(&state, &user, id, fields, form.file).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    responses((status = 200, description = "Category removed"), (status = 404, description = "Category not found")),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(content_service::delete_category(&state, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/offers",
    params(OfferParams),
    responses((status = 200, description = "Ticker offers", body = ApiResponse<OfferList>)),
    tag = "Content"
)]
pub async fn list_offers(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<OfferParams>,
) -> AppResult<Json<ApiResponse<OfferList>>> {
    let active_only = params.active_only()?;
    Ok(Json(content_service::list_offers(&state, active_only).await?))
}

#[utoipa::path(
    post,
    path = "/api/offers",
    request_body = OfferRequest,
    responses((status = 201, description = "Offer published", body = ApiResponse<Offer>)),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn create_offer(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<OfferRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Offer>>)> {
    let fields = payload.validate_new()?;
    let resp = content_service::create_offer(&state, &user, fields).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/offers/{id}",
    params(("id" = i32, Path, description = "Offer ID")),
    request_body = OfferRequest,
    responses(
        (status = 200, description = "Offer updated", body = ApiResponse<Offer>),
        (status = 404, description = "Offer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn update_offer(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
    AppJson(payload): AppJson<OfferRequest>,
) -> AppResult<Json<ApiResponse<Offer>>> {
    let fields = payload.validate_patch()?;
    Ok(Json(content_service::update_offer(&state, &user, id, fields).await?))
}

#[utoipa::path(
    delete,
    path = "/api/offers/{id}",
    params(("id" = i32, Path, description = "Offer ID")),
    responses((status = 200, description = "Offer removed"), (status = 404, description = "Offer not found")),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn delete_offer(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(content_service::delete_offer(&state, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/banners",
    responses((status = 200, description = "Homepage banners", body = ApiResponse<BannerList>)),
    tag = "Content"
)]
pub async fn list_banners(State(state): State<AppState>) -> AppResult<Json<ApiResponse<BannerList>>> {
    Ok(Json(content_service::list_banners(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/banners",
    request_body(content = BannerRequest, description = "JSON with an image URL, or multipart with an `image` file"),
    responses(
        (status = 201, description = "Banner created", body = ApiResponse<Banner>),
        (status = 400, description = "Image required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn create_banner(
    State(state): State<AppState>,
    user: AuthUser,
    form: FormOrJson<BannerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Banner>>)> {
    let fields = form.data.validate();
    let resp = content_service::create_banner(&state, &user, fields, form.file).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/banners/{id}",
    params(("id" = i32, Path, description = "Banner ID")),
    request_body(content = BannerRequest, description = "JSON, or multipart with an optional `image` file"),
    responses(
        (status = 200, description = "Banner updated", body = ApiResponse<Banner>),
        (status = 404, description = "Banner not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn update_banner(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
    form: FormOrJson<BannerRequest>,
) -> AppResult<Json<ApiResponse<Banner>>> {
    let fields = form.data.validate();
    Ok(Json(
        content_service::update_banner(&state, &user, id, fields, form.file).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/banners/{id}",
    params(("id" = i32, Path, description = "Banner ID")),
    responses((status = 200, description = "Banner removed"), (status = 404, description = "Banner not found")),
    security(("bearer_auth" = [])),
    tag = "Content"
)]
pub async fn delete_banner(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(content_service::delete_banner(&state, &user, id).await?))
}
