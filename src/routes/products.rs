use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};

use crate::{
    dto::{
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        reviews::{CreateReviewRequest, ReviewList},
    },
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{AppJson, AppQuery, EntityId, FormOrJson},
    },
    models::{CatalogEntry, Product, Review},
    response::ApiResponse,
    routes::params::{CatalogParams, IncludeAllParams},
    services::{product_service, review_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/{id}/approve", patch(approve_product))
        .route("/{id}/stock", patch(toggle_stock))
        .route("/{id}/reviews", get(list_reviews).post(create_review))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(CatalogParams),
    responses(
        (status = 200, description = "Catalog listing in creation order", body = ApiResponse<ProductList>),
        (status = 400, description = "Malformed filter"),
        (status = 401, description = "includeAll without identity"),
        (status = 403, description = "includeAll for someone else's catalog"),
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    AppQuery(params): AppQuery<CatalogParams>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let request = params.validate()?;
    let resp = product_service::list_products(&state, user.as_ref(), request).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product with shop contact details", body = ApiResponse<CatalogEntry>),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    EntityId(id): EntityId,
) -> AppResult<Json<ApiResponse<CatalogEntry>>> {
    let resp = product_service::get_product(&state, user.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body(content = CreateProductRequest, description = "JSON, or multipart with an optional `image` file"),
    responses(
        (status = 201, description = "Product submitted, always pending", body = ApiResponse<Product>),
        (status = 400, description = "Invalid product"),
        (status = 401, description = "Not logged in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    form: FormOrJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let new_product = form.data.validate()?;
    let resp = product_service::create_product(&state, &user, new_product, form.file).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    request_body(content = UpdateProductRequest, description = "JSON, or multipart with an optional `image` file"),
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Lifecycle change not allowed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
    form: FormOrJson<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let edit = form.data.validate()?;
    let resp = product_service::update_product(&state, &user, id, edit, form.file).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/approve",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Approved; repeating is a no-op", body = ApiResponse<Product>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product is deleted"),
    ),
    security(("bearer_auth" = [])),
    tag = "Moderation"
)]
pub async fn approve_product(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::approve_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/stock",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Flipped between approved and out_of_stock", body = ApiResponse<Product>),
        (status = 409, description = "Product is pending or deleted"),
    ),
    security(("bearer_auth" = [])),
    tag = "Moderation"
)]
pub async fn toggle_stock(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::toggle_stock(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Soft-deleted; the row is kept", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Moderation"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    EntityId(id): EntityId,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/reviews",
    params(("id" = i32, Path, description = "Product ID"), IncludeAllParams),
    responses(
        (status = 200, description = "Approved reviews, or all for admins", body = ApiResponse<ReviewList>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    EntityId(id): EntityId,
    AppQuery(params): AppQuery<IncludeAllParams>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let include_all = params.include_all()?;
    let resp = review_service::list_reviews(&state, user.as_ref(), id, include_all).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/reviews",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review awaiting approval", body = ApiResponse<Review>),
        (status = 400, description = "Invalid review"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    AppJson(payload): AppJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let new_review = payload.validate()?;
    let resp = review_service::create_review(&state, id, new_review).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
