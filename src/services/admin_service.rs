use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait};
use serde_json::json;

use crate::{
    audit,
    dto::admin::{CleanupSummary, StatsResponse},
    entity::{CartItems, Orders, Products, Reviews, Shops, Users, products, reviews, users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{ProductStatus, UserRole},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<StatsResponse>> {
    ensure_admin(user)?;
    let deleted = ProductStatus::Deleted.as_str();

    let data = StatsResponse {
        users: Users::find().count(&state.orm).await? as i64,
        shops: Shops::find().count(&state.orm).await? as i64,
        products: Products::find()
            .filter(products::Column::Status.ne(deleted))
            .count(&state.orm)
            .await? as i64,
        pending_products: Products::find()
            .filter(products::Column::Approved.eq(false))
            .filter(products::Column::Status.ne(deleted))
            .count(&state.orm)
            .await? as i64,
        orders: Orders::find().count(&state.orm).await? as i64,
        pending_reviews: Reviews::find()
            .filter(reviews::Column::IsApproved.eq(false))
            .count(&state.orm)
            .await? as i64,
    };

    Ok(ApiResponse::success("Stats", data, Some(Meta::empty())))
}

/// Wipe marketplace content for a fresh start. Orders stay, they are the
/// record of what was sold; admin accounts stay so someone can log in.
pub async fn cleanup(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CleanupSummary>> {
    ensure_admin(user)?;
    if !state.config.allow_cleanup {
        return Err(AppError::Forbidden);
    }

    tracing::warn!(user_id = user.user_id, "database cleanup triggered");
    let txn = state.orm.begin().await?;
    let summary = CleanupSummary {
        cart_items: CartItems::delete_many().exec(&txn).await?.rows_affected,
        reviews: Reviews::delete_many().exec(&txn).await?.rows_affected,
        products: Products::delete_many().exec(&txn).await?.rows_affected,
        shops: Shops::delete_many().exec(&txn).await?.rows_affected,
        users: Users::delete_many()
            .filter(users::Column::IsAdmin.eq(false))
            .filter(users::Column::Role.ne(UserRole::Admin.as_str()))
            .exec(&txn)
            .await?
            .rows_affected,
    };
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "admin_cleanup",
        "database",
        json!(summary),
    )
    .await;

    Ok(ApiResponse::success("Database cleaned", summary, Some(Meta::empty())))
}
