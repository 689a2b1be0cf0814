use std::collections::HashMap;

use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set,
    sea_query::{Expr, OnConflict},
};
use sqlx::FromRow;

use crate::{
    catalog::{Audience, is_visible},
    dto::cart::{CartAdd, CartLine, CartList},
    entity::cart_items::{self, Entity as CartItems},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::product_service::{CatalogSource, load_catalog},
    state::AppState,
};

pub const MAX_LINE_QUANTITY: i32 = 99;

#[derive(FromRow)]
struct CartRow {
    id: i32,
    product_id: i32,
    quantity: i32,
}

/// The cart only ever shows products a customer could buy right now; lines
/// whose product was unapproved or deleted since are left out.
pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = sqlx::query_as::<_, CartRow>(
        r#"
        SELECT id, product_id, quantity
        FROM cart_items
        WHERE user_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let ids: Vec<i32> = rows.iter().map(|row| row.product_id).collect();
    let source = CatalogSource {
        ids: Some(&ids),
        ..Default::default()
    };
    let mut products: HashMap<i32, _> = load_catalog(&state.pool, source)
        .await?
        .into_iter()
        .filter(|entry| is_visible(entry.product.approved, entry.product.status, Audience::Customer))
        .map(|entry| (entry.product.id, entry))
        .collect();

    let items: Vec<CartLine> = rows
        .into_iter()
        .filter_map(|row| {
            products.remove(&row.product_id).map(|product| CartLine {
                id: row.id,
                quantity: row.quantity,
                product,
            })
        })
        .collect();

    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("Cart", CartList { items }, Some(meta)))
}

/// Adding a product already in the cart raises its quantity, capped.
pub async fn add_to_cart(state: &AppState, user: &AuthUser, add: CartAdd) -> AppResult<ApiResponse<CartList>> {
    let ids = [add.product_id];
    let source = CatalogSource {
        ids: Some(&ids),
        ..Default::default()
    };
    let visible = load_catalog(&state.pool, source)
        .await?
        .into_iter()
        .any(|entry| is_visible(entry.product.approved, entry.product.status, Audience::Customer));
    if !visible {
        return Err(AppError::NotFound("Product"));
    }

    let line = cart_items::ActiveModel {
        id: NotSet,
        user_id: Set(user.user_id),
        product_id: Set(add.product_id),
        quantity: Set(add.quantity),
        created_at: NotSet,
    };
    CartItems::insert(line)
        .on_conflict(
            OnConflict::columns([cart_items::Column::UserId, cart_items::Column::ProductId])
                .value(
                    cart_items::Column::Quantity,
                    Expr::cust_with_values(
                        "LEAST(cart_items.quantity + excluded.quantity, $1)",
                        [MAX_LINE_QUANTITY],
                    ),
                )
                .to_owned(),
        )
        .exec(&state.orm)
        .await?;

    tracing::debug!(user_id = user.user_id, product_id = add.product_id, "cart updated");
    list_cart(state, user).await
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
) -> AppResult<ApiResponse<CartList>> {
    let result = CartItems::delete_many()
        .filter(cart_items::Column::UserId.eq(user.user_id))
        .filter(cart_items::Column::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Cart item"));
    }
    list_cart(state, user).await
}
