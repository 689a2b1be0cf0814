use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde_json::json;

use crate::{
    audit,
    dto::orders::{NewOrder, OrderList},
    entity::{
        orders::{self, Entity as Orders},
        shops::Entity as Shops,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_owner_or_admin},
    models::{Order, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListRequest, OrderScope},
    state::AppState,
};

/// Record an order exactly as submitted. The product is not re-read: price,
/// approval and deletion state at order time are whatever the client saw.
pub async fn create_order(state: &AppState, new_order: NewOrder) -> AppResult<ApiResponse<Order>> {
    let status = new_order.status();
    let now = Utc::now();
    let active = orders::ActiveModel {
        id: NotSet,
        product_id: Set(new_order.product_id),
        shop_id: Set(new_order.shop_id),
        customer_name: Set(new_order.customer_name),
        customer_phone: Set(new_order.customer_phone),
        customer_address: Set(new_order.customer_address),
        quantity: Set(new_order.quantity),
        total_price: Set(new_order.total_price),
        status: Set(status.as_str().to_string()),
        payment_method: Set(Some(new_order.payment_method.as_str().to_string())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let order = Order::from(active.insert(&state.orm).await?);

    tracing::info!(
        order_id = order.id,
        shop_id = order.shop_id,
        status = order.status.as_str(),
        "order placed"
    );
    Ok(ApiResponse::success("Order placed", order, Some(Meta::empty())))
}

/// Customers look up by phone; shop owners by shop; admins see everything.
pub async fn list_orders(
    state: &AppState,
    caller: Option<&AuthUser>,
    request: OrderListRequest,
) -> AppResult<ApiResponse<OrderList>> {
    let mut finder = Orders::find();
    match &request.scope {
        OrderScope::All => {
            let user = caller.ok_or_else(|| AppError::Unauthorized("User identity missing".into()))?;
            ensure_admin(user)?;
        }
        OrderScope::Shop(shop_id) => {
            let user = caller.ok_or_else(|| AppError::Unauthorized("User identity missing".into()))?;
            let shop = Shops::find_by_id(*shop_id)
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound("Shop"))?;
            ensure_owner_or_admin(user, shop.owner_id)?;
            finder = finder.filter(orders::Column::ShopId.eq(*shop_id));
        }
        OrderScope::Phone(phone) => {
            finder = finder.filter(orders::Column::CustomerPhone.eq(phone.as_str()));
        }
    }
    if let Some(status) = request.status {
        finder = finder.filter(orders::Column::Status.eq(status.as_str()));
    }
    let finder = finder
        .order_by_desc(orders::Column::CreatedAt)
        .order_by_desc(orders::Column::Id);

    let total = finder.clone().count(&state.orm).await? as i64;
    let (finder, meta) = match request.pagination.requested() {
        Some((page, per_page, offset)) => (
            finder.limit(per_page as u64).offset(offset as u64),
            Meta::new(page, per_page, total),
        ),
        None => (finder, Meta::total(total)),
    };

    let items = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

/// Any status may follow any other.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    status: OrderStatus,
) -> AppResult<ApiResponse<Order>> {
    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    if !user.is_admin() {
        let owner_id = Shops::find_by_id(existing.shop_id)
            .one(&state.orm)
            .await?
            .map(|shop| shop.owner_id)
            .ok_or(AppError::Forbidden)?;
        ensure_owner_or_admin(user, owner_id)?;
    }

    let previous = OrderStatus::from_stored(&existing.status);
    let mut active: orders::ActiveModel = existing.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = Order::from(active.update(&state.orm).await?);

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        "orders",
        json!({ "order_id": id, "from": previous, "to": status }),
    )
    .await;

    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}
