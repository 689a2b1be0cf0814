mod common;

use bazaar_api::{
    dto::{
        cart::AddToCartRequest,
        orders::CreateOrderRequest,
        products::{CreateProductRequest, UpdateProductRequest},
        shops::ShopRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{OrderStatus, PaymentMethod, Product, ProductStatus, UserRole},
    routes::params::OrderListParams,
    services::{cart_service, order_service, product_service, shop_service},
    state::AppState,
};
use serde_json::json;

async fn approved_product(
    state: &AppState,
    admin: &AuthUser,
    seller: &AuthUser,
    name: &str,
) -> anyhow::Result<Product> {
    shop_service::create_default_shop(
        state,
        seller,
        ShopRequest {
            mobile: Some("0345 1112223".into()),
            ..Default::default()
        },
    )
    .await?;
    let request: CreateProductRequest = serde_json::from_value(json!({
        "name": name,
        "price": "250",
        "category": "Household",
    }))?;
    let product = product_service::create_product(state, seller, request.validate()?, None)
        .await?
        .data
        .expect("product");
    product_service::approve_product(state, admin, product.id).await?;
    Ok(product)
}

// Orders keep what the customer saw even after the product goes away.
#[tokio::test]
async fn order_snapshot_survives_product_deletion() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::create_user(&state, UserRole::Admin).await?;
    let seller = common::create_user(&state, UserRole::Customer).await?;
    let product = approved_product(&state, &admin, &seller, "Copper Jug").await?;

    let phone = common::unique("0300");
    let request: CreateOrderRequest = serde_json::from_value(json!({
        "productId": product.id,
        "shopId": product.shop_id.to_string(),
        "customerName": "Ayesha",
        "customerPhone": phone,
        "customerAddress": "House 4, Street 9",
        "quantity": "2",
        "totalPrice": 500,
        "status": "delivered",
    }))?;
    let order = order_service::create_order(&state, request.validate()?)
        .await?
        .data
        .expect("order");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_method, Some(PaymentMethod::Cod));
    assert_eq!(order.quantity, 2);

    product_service::delete_product(&state, &seller, product.id).await?;

    let params = OrderListParams {
        phone: Some(phone.clone()),
        ..Default::default()
    };
    let resp = order_service::list_orders(&state, None, params.validate()?).await?;
    assert_eq!(resp.meta.as_ref().and_then(|m| m.total), Some(1));
    let orders = resp.data.expect("orders").items;
    assert_eq!(orders.len(), 1);
    let stored = &orders[0];
    assert_eq!(stored.id, order.id);
    assert_eq!(stored.product_id, product.id);
    assert_eq!(stored.customer_name, "Ayesha");
    assert_eq!(stored.customer_address, "House 4, Street 9");
    assert_eq!(stored.total_price, "500");

    Ok(())
}

#[tokio::test]
async fn order_keeps_agreed_price_after_product_edit() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::create_user(&state, UserRole::Admin).await?;
    let seller = common::create_user(&state, UserRole::Customer).await?;
    let product = approved_product(&state, &admin, &seller, "Wool Shawl").await?;

    let phone = common::unique("0321");
    let request: CreateOrderRequest = serde_json::from_value(json!({
        "productId": product.id,
        "shopId": product.shop_id,
        "customerName": "Hina",
        "customerPhone": phone,
        "customerAddress": "Canal View",
        "totalPrice": "250",
    }))?;
    let order = order_service::create_order(&state, request.validate()?)
        .await?
        .data
        .expect("order");

    let price_change: UpdateProductRequest = serde_json::from_value(json!({ "price": "400" }))?;
    let edited = product_service::update_product(
        &state,
        &seller,
        product.id,
        price_change.validate()?,
        None,
    )
    .await?
    .data
    .expect("product");
    assert_eq!(edited.price, "400");
    assert!(edited.approved);
    assert_eq!(edited.status, ProductStatus::Approved);

    let params = OrderListParams {
        phone: Some(phone),
        ..Default::default()
    };
    let orders = order_service::list_orders(&state, None, params.validate()?)
        .await?
        .data
        .expect("orders")
        .items;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order.id);
    assert_eq!(orders[0].total_price, "250");

    Ok(())
}

#[tokio::test]
async fn shop_owner_manages_their_orders() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::create_user(&state, UserRole::Admin).await?;
    let seller = common::create_user(&state, UserRole::Customer).await?;
    let stranger = common::create_user(&state, UserRole::Customer).await?;
    let product = approved_product(&state, &admin, &seller, "Prayer Mat").await?;

    let request: CreateOrderRequest = serde_json::from_value(json!({
        "productId": product.id,
        "shopId": product.shop_id,
        "customerName": "Bilal",
        "customerPhone": common::unique("0312"),
        "customerAddress": "Block C",
        "totalPrice": "250",
        "paymentMethod": "upi",
    }))?;
    let order = order_service::create_order(&state, request.validate()?)
        .await?
        .data
        .expect("order");
    assert_eq!(order.status, OrderStatus::PaymentPendingVerification);

    let by_shop = || OrderListParams {
        shop_id: Some(product.shop_id.to_string()),
        ..Default::default()
    };
    let listed = order_service::list_orders(&state, Some(&seller), by_shop().validate()?)
        .await?
        .data
        .expect("orders")
        .items;
    assert!(listed.iter().any(|o| o.id == order.id));

    let denied = order_service::list_orders(&state, Some(&stranger), by_shop().validate()?).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));
    let anonymous = order_service::list_orders(&state, None, by_shop().validate()?).await;
    assert!(matches!(anonymous, Err(AppError::Unauthorized(_))));

    let updated =
        order_service::update_order_status(&state, &seller, order.id, OrderStatus::Delivered)
            .await?
            .data
            .expect("order");
    assert_eq!(updated.status, OrderStatus::Delivered);

    let denied =
        order_service::update_order_status(&state, &stranger, order.id, OrderStatus::Cancelled)
            .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    Ok(())
}

#[tokio::test]
async fn cart_only_holds_products_on_sale() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::create_user(&state, UserRole::Admin).await?;
    let seller = common::create_user(&state, UserRole::Customer).await?;
    let shopper = common::create_user(&state, UserRole::Customer).await?;
    let product = approved_product(&state, &admin, &seller, "Brass Lamp").await?;

    let add = |quantity: i32| -> anyhow::Result<_> {
        let request: AddToCartRequest = serde_json::from_value(json!({
            "productId": product.id,
            "quantity": quantity,
        }))?;
        Ok(request.validate()?)
    };

    cart_service::add_to_cart(&state, &shopper, add(60)?).await?;
    let cart = cart_service::add_to_cart(&state, &shopper, add(60)?)
        .await?
        .data
        .expect("cart")
        .items;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].quantity, cart_service::MAX_LINE_QUANTITY);
    assert_eq!(cart[0].product.product.id, product.id);

    // Once deleted, the product drops out of the cart and cannot be re-added.
    product_service::delete_product(&state, &seller, product.id).await?;
    let cart = cart_service::list_cart(&state, &shopper).await?.data.expect("cart").items;
    assert!(cart.is_empty());
    let readd = cart_service::add_to_cart(&state, &shopper, add(1)?).await;
    assert!(matches!(readd, Err(AppError::NotFound(_))));

    cart_service::remove_from_cart(&state, &shopper, product.id).await?;
    let missing = cart_service::remove_from_cart(&state, &shopper, product.id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    Ok(())
}
