mod common;

use bazaar_api::{
    dto::shops::{ProfileUpdateRequest, ShopRequest},
    error::AppError,
    models::UserRole,
    services::shop_service,
};

fn request(mobile: &str) -> ShopRequest {
    ShopRequest {
        shop_name: Some("Spice Corner".into()),
        mobile: Some(mobile.into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn concurrent_default_shop_creation_yields_one_shop() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let owner = common::create_user(&state, UserRole::Customer).await?;

    let (a, b) = tokio::join!(
        shop_service::create_default_shop(&state, &owner, request("0300 1111111")),
        shop_service::create_default_shop(&state, &owner, request("0300 2222222")),
    );
    let (a, a_created) = a?;
    let (b, b_created) = b?;
    assert!(a_created ^ b_created, "exactly one call inserts");
    let a = a.data.expect("shop");
    let b = b.data.expect("shop");
    assert_eq!(a.id, b.id);
    assert_eq!(a.name, "Spice Corner");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shops WHERE owner_id = $1")
        .bind(owner.user_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(count, 1);

    // The owner is now a seller.
    let role: String = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
        .bind(owner.user_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(role, "seller");

    // A repeat call with an empty body still returns the existing shop.
    let (again, created) =
        shop_service::create_default_shop(&state, &owner, ShopRequest::default()).await?;
    assert!(!created);
    assert_eq!(again.data.expect("shop").id, a.id);

    Ok(())
}

#[tokio::test]
async fn admin_shop_creation_is_one_per_owner() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::create_user(&state, UserRole::Admin).await?;
    let owner = common::create_user(&state, UserRole::Customer).await?;

    let body = |name: &str| ShopRequest {
        name: Some(name.into()),
        category: Some("Bakery".into()),
        mobile: Some("0301 5555555".into()),
        owner_id: Some(owner.user_id.to_string()),
        ..Default::default()
    };

    let shop = shop_service::create_shop(&state, &admin, body("Daily Bread").validate(true)?)
        .await?
        .data
        .expect("shop");
    assert_eq!(shop.owner_id, owner.user_id);
    assert!(!shop.is_verified);

    let second = shop_service::create_shop(&state, &admin, body("Daily Bread 2").validate(true)?).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let not_admin = shop_service::create_shop(&state, &owner, body("Mine").validate(true)?).await;
    assert!(matches!(not_admin, Err(AppError::Forbidden)));

    let verified = shop_service::verify_shop(&state, &admin, shop.id).await?;
    assert!(verified.data.expect("shop").is_verified);
    let again = shop_service::verify_shop(&state, &admin, shop.id).await?;
    assert!(again.data.expect("shop").is_verified);

    Ok(())
}

#[tokio::test]
async fn profile_save_mirrors_onto_shop() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let owner = common::create_user(&state, UserRole::Customer).await?;
    shop_service::create_default_shop(&state, &owner, request("0333 9999999")).await?;

    let update = ProfileUpdateRequest {
        shop_name: Some("Spice Corner Deluxe".into()),
        shop_address: Some("12 Market Lane".into()),
        contact_number: Some("042 1234567".into()),
        ..Default::default()
    }
    .validate()?;
    let profile = shop_service::update_profile(&state, &owner, update)
        .await?
        .data
        .expect("profile");

    assert_eq!(profile.user.shop_name.as_deref(), Some("Spice Corner Deluxe"));
    let shop = profile.shop.expect("mirrored shop");
    assert_eq!(shop.name, "Spice Corner Deluxe");
    assert_eq!(shop.address.as_deref(), Some("12 Market Lane"));
    assert_eq!(shop.contact_number.as_deref(), Some("042 1234567"));
    // Mobile was already set, so it is left alone.
    assert_eq!(shop.mobile, "0333 9999999");

    Ok(())
}
