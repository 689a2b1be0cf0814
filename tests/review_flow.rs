mod common;

use bazaar_api::{
    dto::{products::CreateProductRequest, reviews::CreateReviewRequest, shops::ShopRequest},
    error::AppError,
    models::UserRole,
    services::{product_service, review_service, shop_service},
};
use serde_json::json;

fn review(name: &str, rating: i32) -> anyhow::Result<bazaar_api::dto::reviews::NewReview> {
    let request: CreateReviewRequest = serde_json::from_value(json!({
        "customerName": name,
        "rating": rating,
        "comment": "Good quality",
    }))?;
    Ok(request.validate()?)
}

// Reviews stay hidden from shoppers until an admin approves them.
#[tokio::test]
async fn reviews_wait_for_approval() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let admin = common::create_user(&state, UserRole::Admin).await?;
    let seller = common::create_user(&state, UserRole::Customer).await?;
    shop_service::create_default_shop(
        &state,
        &seller,
        ShopRequest {
            mobile: Some("0366 1212121".into()),
            ..Default::default()
        },
    )
    .await?;
    let request: CreateProductRequest =
        serde_json::from_value(json!({ "name": "Honey Jar", "price": "650" }))?;
    let product = product_service::create_product(&state, &seller, request.validate()?, None)
        .await?
        .data
        .expect("product");
    product_service::approve_product(&state, &admin, product.id).await?;

    let submitted = review_service::create_review(&state, product.id, review("Sana", 4)?)
        .await?
        .data
        .expect("review");
    assert!(!submitted.is_approved);

    let public = review_service::list_reviews(&state, None, product.id, false)
        .await?
        .data
        .expect("reviews");
    assert!(public.items.is_empty());
    assert_eq!(public.approved_count, 0);
    assert_eq!(public.average_rating, None);

    let all = review_service::list_reviews(&state, Some(&admin), product.id, true)
        .await?
        .data
        .expect("reviews");
    assert!(all.items.iter().any(|r| r.id == submitted.id));

    let denied = review_service::list_reviews(&state, Some(&seller), product.id, true).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    review_service::approve_review(&state, &admin, submitted.id).await?;
    let public = review_service::list_reviews(&state, None, product.id, false)
        .await?
        .data
        .expect("reviews");
    assert_eq!(public.items.len(), 1);
    assert_eq!(public.items[0].id, submitted.id);
    assert_eq!(public.approved_count, 1);
    assert_eq!(public.average_rating, Some(4.0));

    // Deleted products take no new reviews.
    product_service::delete_product(&state, &seller, product.id).await?;
    let late = review_service::create_review(&state, product.id, review("Omar", 5)?).await;
    assert!(matches!(late, Err(AppError::NotFound(_))));

    Ok(())
}
