//! Product reviews. A review stays hidden until an admin approves it, the
//! same gate products pass through.

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::json;

use crate::{
    audit,
    catalog::{Audience, is_visible},
    dto::reviews::{NewReview, ReviewList},
    entity::reviews::{self, Entity as Reviews},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{ProductStatus, Review},
    response::{ApiResponse, Meta},
    services::product_service::find_product,
    state::AppState,
};

/// Mean rating of approved reviews, `None` when there are none.
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    let ratings: Vec<i32> = reviews
        .iter()
        .filter(|r| r.is_approved)
        .map(|r| r.rating)
        .collect();
    if ratings.is_empty() {
        return None;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    Some(sum as f64 / ratings.len() as f64)
}

pub async fn list_reviews(
    state: &AppState,
    caller: Option<&AuthUser>,
    product_id: i32,
    include_all: bool,
) -> AppResult<ApiResponse<ReviewList>> {
    if include_all {
        let user = caller.ok_or_else(|| AppError::Unauthorized("User identity missing".into()))?;
        ensure_admin(user)?;
    }
    find_product(state, product_id).await?;

    let all: Vec<Review> = Reviews::find()
        .filter(reviews::Column::ProductId.eq(product_id))
        .order_by_desc(reviews::Column::CreatedAt)
        .order_by_desc(reviews::Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();

    let average = average_rating(&all);
    let approved_count = all.iter().filter(|r| r.is_approved).count() as i64;
    let items: Vec<Review> = if include_all {
        all
    } else {
        all.into_iter().filter(|r| r.is_approved).collect()
    };

    let meta = Meta::total(items.len() as i64);
    let data = ReviewList {
        items,
        average_rating: average,
        approved_count,
    };
    Ok(ApiResponse::success("Reviews", data, Some(meta)))
}

/// Anyone may review a product customers can see.
pub async fn create_review(
    state: &AppState,
    product_id: i32,
    new_review: NewReview,
) -> AppResult<ApiResponse<Review>> {
    let product = find_product(state, product_id).await?;
    if !is_visible(
        product.approved,
        ProductStatus::from_stored(&product.status),
        Audience::Customer,
    ) {
        return Err(AppError::NotFound("Product"));
    }

    let active = reviews::ActiveModel {
        id: NotSet,
        product_id: Set(product_id),
        customer_name: Set(new_review.customer_name),
        rating: Set(new_review.rating),
        comment: Set(new_review.comment),
        is_approved: Set(false),
        created_at: NotSet,
    };
    let review = Review::from(active.insert(&state.orm).await?);
    tracing::info!(review_id = review.id, product_id, "review submitted");

    Ok(ApiResponse::success(
        "Review submitted for approval",
        review,
        Some(Meta::empty()),
    ))
}

pub async fn approve_review(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<Review>> {
    ensure_admin(user)?;
    let existing = Reviews::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Review"))?;
    if existing.is_approved {
        return Ok(ApiResponse::success("Review approved", Review::from(existing), Some(Meta::empty())));
    }

    let mut active: reviews::ActiveModel = existing.into();
    active.is_approved = Set(true);
    let review = Review::from(active.update(&state.orm).await?);

    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_approve",
        "reviews",
        json!({ "review_id": id, "product_id": review.product_id }),
    )
    .await;

    Ok(ApiResponse::success("Review approved", review, Some(Meta::empty())))
}

pub async fn delete_review(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Reviews::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Review"));
    }
    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_delete",
        "reviews",
        json!({ "review_id": id }),
    )
    .await;
    Ok(ApiResponse::success("Deleted", json!({ "id": id }), Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn review(rating: i32, is_approved: bool) -> Review {
        Review {
            id: rating,
            product_id: 1,
            customer_name: "Ravi".into(),
            rating,
            comment: String::new(),
            is_approved,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn average_ignores_unapproved_reviews() {
        let reviews = [review(5, true), review(4, true), review(1, false)];
        assert_eq!(average_rating(&reviews), Some(4.5));
        assert_eq!(average_rating(&[review(2, false)]), None);
        assert_eq!(average_rating(&[]), None);
    }
}
