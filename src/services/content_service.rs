//! Admin CRUD for categories, ticker offers and banners. No moderation gate:
//! what an admin saves is live.

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::json;

use crate::{
    audit,
    dto::content::{BannerFields, BannerList, CategoryFields, CategoryList, OfferFields, OfferList},
    entity::{
        banners::{self, Entity as Banners},
        categories::{self, Entity as Categories},
        offers::{self, Entity as Offers},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Banner, Category, Offer},
    response::{ApiResponse, Meta},
    state::AppState,
    uploads::UploadedFile,
};

const DEFAULT_BANNER_LINK: &str = "/";

async fn stored_image(state: &AppState, file: Option<UploadedFile>) -> AppResult<Option<String>> {
    match file {
        Some(file) => Ok(Some(state.images.store(file).await?)),
        None => Ok(None),
    }
}

async fn record(state: &AppState, user: &AuthUser, action: &str, resource: &str, id: i32) {
    audit::record(&state.pool, Some(user.user_id), action, resource, json!({ "id": id })).await;
}

// Categories

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items: Vec<Category> = Categories::find()
        .order_by_asc(categories::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("Categories", CategoryList { items }, Some(meta)))
}

/// Names are unique ignoring case and surrounding whitespace, which is how
/// the catalog compares them.
async fn ensure_name_free(state: &AppState, name: &str, except: Option<i32>) -> AppResult<()> {
    let mut finder = Categories::find().filter(
        sea_orm::sea_query::Expr::cust_with_values("LOWER(TRIM(name)) = $1", [name.trim().to_lowercase()]),
    );
    if let Some(id) = except {
        finder = finder.filter(categories::Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(format!("Category '{name}' already exists")));
    }
    Ok(())
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    fields: CategoryFields,
    file: Option<UploadedFile>,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let name = fields
        .name
        .ok_or_else(|| AppError::BadRequest("name is required".into()))?;
    ensure_name_free(state, &name, None).await?;

    let image_url = stored_image(state, file).await?.or(fields.image_url);
    let active = categories::ActiveModel {
        id: NotSet,
        name: Set(name),
        image_url: Set(image_url),
        created_at: NotSet,
    };
    let category = active.insert(&state.orm).await?;
    record(state, user, "category_create", "categories", category.id).await;

    Ok(ApiResponse::success("Category created", Category::from(category), Some(Meta::empty())))
}

/// Renaming does not touch products already filed under the old name.
pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    fields: CategoryFields,
    file: Option<UploadedFile>,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Category"))?;

    let mut active: categories::ActiveModel = existing.into();
    if let Some(name) = fields.name {
        ensure_name_free(state, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(image_url) = stored_image(state, file).await?.or(fields.image_url) {
        active.image_url = Set(Some(image_url));
    }
    if !active.is_changed() {
        return Err(AppError::BadRequest("Nothing to update".into()));
    }
    let category = active.update(&state.orm).await?;
    record(state, user, "category_update", "categories", id).await;

    Ok(ApiResponse::success("Category updated", Category::from(category), Some(Meta::empty())))
}

pub async fn delete_category(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Category"));
    }
    record(state, user, "category_delete", "categories", id).await;
    Ok(ApiResponse::success("Deleted", json!({ "id": id }), Some(Meta::empty())))
}

// Offers

pub async fn list_offers(state: &AppState, active_only: bool) -> AppResult<ApiResponse<OfferList>> {
    let mut finder = Offers::find();
    if active_only {
        finder = finder.filter(offers::Column::IsActive.eq(true));
    }
    let items: Vec<Offer> = finder
        .order_by_asc(offers::Column::CreatedAt)
        .order_by_asc(offers::Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Offer::from)
        .collect();
    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("Offers", OfferList { items }, Some(meta)))
}

pub async fn create_offer(state: &AppState, user: &AuthUser, fields: OfferFields) -> AppResult<ApiResponse<Offer>> {
    ensure_admin(user)?;
    let content = fields
        .content
        .ok_or_else(|| AppError::BadRequest("content is required".into()))?;
    let active = offers::ActiveModel {
        id: NotSet,
        content: Set(content),
        is_active: Set(fields.is_active.unwrap_or(true)),
        user_id: Set(Some(user.user_id)),
        created_at: NotSet,
    };
    let offer = active.insert(&state.orm).await?;
    record(state, user, "offer_create", "offers", offer.id).await;

    Ok(ApiResponse::success("Offer published", Offer::from(offer), Some(Meta::empty())))
}

pub async fn update_offer(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    fields: OfferFields,
) -> AppResult<ApiResponse<Offer>> {
    ensure_admin(user)?;
    let existing = Offers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Offer"))?;

    let mut active: offers::ActiveModel = existing.into();
    if let Some(content) = fields.content {
        active.content = Set(content);
    }
    if let Some(is_active) = fields.is_active {
        active.is_active = Set(is_active);
    }
    if !active.is_changed() {
        return Err(AppError::BadRequest("Nothing to update".into()));
    }
    let offer = active.update(&state.orm).await?;
    record(state, user, "offer_update", "offers", id).await;

    Ok(ApiResponse::success("Offer updated", Offer::from(offer), Some(Meta::empty())))
}

pub async fn delete_offer(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Offers::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Offer"));
    }
    record(state, user, "offer_delete", "offers", id).await;
    Ok(ApiResponse::success("Deleted", json!({ "id": id }), Some(Meta::empty())))
}

// Banners

pub async fn list_banners(state: &AppState) -> AppResult<ApiResponse<BannerList>> {
    let items: Vec<Banner> = Banners::find()
        .order_by_asc(banners::Column::CreatedAt)
        .order_by_asc(banners::Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Banner::from)
        .collect();
    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("Banners", BannerList { items }, Some(meta)))
}

pub async fn create_banner(
    state: &AppState,
    user: &AuthUser,
    fields: BannerFields,
    file: Option<UploadedFile>,
) -> AppResult<ApiResponse<Banner>> {
    ensure_admin(user)?;
    let image = stored_image(state, file)
        .await?
        .or(fields.image)
        .ok_or_else(|| AppError::BadRequest("Image required".into()))?;

    let active = banners::ActiveModel {
        id: NotSet,
        image: Set(image),
        title: Set(fields.title.unwrap_or_default()),
        link: Set(fields.link.unwrap_or_else(|| DEFAULT_BANNER_LINK.to_string())),
        created_at: NotSet,
    };
    let banner = active.insert(&state.orm).await?;
    record(state, user, "banner_create", "banners", banner.id).await;

    Ok(ApiResponse::success("Banner created", Banner::from(banner), Some(Meta::empty())))
}

pub async fn update_banner(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    fields: BannerFields,
    file: Option<UploadedFile>,
) -> AppResult<ApiResponse<Banner>> {
    ensure_admin(user)?;
    let existing = Banners::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Banner"))?;

    let mut active: banners::ActiveModel = existing.into();
    if let Some(image) = stored_image(state, file).await?.or(fields.image) {
        active.image = Set(image);
    }
    if let Some(title) = fields.title {
        active.title = Set(title);
    }
    if let Some(link) = fields.link {
        active.link = Set(link);
    }
    if !active.is_changed() {
        return Err(AppError::BadRequest("Nothing to update".into()));
    }
    let banner = active.update(&state.orm).await?;
    record(state, user, "banner_update", "banners", id).await;

    Ok(ApiResponse::success("Banner updated", Banner::from(banner), Some(Meta::empty())))
}

pub async fn delete_banner(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Banners::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Banner"));
    }
    record(state, user, "banner_delete", "banners", id).await;
    Ok(ApiResponse::success("Deleted", json!({ "id": id }), Some(Meta::empty())))
}
