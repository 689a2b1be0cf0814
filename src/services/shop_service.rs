use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseTransaction,
    DbBackend, EntityTrait, QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};
use serde_json::json;

use crate::{
    audit,
    catalog::{Audience, shop_is_visible},
    dto::shops::{NewShop, ProfileResponse, ProfileUpdate, ShopList, ShopRequest},
    entity::{
        shops::{self, Entity as Shops},
        users::{self, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Shop, User, UserRole},
    moderation::{SHOP_INITIAL_APPROVED, SHOP_INITIAL_VERIFIED},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Advisory-lock namespace serialising shop creation per owner.
const SHOP_OWNER_LOCK: i32 = 7301;

pub async fn list_shops(
    state: &AppState,
    caller: Option<&AuthUser>,
    include_all: bool,
) -> AppResult<ApiResponse<ShopList>> {
    let audience = if include_all {
        let user = caller.ok_or_else(|| AppError::Unauthorized("User identity missing".into()))?;
        ensure_admin(user)?;
        Audience::Admin
    } else {
        Audience::Customer
    };

    let items: Vec<Shop> = Shops::find()
        .order_by_asc(shops::Column::CreatedAt)
        .order_by_asc(shops::Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter(|shop| shop_is_visible(shop.approved, audience))
        .map(Shop::from)
        .collect();

    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("Shops", ShopList { items }, Some(meta)))
}

async fn find_by_owner<C: ConnectionTrait>(conn: &C, owner_id: i32) -> AppResult<Option<shops::Model>> {
    Ok(Shops::find()
        .filter(shops::Column::OwnerId.eq(owner_id))
        .one(conn)
        .await?)
}

pub async fn my_shop(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Option<Shop>>> {
    let shop = find_by_owner(&state.orm, user.user_id).await?.map(Shop::from);
    Ok(ApiResponse::success("Shop", shop, Some(Meta::empty())))
}

/// Public owner lookup. Returns `null` rather than 404 when there is none.
pub async fn shop_by_owner(
    state: &AppState,
    caller: Option<&AuthUser>,
    owner_id: i32,
) -> AppResult<ApiResponse<Option<Shop>>> {
    let privileged = caller.is_some_and(|user| user.is_admin() || user.user_id == owner_id);
    let audience = Audience::from_include_all(privileged);
    let shop = find_by_owner(&state.orm, owner_id)
        .await?
        .filter(|shop| shop_is_visible(shop.approved, audience))
        .map(Shop::from);
    Ok(ApiResponse::success("Shop", shop, Some(Meta::empty())))
}

pub async fn get_shop(
    state: &AppState,
    caller: Option<&AuthUser>,
    id: i32,
) -> AppResult<ApiResponse<Shop>> {
    let shop = Shops::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Shop"))?;

    let privileged = caller.is_some_and(|user| user.is_admin() || user.user_id == shop.owner_id);
    if !shop_is_visible(shop.approved, Audience::from_include_all(privileged)) {
        return Err(AppError::NotFound("Shop"));
    }
    Ok(ApiResponse::success("Shop", Shop::from(shop), None))
}

/// Hold the per-owner creation lock for the rest of `txn`.
async fn lock_owner(txn: &DatabaseTransaction, owner_id: i32) -> AppResult<()> {
    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1, $2)",
        [SHOP_OWNER_LOCK.into(), owner_id.into()],
    ))
    .await?;
    Ok(())
}

async fn insert_shop(txn: &DatabaseTransaction, owner_id: i32, new_shop: NewShop) -> AppResult<shops::Model> {
    let active = shops::ActiveModel {
        id: NotSet,
        owner_id: Set(owner_id),
        name: Set(new_shop.name),
        category: Set(new_shop.category),
        description: Set(new_shop.description),
        address: Set(new_shop.address),
        phone: Set(new_shop.phone),
        mobile: Set(new_shop.mobile),
        contact_number: Set(new_shop.contact_number),
        image: Set(new_shop.image),
        is_featured: Set(false),
        approved: Set(SHOP_INITIAL_APPROVED),
        is_verified: Set(SHOP_INITIAL_VERIFIED),
        created_at: NotSet,
    };
    Ok(active.insert(txn).await?)
}

/// Customers become sellers once they own a shop. Admins keep their role.
async fn promote_to_seller<C: ConnectionTrait>(conn: &C, user_id: i32) -> AppResult<()> {
    Users::update_many()
        .col_expr(
            users::Column::Role,
            sea_orm::sea_query::Expr::value(UserRole::Seller.as_str()),
        )
        .filter(users::Column::Id.eq(user_id))
        .filter(users::Column::Role.eq(UserRole::Customer.as_str()))
        .filter(users::Column::IsAdmin.eq(false))
        .exec(conn)
        .await?;
    Ok(())
}

/// Returns the caller's shop, creating it on the first call. The flag is
/// `true` when a row was inserted. The body is only validated when a shop
/// is actually created, so repeat calls always succeed.
pub async fn create_default_shop(
    state: &AppState,
    user: &AuthUser,
    request: ShopRequest,
) -> AppResult<(ApiResponse<Shop>, bool)> {
    let txn = state.orm.begin().await?;
    lock_owner(&txn, user.user_id).await?;

    if let Some(existing) = find_by_owner(&txn, user.user_id).await? {
        promote_to_seller(&txn, user.user_id).await?;
        txn.commit().await?;
        return Ok((
            ApiResponse::success("Shop already exists", Shop::from(existing), Some(Meta::empty())),
            false,
        ));
    }

    let new_shop = request.validate(false)?;
    let shop = insert_shop(&txn, user.user_id, new_shop).await?;
    promote_to_seller(&txn, user.user_id).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "shop_create",
        "shops",
        json!({ "shop_id": shop.id, "owner_id": shop.owner_id }),
    )
    .await;
    tracing::info!(shop_id = shop.id, owner_id = shop.owner_id, "shop created");

    Ok((
        ApiResponse::success("Shop created", Shop::from(shop), Some(Meta::empty())),
        true,
    ))
}

/// Admin creation for a named owner; a second shop for the same owner is a
/// conflict.
pub async fn create_shop(
    state: &AppState,
    user: &AuthUser,
    new_shop: NewShop,
) -> AppResult<ApiResponse<Shop>> {
    ensure_admin(user)?;
    let owner_id = new_shop
        .owner_id
        .ok_or_else(|| AppError::BadRequest("ownerId is required".into()))?;

    Users::find_by_id(owner_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let txn = state.orm.begin().await?;
    lock_owner(&txn, owner_id).await?;
    if find_by_owner(&txn, owner_id).await?.is_some() {
        return Err(AppError::Conflict("This owner already has a shop".into()));
    }
    let shop = insert_shop(&txn, owner_id, new_shop).await?;
    promote_to_seller(&txn, owner_id).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "shop_create",
        "shops",
        json!({ "shop_id": shop.id, "owner_id": owner_id }),
    )
    .await;

    Ok(ApiResponse::success("Shop created", Shop::from(shop), Some(Meta::empty())))
}

/// Verification is one-way; verifying twice is a no-op.
pub async fn verify_shop(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<Shop>> {
    ensure_admin(user)?;
    let existing = Shops::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Shop"))?;

    if existing.is_verified {
        return Ok(ApiResponse::success("Shop verified", Shop::from(existing), Some(Meta::empty())));
    }

    let mut active: shops::ActiveModel = existing.into();
    active.is_verified = Set(true);
    let shop = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "shop_verify",
        "shops",
        json!({ "shop_id": id }),
    )
    .await;

    Ok(ApiResponse::success("Shop verified", Shop::from(shop), Some(Meta::empty())))
}

/// Save the partner profile on the user and mirror it onto their shop.
pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    update: ProfileUpdate,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let txn = state.orm.begin().await?;

    let mut active_user: users::ActiveModel = existing.into();
    if let Some(shop_name) = update.shop_name.clone() {
        active_user.shop_name = Set(Some(shop_name));
    }
    if let Some(shop_address) = update.shop_address.clone() {
        active_user.shop_address = Set(Some(shop_address));
    }
    if let Some(maps_link) = update.maps_link {
        active_user.maps_link = Set(Some(maps_link));
    }
    let saved_user = if active_user.is_changed() {
        active_user.update(&txn).await?
    } else {
        Users::find_by_id(user.user_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound("User"))?
    };

    let shop = match find_by_owner(&txn, user.user_id).await? {
        Some(shop) => {
            let phone_missing = shop.phone.trim().is_empty();
            let mobile_missing = shop.mobile.trim().is_empty();
            let mut active_shop: shops::ActiveModel = shop.into();
            if let Some(name) = update.shop_name {
                active_shop.name = Set(name);
            }
            if let Some(address) = update.shop_address {
                active_shop.address = Set(Some(address));
            }
            if let Some(contact) = update.contact_number {
                if phone_missing {
                    active_shop.phone = Set(contact.clone());
                }
                if mobile_missing {
                    active_shop.mobile = Set(contact.clone());
                }
                active_shop.contact_number = Set(Some(contact));
            }
            if active_shop.is_changed() {
                Some(active_shop.update(&txn).await?)
            } else {
                find_by_owner(&txn, user.user_id).await?
            }
        }
        None => None,
    };

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "profile_update",
        "users",
        json!({ "user_id": user.user_id, "shop_id": shop.as_ref().map(|s| s.id) }),
    )
    .await;

    let data = ProfileResponse {
        user: User::from(saved_user),
        shop: shop.map(Shop::from),
    };
    Ok(ApiResponse::success("Profile updated", data, Some(Meta::empty())))
}
