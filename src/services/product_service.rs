use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    Set, TransactionTrait, sea_query::Expr,
};
use serde_json::json;
use sqlx::{FromRow, Postgres, QueryBuilder};

use crate::{
    audit,
    catalog::{Audience, is_visible},
    db::DbPool,
    dto::products::{NewProduct, ProductEdit, ProductList},
    entity::{
        products::{self, Entity as Products},
        shops::{self, Entity as Shops},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_owner_or_admin},
    models::{CatalogEntry, Product, ProductStatus, images_from_json},
    moderation::{ProductState, Transition},
    response::{ApiResponse, Meta},
    routes::params::CatalogRequest,
    state::AppState,
    uploads::UploadedFile,
};

const CATALOG_SELECT: &str = r#"
    SELECT p.id, p.shop_id, p.seller_id, p.name, p.price, p.image_url, p.images,
           p.category, p.description, p.approved, p.status, p.created_at,
           COALESCE(u.shop_name, s.name) AS shop_name,
           COALESCE(u.shop_address, s.address) AS shop_address,
           s.contact_number, s.mobile
    FROM products p
    LEFT JOIN users u ON u.id = p.seller_id
    LEFT JOIN shops s ON s.id = p.shop_id
    WHERE TRUE"#;

#[derive(Debug, FromRow)]
struct CatalogRow {
    id: i32,
    shop_id: i32,
    seller_id: i32,
    name: String,
    price: String,
    image_url: Option<String>,
    images: serde_json::Value,
    category: String,
    description: Option<String>,
    approved: bool,
    status: String,
    created_at: DateTime<Utc>,
    shop_name: Option<String>,
    shop_address: Option<String>,
    contact_number: Option<String>,
    mobile: Option<String>,
}

impl From<CatalogRow> for CatalogEntry {
    fn from(row: CatalogRow) -> Self {
        Self {
            product: Product {
                id: row.id,
                shop_id: row.shop_id,
                seller_id: row.seller_id,
                name: row.name,
                price: row.price,
                image_url: row.image_url,
                images: images_from_json(row.images),
                category: row.category,
                description: row.description,
                approved: row.approved,
                status: ProductStatus::from_stored(&row.status),
                created_at: row.created_at,
            },
            shop_name: row.shop_name,
            shop_address: row.shop_address,
            contact_number: row.contact_number,
            mobile: row.mobile,
        }
    }
}

/// Store-side narrowing applied before the catalog engine runs. Only
/// predicates the engine would apply anyway belong here.
#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogSource<'a> {
    pub shop_id: Option<i32>,
    pub approved: Option<bool>,
    pub ids: Option<&'a [i32]>,
}

/// Joined product rows in canonical order: `created_at ASC, id ASC`.
pub async fn load_catalog(pool: &DbPool, source: CatalogSource<'_>) -> AppResult<Vec<CatalogEntry>> {
    let mut qb = QueryBuilder::<Postgres>::new(CATALOG_SELECT);
    if let Some(shop_id) = source.shop_id {
        qb.push(" AND p.shop_id = ").push_bind(shop_id);
    }
    if let Some(approved) = source.approved {
        qb.push(" AND p.approved = ").push_bind(approved);
    }
    if let Some(ids) = source.ids {
        qb.push(" AND p.id = ANY(").push_bind(ids.to_vec()).push(")");
    }
    qb.push(" ORDER BY p.created_at ASC, p.id ASC");

    let rows = qb.build_query_as::<CatalogRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(CatalogEntry::from).collect())
}

/// Managed category names plus every category a product was filed under.
async fn known_categories(pool: &DbPool) -> AppResult<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT name FROM categories UNION SELECT DISTINCT category FROM products",
    )
    .fetch_all(pool)
    .await?;
    Ok(names)
}

async fn owns_shop(state: &AppState, user_id: i32, shop_id: i32) -> AppResult<bool> {
    let shop = Shops::find_by_id(shop_id).one(&state.orm).await?;
    Ok(shop.is_some_and(|shop| shop.owner_id == user_id))
}

/// Admins manage everything; sellers manage products in their shop or
/// products they submitted.
async fn can_manage(state: &AppState, user: &AuthUser, shop_id: i32, seller_id: i32) -> AppResult<bool> {
    if user.is_admin() || user.user_id == seller_id {
        return Ok(true);
    }
    owns_shop(state, user.user_id, shop_id).await
}

async fn ensure_can_manage(state: &AppState, user: &AuthUser, product: &products::Model) -> AppResult<()> {
    if can_manage(state, user, product.shop_id, product.seller_id).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// `includeAll` unlocks the unfiltered view for admins, and for a seller
/// looking at their own shop.
async fn resolve_audience(
    state: &AppState,
    caller: Option<&AuthUser>,
    include_all: bool,
    shop_id: Option<i32>,
) -> AppResult<Audience> {
    if !include_all {
        return Ok(Audience::Customer);
    }
    let user = caller.ok_or_else(|| AppError::Unauthorized("User identity missing".into()))?;
    if user.is_admin() {
        return Ok(Audience::Admin);
    }
    match shop_id {
        Some(shop_id) if owns_shop(state, user.user_id, shop_id).await? => Ok(Audience::Admin),
        _ => Err(AppError::Forbidden),
    }
}

pub async fn find_product(state: &AppState, id: i32) -> AppResult<products::Model> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Product"))
}

pub async fn list_products(
    state: &AppState,
    caller: Option<&AuthUser>,
    request: CatalogRequest,
) -> AppResult<ApiResponse<ProductList>> {
    let audience = resolve_audience(state, caller, request.include_all, request.shop_id).await?;
    let query = request.query(audience);

    let source = CatalogSource {
        shop_id: query.shop_id,
        approved: query.effective_approved(),
        ids: None,
    };
    let rows = load_catalog(&state.pool, source).await?;
    let known = known_categories(&state.pool).await?;
    let items = query.apply(rows, &known);
    let (items, meta) = request.pagination.slice(items);

    tracing::debug!(?audience, count = items.len(), "catalog listing");
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

/// A product customers cannot see reads as missing, except to the people
/// who manage it.
pub async fn get_product(
    state: &AppState,
    caller: Option<&AuthUser>,
    id: i32,
) -> AppResult<ApiResponse<CatalogEntry>> {
    let ids = [id];
    let source = CatalogSource {
        ids: Some(&ids),
        ..Default::default()
    };
    let entry = load_catalog(&state.pool, source)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::NotFound("Product"))?;

    let product = &entry.product;
    if !is_visible(product.approved, product.status, Audience::Customer) {
        let allowed = match caller {
            Some(user) => can_manage(state, user, product.shop_id, product.seller_id).await?,
            None => false,
        };
        if !allowed {
            return Err(AppError::NotFound("Product"));
        }
    }

    Ok(ApiResponse::success("Product", entry, None))
}

async fn target_shop(state: &AppState, user: &AuthUser, shop_id: Option<i32>) -> AppResult<shops::Model> {
    match shop_id {
        Some(shop_id) => {
            let shop = Shops::find_by_id(shop_id)
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound("Shop"))?;
            ensure_owner_or_admin(user, shop.owner_id)?;
            Ok(shop)
        }
        None => Shops::find()
            .filter(shops::Column::OwnerId.eq(user.user_id))
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::BadRequest("Create a shop before adding products".into())),
    }
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    new_product: NewProduct,
    file: Option<UploadedFile>,
) -> AppResult<ApiResponse<Product>> {
    let shop = target_shop(state, user, new_product.shop_id).await?;

    let mut images = new_product.images;
    let mut image_url = new_product.image_url;
    if let Some(file) = file {
        let url = state.images.store(file).await?;
        images.insert(0, url.clone());
        image_url = Some(url);
    }

    let initial = ProductState::initial();
    let active = products::ActiveModel {
        id: NotSet,
        shop_id: Set(shop.id),
        seller_id: Set(user.user_id),
        name: Set(new_product.name),
        price: Set(new_product.price),
        image_url: Set(image_url),
        images: Set(json!(images)),
        category: Set(new_product.category),
        description: Set(new_product.description),
        approved: Set(initial.approved),
        status: Set(initial.status.as_str().to_string()),
        created_at: NotSet,
    };
    let product = Product::from(active.insert(&state.orm).await?);

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        json!({ "product_id": product.id, "shop_id": product.shop_id }),
    )
    .await;
    tracing::info!(product_id = product.id, shop_id = product.shop_id, "product submitted for review");

    Ok(ApiResponse::success(
        "Product submitted for approval",
        product,
        Some(Meta::empty()),
    ))
}

/// Field edits never touch `approved`/`status`; a legacy `status` in the
/// body goes through the state machine like any other transition. The
/// transition is checked before anything is written, and the field edit
/// and the state change commit together.
///
/// A new cover image becomes `image_url` and is put at the front of the
/// `images` gallery.
pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    mut edit: ProductEdit,
    file: Option<UploadedFile>,
) -> AppResult<ApiResponse<Product>> {
    let existing = find_product(state, id).await?;
    ensure_can_manage(state, user, &existing).await?;

    let planned = match edit.transition {
        Some(transition) => Some(plan_transition(&existing, transition)?),
        None => None,
    };

    if let Some(file) = file {
        edit.image_url = Some(state.images.store(file).await?);
    }

    let txn = state.orm.begin().await?;
    let mut product = existing;
    let fields_changed = edit.has_field_changes();
    if fields_changed {
        let mut images = images_from_json(product.images.clone());
        let mut active: products::ActiveModel = product.into();
        if let Some(name) = edit.name {
            active.name = Set(name);
        }
        if let Some(price) = edit.price {
            active.price = Set(price);
        }
        if let Some(category) = edit.category {
            active.category = Set(category);
        }
        if let Some(description) = edit.description {
            active.description = Set(Some(description));
        }
        if let Some(image_url) = edit.image_url {
            if !images.contains(&image_url) {
                images.insert(0, image_url.clone());
                active.images = Set(json!(images));
            }
            active.image_url = Set(Some(image_url));
        }
        product = active.update(&txn).await?;
    }

    let mut moved = None;
    if let Some(plan) = planned {
        let (updated, changed) = write_transition(&txn, product, plan).await?;
        product = updated;
        if changed {
            moved = Some(plan);
        }
    }
    txn.commit().await?;

    if fields_changed {
        audit::record(
            &state.pool,
            Some(user.user_id),
            "product_update",
            "products",
            json!({ "product_id": id }),
        )
        .await;
    }
    if let Some(plan) = moved {
        record_transition(state, user, id, plan).await;
    }

    Ok(ApiResponse::success("Updated", Product::from(product), Some(Meta::empty())))
}

/// A transition checked against the row it will be written over.
#[derive(Debug, Clone, Copy)]
struct PlannedTransition {
    transition: Transition,
    current: ProductState,
    next: ProductState,
}

fn plan_transition(existing: &products::Model, transition: Transition) -> AppResult<PlannedTransition> {
    let current = ProductState::new(existing.approved, ProductStatus::from_stored(&existing.status));
    let next = current
        .apply(transition)
        .map_err(|err| AppError::Conflict(err.to_string()))?;
    Ok(PlannedTransition {
        transition,
        current,
        next,
    })
}

/// Write a planned transition as a compare-and-set on the stored
/// `(approved, status)` pair. If another request changed the row in
/// between, the write is refused unless the row already holds the target
/// state. Returns the row and whether this call changed it.
async fn write_transition<C: ConnectionTrait>(
    conn: &C,
    existing: products::Model,
    plan: PlannedTransition,
) -> AppResult<(products::Model, bool)> {
    let next = plan.next;

    // Already there, and stored in canonical form.
    if next == plan.current && existing.status == next.status.as_str() {
        return Ok((existing, false));
    }

    let result = Products::update_many()
        .col_expr(products::Column::Approved, Expr::value(next.approved))
        .col_expr(products::Column::Status, Expr::value(next.status.as_str()))
        .filter(products::Column::Id.eq(existing.id))
        .filter(products::Column::Approved.eq(existing.approved))
        .filter(products::Column::Status.eq(existing.status.as_str()))
        .exec(conn)
        .await?;

    let updated = Products::find_by_id(existing.id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    if result.rows_affected == 0 {
        let now = ProductState::new(updated.approved, ProductStatus::from_stored(&updated.status));
        if now != next {
            tracing::warn!(
                product_id = existing.id,
                action = plan.transition.action(),
                "stale moderation write rejected"
            );
            return Err(AppError::Conflict(
                "Product was changed by another request, reload and retry".into(),
            ));
        }
        return Ok((updated, false));
    }
    Ok((updated, true))
}

async fn record_transition(state: &AppState, actor: &AuthUser, product_id: i32, plan: PlannedTransition) {
    audit::record(
        &state.pool,
        Some(actor.user_id),
        plan.transition.action(),
        "products",
        json!({
            "product_id": product_id,
            "from": plan.current.status,
            "to": plan.next.status,
            "approved": plan.next.approved,
        }),
    )
    .await;
    tracing::info!(
        product_id,
        from = %plan.current.status,
        to = %plan.next.status,
        "product moderated"
    );
}

async fn apply_transition(
    state: &AppState,
    actor: &AuthUser,
    existing: products::Model,
    transition: Transition,
) -> AppResult<products::Model> {
    let id = existing.id;
    let plan = plan_transition(&existing, transition)?;
    let (product, changed) = write_transition(&state.orm, existing, plan).await?;
    if changed {
        record_transition(state, actor, id, plan).await;
    }
    Ok(product)
}

pub async fn approve_product(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = find_product(state, id).await?;
    let product = apply_transition(state, user, existing, Transition::Approve).await?;
    Ok(ApiResponse::success("Product approved", Product::from(product), Some(Meta::empty())))
}

pub async fn toggle_stock(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<Product>> {
    let existing = find_product(state, id).await?;
    ensure_can_manage(state, user, &existing).await?;
    let product = apply_transition(state, user, existing, Transition::ToggleStock).await?;
    Ok(ApiResponse::success("Stock updated", Product::from(product), Some(Meta::empty())))
}

pub async fn delete_product(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<Product>> {
    let existing = find_product(state, id).await?;
    ensure_can_manage(state, user, &existing).await?;
    let product = apply_transition(state, user, existing, Transition::SoftDelete).await?;
    Ok(ApiResponse::success("Deleted", Product::from(product), Some(Meta::empty())))
}
