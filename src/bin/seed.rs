use bazaar_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    models::{ProductStatus, UserRole},
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "admin", "admin123", UserRole::Admin).await?;
    let seller_id = ensure_user(&pool, "demo_seller", "seller123", UserRole::Seller).await?;
    let shop_id = ensure_shop(&pool, seller_id).await?;
    seed_products(&pool, shop_id, seller_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, Seller ID: {seller_id}, Shop ID: {shop_id}");
    pool.close().await;
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<i32> {
    let password_hash = hash_password(password)?;
    let is_admin = role == UserRole::Admin;

    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO users (username, password_hash, role, is_admin)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role, is_admin = EXCLUDED.is_admin
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(is_admin)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {username} (role={})", role.as_str());
    Ok(id)
}

async fn ensure_shop(pool: &sqlx::PgPool, owner_id: i32) -> anyhow::Result<i32> {
    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM shops WHERE owner_id = $1 ORDER BY id LIMIT 1")
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO shops (owner_id, name, category, description, address, phone, mobile, contact_number, approved, is_verified)
        VALUES ($1, 'Corner Grocery', 'Groceries', 'Fresh produce every morning', 'Main Bazaar Road', '0300000000', '0300000000', '0300000000', TRUE, TRUE)
        RETURNING id
        "#,
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;

    println!("Created demo shop {id}");
    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool, shop_id: i32, seller_id: i32) -> anyhow::Result<()> {
    let products = [
        ("Basmati Rice 5kg", "Groceries", "1450", "Long grain, aged one year"),
        ("Fresh Milk 1L", "Groceries", "220", "Delivered daily from local farms"),
        ("Cotton Kurta", "Clothing", "2500", "Hand-stitched, sizes S to XL"),
        ("Steel Water Bottle", "Household", "899.50", "Keeps water cold for 12 hours"),
    ];

    for (name, category, price, description) in products {
        sqlx::query(
            r#"
            INSERT INTO categories (name) VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(category)
        .execute(pool)
        .await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM products WHERE shop_id = $1 AND name = $2)",
        )
        .bind(shop_id)
        .bind(name)
        .fetch_one(pool)
        .await?;
        if exists {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO products (shop_id, seller_id, name, price, category, description, approved, status)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
            "#,
        )
        .bind(shop_id)
        .bind(seller_id)
        .bind(name)
        .bind(price)
        .bind(category)
        .bind(description)
        .bind(ProductStatus::Approved.as_str())
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
