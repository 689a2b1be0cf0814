#![allow(dead_code)]

use std::time::Duration;

use bazaar_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::auth::RegisterRequest,
    middleware::auth::AuthUser,
    models::UserRole,
    services::auth_service,
    state::AppState,
};

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        upload_dir: std::env::temp_dir().join("bazaar-api-tests"),
        upload_url_prefix: "/uploads".into(),
        max_upload_bytes: 1024 * 1024,
        max_upload_files: 3,
        db_connect_retries: 0,
        db_retry_delay: Duration::from_millis(10),
        db_max_connections: 5,
        cors_origins: vec!["*".into()],
        allow_cleanup: false,
    }
}

/// Connects to `TEST_DATABASE_URL` (or `DATABASE_URL`) and applies
/// migrations. `None` means the DB-backed tests should be skipped.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            return Ok(None);
        }
    };

    let config = test_config(&database_url);
    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;
    Ok(Some(AppState::new(pool, config)))
}

pub fn unique(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &id[..12])
}

/// Registers a fresh account and gives it `role`.
pub async fn create_user(state: &AppState, role: UserRole) -> anyhow::Result<AuthUser> {
    let resp = auth_service::register_user(
        state,
        RegisterRequest {
            username: unique(role.as_str()),
            password: "secret123".into(),
        },
    )
    .await?;
    let user = resp.data.expect("registered user");

    sqlx::query("UPDATE users SET role = $1, is_admin = $2 WHERE id = $3")
        .bind(role.as_str())
        .bind(role == UserRole::Admin)
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}
