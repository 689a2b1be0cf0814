use anyhow::Result;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;

pub type DbPool = sqlx::PgPool;
pub type OrmConn = DatabaseConnection;

/// Connect the sqlx pool, probing it with `SELECT 1`.
///
/// Only this initial probe is retried (`db_connect_retries` extra attempts,
/// `db_retry_delay` apart). Business queries are never retried.
pub async fn create_pool(config: &AppConfig) -> Result<DbPool> {
    let attempts = config.db_connect_retries + 1;
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = async {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(&config.database_url)
                .await?;
            ping(&pool).await?;
            Ok::<_, sqlx::Error>(pool)
        }
        .await;

        match result {
            Ok(pool) => {
                tracing::info!(attempt, "database connection verified");
                return Ok(pool);
            }
            Err(err) if attempt < attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    error = %err,
                    "database probe failed, retrying in {}ms",
                    config.db_retry_delay.as_millis()
                );
                tokio::time::sleep(config.db_retry_delay).await;
            }
            Err(err) => {
                tracing::error!(error = %err, "database probe failed after retries");
                return Err(err.into());
            }
        }
    }
}

/// Build a pool that connects on first use. Used by tests and tooling that
/// must not block on the database.
pub fn create_lazy_pool(database_url: &str) -> Result<DbPool> {
    Ok(PgPoolOptions::new().connect_lazy(database_url)?)
}

/// SeaORM connection sharing the sqlx pool.
pub fn create_orm_conn(pool: &DbPool) -> OrmConn {
    SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone())
}

pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
