use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn},
    uploads::{ImageStore, LocalDiskStore},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub images: Arc<dyn ImageStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the state around an already-connected pool, using local disk
    /// for image uploads.
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        let images = Arc::new(LocalDiskStore::new(
            config.upload_dir.clone(),
            config.upload_url_prefix.clone(),
            config.max_upload_bytes,
        ));
        Self::with_images(pool, config, images)
    }

    pub fn with_images(pool: DbPool, config: AppConfig, images: Arc<dyn ImageStore>) -> Self {
        let orm = create_orm_conn(&pool);
        Self {
            pool,
            orm,
            images,
            config: Arc::new(config),
        }
    }

    /// Drain the pool. The ORM connection shares it, so one close covers both.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}
