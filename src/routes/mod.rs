use axum::{Router, routing::get};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod content;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;
pub mod shops;
pub mod upload;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .route("/health", get(health::health_check))
        .nest("/products", products::router())
        .nest("/reviews", reviews::router())
        .nest("/shops", shops::router())
        .nest("/partner", shops::partner_router())
        .nest("/user", shops::user_router())
        .nest("/categories", content::categories_router())
        .nest("/offers", content::offers_router())
        .nest("/banners", content::banners_router())
        .nest("/orders", orders::router())
        .nest("/cart", cart::router())
        .nest("/admin", admin::router())
        .nest("/upload", upload::router())
}
