use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{CleanupSummary, StatsResponse},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartLine, CartList},
        content::{
            BannerList, BannerRequest, CategoryList, CategoryRequest, OfferList, OfferRequest,
            UploadResponse,
        },
        orders::{CreateOrderRequest, OrderList, UpdateOrderStatusRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        reviews::{CreateReviewRequest, ReviewList},
        shops::{ProfileResponse, ProfileUpdateRequest, ShopList, ShopRequest},
    },
    models::{
        Banner, CartItem, CatalogEntry, Category, Offer, Order, OrderStatus, PaymentMethod,
        Product, ProductStatus, Review, Shop, User, UserRole,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, content, health, orders, products, reviews, shops, upload},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::approve_product,
        products::toggle_stock,
        products::delete_product,
        products::list_reviews,
        products::create_review,
        reviews::approve_review,
        reviews::delete_review,
        shops::list_shops,
        shops::my_shop,
        shops::get_shop,
        shops::create_shop,
        shops::verify_shop,
        shops::shop_by_owner,
        shops::create_default_shop,
        shops::update_profile,
        content::list_categories,
        content::create_category,
        content::update_category,
        content::delete_category,
        content::list_offers,
        content::create_offer,
        content::update_offer,
        content::delete_offer,
        content::list_banners,
        content::create_banner,
        content::update_banner,
        content::delete_banner,
        orders::create_order,
        orders::list_orders,
        orders::update_order_status,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        admin::stats,
        admin::cleanup,
        upload::upload_images
    ),
    components(
        schemas(
            User,
            UserRole,
            Shop,
            Product,
            ProductStatus,
            CatalogEntry,
            Category,
            Offer,
            Banner,
            Order,
            OrderStatus,
            PaymentMethod,
            Review,
            CartItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            ShopRequest,
            ShopList,
            ProfileUpdateRequest,
            ProfileResponse,
            CategoryRequest,
            CategoryList,
            OfferRequest,
            OfferList,
            BannerRequest,
            BannerList,
            UploadResponse,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderList,
            CreateReviewRequest,
            ReviewList,
            AddToCartRequest,
            CartLine,
            CartList,
            StatsResponse,
            CleanupSummary,
            Meta,
            ApiResponse<ProductList>,
            ApiResponse<OrderList>,
            ApiResponse<CartList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Products", description = "Catalog and seller product management"),
        (name = "Moderation", description = "Product approval and soft-delete"),
        (name = "Reviews", description = "Product reviews behind an approval gate"),
        (name = "Shops", description = "Shop lookup and admin shop management"),
        (name = "Partner", description = "Seller dashboard shop and profile"),
        (name = "Content", description = "Categories, offers and banners"),
        (name = "Orders", description = "Order intake and fulfilment"),
        (name = "Cart", description = "Per-user cart"),
        (name = "Admin", description = "Admin dashboard"),
        (name = "Uploads", description = "Image uploads"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_router_path_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/products",
            "/api/products/{id}/approve",
            "/api/partner/shop/create-default",
            "/api/orders/{id}",
            "/api/admin/cleanup",
            "/api/upload",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
