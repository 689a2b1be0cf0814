use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    Seller,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Seller => "seller",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_stored(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => UserRole::Admin,
            "seller" | "partner" => UserRole::Seller,
            _ => UserRole::Customer,
        }
    }
}

/// Product lifecycle status.
///
/// Stored as text. Legacy synonyms are folded here and nowhere else:
///
/// | stored value                        | variant      |
/// |-------------------------------------|--------------|
/// | `pending`                           | `Pending`    |
/// | `approved`, `available`, `live`     | `Approved`   |
/// | `out_of_stock`, `out-of-stock`      | `OutOfStock` |
/// | `deleted`                           | `Deleted`    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Pending,
    Approved,
    OutOfStock,
    Deleted,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Pending => "pending",
            ProductStatus::Approved => "approved",
            ProductStatus::OutOfStock => "out_of_stock",
            ProductStatus::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ProductStatus::Pending),
            "approved" | "available" | "live" => Some(ProductStatus::Approved),
            "out_of_stock" | "out-of-stock" => Some(ProductStatus::OutOfStock),
            "deleted" => Some(ProductStatus::Deleted),
            _ => None,
        }
    }

    /// Rows written before the mapping existed may hold anything; an
    /// unrecognised value is treated as not yet moderated.
    pub fn from_stored(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            tracing::warn!(status = %value, "unknown stored product status, treating as pending");
            ProductStatus::Pending
        })
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order status. Any status may follow any other; only the vocabulary is
/// closed. `completed` folds into `Delivered`, `canceled` into `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PaymentPendingVerification,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PaymentPendingVerification => "payment_pending_verification",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "payment_pending_verification" => Some(OrderStatus::PaymentPendingVerification),
            "confirmed" => Some(OrderStatus::Confirmed),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" | "completed" => Some(OrderStatus::Delivered),
            "cancelled" | "canceled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn from_stored(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            tracing::warn!(status = %value, "unknown stored order status, treating as pending");
            OrderStatus::Pending
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cod,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Upi => "upi",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cod" | "cash" => Some(PaymentMethod::Cod),
            "upi" => Some(PaymentMethod::Upi),
            _ => None,
        }
    }

    /// UPI payments are confirmed by hand, so they start unverified.
    pub fn initial_status(&self) -> OrderStatus {
        match self {
            PaymentMethod::Cod => OrderStatus::Pending,
            PaymentMethod::Upi => OrderStatus::PaymentPendingVerification,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: UserRole,
    pub is_admin: bool,
    pub shop_name: Option<String>,
    pub shop_address: Option<String>,
    pub maps_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::users::Model> for User {
    fn from(model: entity::users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: UserRole::from_stored(&model.role),
            is_admin: model.is_admin,
            shop_name: model.shop_name,
            shop_address: model.shop_address,
            maps_link: model.maps_link,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: String,
    pub mobile: String,
    pub contact_number: Option<String>,
    pub image: Option<String>,
    pub is_featured: bool,
    pub approved: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<entity::shops::Model> for Shop {
    fn from(model: entity::shops::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            category: model.category,
            description: model.description,
            address: model.address,
            phone: model.phone,
            mobile: model.mobile,
            contact_number: model.contact_number,
            image: model.image,
            is_featured: model.is_featured,
            approved: model.approved,
            is_verified: model.is_verified,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub shop_id: i32,
    pub seller_id: i32,
    pub name: String,
    pub price: String,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub category: String,
    pub description: Option<String>,
    pub approved: bool,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

impl From<entity::products::Model> for Product {
    fn from(model: entity::products::Model) -> Self {
        Self {
            id: model.id,
            shop_id: model.shop_id,
            seller_id: model.seller_id,
            name: model.name,
            price: model.price,
            image_url: model.image_url,
            images: images_from_json(model.images),
            category: model.category,
            description: model.description,
            approved: model.approved,
            status: ProductStatus::from_stored(&model.status),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

pub fn images_from_json(value: serde_json::Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

/// A product joined with its seller's shop-profile and the shop's contact
/// numbers; the shape every catalog listing returns.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub product: Product,
    pub shop_name: Option<String>,
    pub shop_address: Option<String>,
    pub contact_number: Option<String>,
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::categories::Model> for Category {
    fn from(model: entity::categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            image_url: model.image_url,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: i32,
    pub content: String,
    pub is_active: bool,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::offers::Model> for Offer {
    fn from(model: entity::offers::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            is_active: model.is_active,
            user_id: model.user_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: i32,
    pub image: String,
    pub title: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

impl From<entity::banners::Model> for Banner {
    fn from(model: entity::banners::Model) -> Self {
        Self {
            id: model.id,
            image: model.image,
            title: model.title,
            link: model.link,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub product_id: i32,
    pub shop_id: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub quantity: i32,
    pub total_price: String,
    pub status: OrderStatus,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entity::orders::Model> for Order {
    fn from(model: entity::orders::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            shop_id: model.shop_id,
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            customer_address: model.customer_address,
            quantity: model.quantity,
            total_price: model.total_price,
            status: OrderStatus::from_stored(&model.status),
            payment_method: model.payment_method.as_deref().and_then(PaymentMethod::parse),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i32,
    pub product_id: i32,
    pub customer_name: String,
    pub rating: i32,
    pub comment: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<entity::reviews::Model> for Review {
    fn from(model: entity::reviews::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            customer_name: model.customer_name,
            rating: model.rating,
            comment: model.comment,
            is_approved: model.is_approved,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: i32,
    pub product_id: i32,
    pub user_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<entity::cart_items::Model> for CartItem {
    fn from(model: entity::cart_items::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_live_tokens_fold_into_approved() {
        assert_eq!(ProductStatus::parse("available"), Some(ProductStatus::Approved));
        assert_eq!(ProductStatus::parse(" Approved "), Some(ProductStatus::Approved));
        assert_eq!(ProductStatus::parse("OUT-OF-STOCK"), Some(ProductStatus::OutOfStock));
        assert_eq!(ProductStatus::parse("archived"), None);
    }

    #[test]
    fn unknown_stored_product_status_is_pending() {
        assert_eq!(ProductStatus::from_stored("mystery"), ProductStatus::Pending);
        assert_eq!(ProductStatus::from_stored("deleted"), ProductStatus::Deleted);
    }

    #[test]
    fn product_status_serializes_canonical_token() {
        let json = serde_json::to_string(&ProductStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"out_of_stock\"");
        assert_eq!(ProductStatus::Approved.to_string(), "approved");
    }

    #[test]
    fn order_status_synonyms() {
        assert_eq!(OrderStatus::parse("completed"), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::parse("canceled"), Some(OrderStatus::Cancelled));
        assert_eq!(
            OrderStatus::parse("payment_pending_verification"),
            Some(OrderStatus::PaymentPendingVerification)
        );
        assert_eq!(OrderStatus::parse("teleported"), None);
    }

    #[test]
    fn upi_orders_start_unverified() {
        assert_eq!(PaymentMethod::Upi.initial_status(), OrderStatus::PaymentPendingVerification);
        assert_eq!(PaymentMethod::Cod.initial_status(), OrderStatus::Pending);
        assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cod));
    }

    #[test]
    fn user_role_defaults_to_customer() {
        assert_eq!(UserRole::from_stored("seller"), UserRole::Seller);
        assert_eq!(UserRole::from_stored(""), UserRole::Customer);
    }
}
