use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{opt_string_or_number, optional_text, required_text, validate_price};
use crate::{
    error::{AppError, AppResult},
    middleware::extract::parse_id,
    models::{Order, OrderStatus, PaymentMethod},
};

/// Body of `POST /orders`. The customer fields are stored as a snapshot;
/// a client-sent `status` is ignored and derived from the payment method.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[schema(value_type = i32)]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[schema(value_type = i32)]
    pub shop_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[schema(value_type = Option<i32>)]
    pub quantity: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[schema(value_type = String)]
    pub total_price: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub product_id: i32,
    pub shop_id: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub quantity: i32,
    pub total_price: String,
    pub payment_method: PaymentMethod,
}

impl NewOrder {
    pub fn status(&self) -> OrderStatus {
        self.payment_method.initial_status()
    }
}

fn required_id(field: &str, raw: Option<String>) -> AppResult<i32> {
    let raw = required_text(field, raw)?;
    parse_id(&raw).map_err(|_| AppError::BadRequest(format!("{field} must be a positive integer")))
}

impl CreateOrderRequest {
    pub fn validate(self) -> AppResult<NewOrder> {
        let product_id = required_id("productId", self.product_id)?;
        let shop_id = required_id("shopId", self.shop_id)?;
        let customer_name = required_text("customerName", self.customer_name)?;
        let customer_phone = required_text("customerPhone", self.customer_phone)?;
        let customer_address = required_text("customerAddress", self.customer_address)?;

        let quantity = match optional_text(self.quantity) {
            Some(raw) => raw
                .parse::<i32>()
                .ok()
                .filter(|q| *q >= 1)
                .ok_or_else(|| AppError::BadRequest("quantity must be at least 1".into()))?,
            None => 1,
        };

        let total_price = required_text("totalPrice", self.total_price)?;
        let total_price = validate_price("totalPrice", &total_price)?;

        let payment_method = match optional_text(self.payment_method) {
            Some(raw) => PaymentMethod::parse(&raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown payment method '{raw}'")))?,
            None => PaymentMethod::Cod,
        };

        Ok(NewOrder {
            product_id,
            shop_id,
            customer_name,
            customer_phone,
            customer_address,
            quantity,
            total_price,
            payment_method,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

impl UpdateOrderStatusRequest {
    pub fn validate(self) -> AppResult<OrderStatus> {
        OrderStatus::parse(&self.status)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown order status '{}'", self.status)))
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(extra: serde_json::Value) -> CreateOrderRequest {
        let mut base = serde_json::json!({
            "productId": 3,
            "shopId": "1",
            "customerName": "Asha",
            "customerPhone": "9000000001",
            "customerAddress": "Ward 4",
            "totalPrice": 200,
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn defaults_to_cash_and_single_quantity() {
        let order = body(serde_json::json!({ "status": "delivered" })).validate().unwrap();
        assert_eq!(order.quantity, 1);
        assert_eq!(order.payment_method, PaymentMethod::Cod);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total_price, "200");
    }

    #[test]
    fn upi_orders_wait_for_verification() {
        let order = body(serde_json::json!({ "paymentMethod": "UPI", "quantity": "2" }))
            .validate()
            .unwrap();
        assert_eq!(order.quantity, 2);
        assert_eq!(order.status(), OrderStatus::PaymentPendingVerification);
    }

    #[test]
    fn rejects_bad_snapshot_fields() {
        assert!(body(serde_json::json!({ "customerPhone": " " })).validate().is_err());
        assert!(body(serde_json::json!({ "quantity": 0 })).validate().is_err());
        assert!(body(serde_json::json!({ "productId": -2 })).validate().is_err());
        assert!(body(serde_json::json!({ "paymentMethod": "card" })).validate().is_err());
    }

    #[test]
    fn status_update_uses_closed_vocabulary() {
        let ok = UpdateOrderStatusRequest { status: "completed".into() };
        assert_eq!(ok.validate().unwrap(), OrderStatus::Delivered);
        let bad = UpdateOrderStatusRequest { status: "lost".into() };
        assert!(bad.validate().is_err());
    }
}
