use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::opt_string_or_number;
use crate::{
    error::{AppError, AppResult},
    middleware::extract::parse_id,
    models::CatalogEntry,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[schema(value_type = i32)]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[schema(value_type = Option<i32>)]
    pub quantity: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct CartAdd {
    pub product_id: i32,
    pub quantity: i32,
}

impl AddToCartRequest {
    pub fn validate(self) -> AppResult<CartAdd> {
        let product_id = self
            .product_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("productId is required".into()))
            .and_then(|raw| {
                parse_id(raw)
                    .map_err(|_| AppError::BadRequest("productId must be a positive integer".into()))
            })?;
        let quantity = match self.quantity.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw
                .parse::<i32>()
                .ok()
                .filter(|q| (1..=99).contains(q))
                .ok_or_else(|| AppError::BadRequest("quantity must be between 1 and 99".into()))?,
            _ => 1,
        };
        Ok(CartAdd {
            product_id,
            quantity,
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: i32,
    pub quantity: i32,
    pub product: CatalogEntry,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CartList {
    #[schema(value_type = Vec<CartLine>)]
    pub items: Vec<CartLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_defaults_to_one() {
        let req: AddToCartRequest =
            serde_json::from_value(serde_json::json!({ "productId": 9 })).unwrap();
        let add = req.validate().unwrap();
        assert_eq!((add.product_id, add.quantity), (9, 1));
    }

    #[test]
    fn rejects_missing_product_and_silly_quantities() {
        let missing: AddToCartRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(missing.validate().is_err());
        let huge: AddToCartRequest =
            serde_json::from_value(serde_json::json!({ "productId": 9, "quantity": 1000 })).unwrap();
        assert!(huge.validate().is_err());
    }
}
