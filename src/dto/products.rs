use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{opt_string_or_number, optional_text, required_text, validate_price};
use crate::{
    error::{AppError, AppResult},
    models::{CatalogEntry, ProductStatus},
    moderation::Transition,
};

pub const DEFAULT_CATEGORY: &str = "General";

/// Body of `POST /products`. Any `approved`/`status` the client sends is
/// not part of this shape and is dropped during parsing.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[schema(value_type = Option<String>, example = "17999")]
    pub price: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub images: Option<Vec<String>>,
    /// Admins may file a product under any shop; sellers always use their own.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[schema(value_type = Option<i32>)]
    pub shop_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: String,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub shop_id: Option<i32>,
}

impl CreateProductRequest {
    pub fn validate(self) -> AppResult<NewProduct> {
        let name = required_text("name", self.name)?;
        let price = required_text("price", self.price)?;
        let price = validate_price("price", &price)?;
        let shop_id = match optional_text(self.shop_id) {
            Some(raw) => Some(crate::middleware::extract::parse_id(&raw).map_err(|_| {
                AppError::BadRequest("shopId must be a positive integer".into())
            })?),
            None => None,
        };
        let images: Vec<String> = self
            .images
            .unwrap_or_default()
            .into_iter()
            .filter_map(|url| optional_text(Some(url)))
            .collect();
        let image_url = optional_text(self.image_url).or_else(|| images.first().cloned());

        Ok(NewProduct {
            name,
            price,
            category: optional_text(self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            description: optional_text(self.description),
            image_url,
            images,
            shop_id,
        })
    }
}

/// Body of `PATCH /products/:id`, JSON or multipart.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[schema(value_type = Option<String>)]
    pub price: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Legacy lifecycle field: `deleted`, `out_of_stock` or `available`.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductEdit {
    pub name: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub transition: Option<Transition>,
}

impl ProductEdit {
    pub fn has_field_changes(&self) -> bool {
        self.name.is_some()
            || self.price.is_some()
            || self.category.is_some()
            || self.description.is_some()
            || self.image_url.is_some()
    }
}

impl UpdateProductRequest {
    pub fn validate(self) -> AppResult<ProductEdit> {
        let price = match optional_text(self.price) {
            Some(raw) => Some(validate_price("price", &raw)?),
            None => None,
        };
        let transition = match optional_text(self.status) {
            Some(raw) => {
                let status = ProductStatus::parse(&raw)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown status '{raw}'")))?;
                Some(Transition::from_requested_status(status).ok_or_else(|| {
                    AppError::BadRequest("status cannot be set back to pending".into())
                })?)
            }
            None => None,
        };

        Ok(ProductEdit {
            name: optional_text(self.name),
            price,
            category: optional_text(self.category),
            description: optional_text(self.description),
            image_url: optional_text(self.image_url),
            transition,
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<CatalogEntry>)]
    pub items: Vec<CatalogEntry>,
}
