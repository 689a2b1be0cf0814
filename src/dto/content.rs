//! Admin-managed storefront content: categories, ticker offers, banners.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{optional_text, parse_flag, required_text};
use crate::{
    error::AppResult,
    models::{Banner, Category, Offer},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryFields {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

impl CategoryRequest {
    pub fn validate_new(self) -> AppResult<CategoryFields> {
        Ok(CategoryFields {
            name: Some(required_text("name", self.name)?),
            image_url: optional_text(self.image_url),
        })
    }

    pub fn validate_patch(self) -> CategoryFields {
        CategoryFields {
            name: optional_text(self.name),
            image_url: optional_text(self.image_url),
        }
    }
}

/// Flags come in as JSON booleans or, from forms, as text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

impl FlagValue {
    fn resolve(self, field: &str) -> AppResult<Option<bool>> {
        match self {
            FlagValue::Bool(b) => Ok(Some(b)),
            FlagValue::Text(raw) => parse_flag(field, Some(&raw)),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
    pub content: Option<String>,
    #[schema(value_type = Option<bool>)]
    pub is_active: Option<FlagValue>,
}

#[derive(Debug, Clone, Default)]
pub struct OfferFields {
    pub content: Option<String>,
    pub is_active: Option<bool>,
}

impl OfferRequest {
    pub fn validate_new(self) -> AppResult<OfferFields> {
        let is_active = match self.is_active {
            Some(flag) => flag.resolve("isActive")?,
            None => None,
        };
        Ok(OfferFields {
            content: Some(required_text("content", self.content)?),
            is_active: Some(is_active.unwrap_or(true)),
        })
    }

    pub fn validate_patch(self) -> AppResult<OfferFields> {
        let is_active = match self.is_active {
            Some(flag) => flag.resolve("isActive")?,
            None => None,
        };
        Ok(OfferFields {
            content: optional_text(self.content),
            is_active,
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BannerRequest {
    pub image: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BannerFields {
    pub image: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
}

impl BannerRequest {
    /// The image may instead arrive as an uploaded file; the service
    /// checks that one of the two is present.
    pub fn validate(self) -> BannerFields {
        BannerFields {
            image: optional_text(self.image),
            title: optional_text(self.title),
            link: optional_text(self.link),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct OfferList {
    #[schema(value_type = Vec<Offer>)]
    pub items: Vec<Offer>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct BannerList {
    #[schema(value_type = Vec<Banner>)]
    pub items: Vec<Banner>,
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_flag_accepts_form_text() {
        let req: OfferRequest =
            serde_json::from_value(serde_json::json!({ "content": "Diwali sale", "isActive": "FALSE" }))
                .unwrap();
        let fields = req.validate_new().unwrap();
        assert_eq!(fields.is_active, Some(false));
    }

    #[test]
    fn new_offer_is_active_by_default() {
        let req: OfferRequest =
            serde_json::from_value(serde_json::json!({ "content": "Free delivery" })).unwrap();
        assert_eq!(req.validate_new().unwrap().is_active, Some(true));
    }

    #[test]
    fn category_needs_a_name() {
        assert!(CategoryRequest::default().validate_new().is_err());
        let patch = CategoryRequest {
            image_url: Some("/uploads/x.png".into()),
            ..Default::default()
        }
        .validate_patch();
        assert!(patch.name.is_none());
    }
}
