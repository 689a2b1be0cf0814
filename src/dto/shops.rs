use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{opt_string_or_number, optional_text, required_text};
use crate::{
    error::{AppError, AppResult},
    middleware::extract::parse_id,
    models::{Shop, User},
};

const DEFAULT_SHOP_NAME: &str = "My Shop";
const DEFAULT_SHOP_CATEGORY: &str = "General";

/// Shop details as the partner dashboard and the admin panel send them.
/// Several aliases exist for the same field because older clients used them.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopRequest {
    pub name: Option<String>,
    pub shop_name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub shop_address: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub mobile_number: Option<String>,
    pub contact_number: Option<String>,
    pub image: Option<String>,
    /// Only honoured on the admin endpoint.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[schema(value_type = Option<i32>)]
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewShop {
    pub owner_id: Option<i32>,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: String,
    pub mobile: String,
    pub contact_number: Option<String>,
    pub image: Option<String>,
}

impl ShopRequest {
    /// `strict` requires an explicit name, as the admin form does. The
    /// partner flow falls back to a placeholder the seller edits later.
    pub fn validate(self, strict: bool) -> AppResult<NewShop> {
        let name = optional_text(self.name).or_else(|| optional_text(self.shop_name));
        let name = if strict {
            required_text("name", name)?
        } else {
            name.unwrap_or_else(|| DEFAULT_SHOP_NAME.to_string())
        };

        let contact_number = optional_text(self.contact_number);
        let mobile = optional_text(self.mobile)
            .or_else(|| optional_text(self.mobile_number))
            .or_else(|| optional_text(self.phone.clone()))
            .or_else(|| contact_number.clone())
            .ok_or_else(|| AppError::BadRequest("mobile is required".into()))?;
        let phone = optional_text(self.phone).unwrap_or_else(|| mobile.clone());

        let owner_id = match optional_text(self.owner_id) {
            Some(raw) => Some(
                parse_id(&raw)
                    .map_err(|_| AppError::BadRequest("ownerId must be a positive integer".into()))?,
            ),
            None => None,
        };

        Ok(NewShop {
            owner_id,
            name,
            category: optional_text(self.category)
                .unwrap_or_else(|| DEFAULT_SHOP_CATEGORY.to_string()),
            description: optional_text(self.description),
            address: optional_text(self.address).or_else(|| optional_text(self.shop_address)),
            phone,
            mobile,
            contact_number,
            image: optional_text(self.image),
        })
    }
}

/// Body of `PATCH /user/profile`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub shop_name: Option<String>,
    pub shop_address: Option<String>,
    pub maps_link: Option<String>,
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub shop_name: Option<String>,
    pub shop_address: Option<String>,
    pub maps_link: Option<String>,
    pub contact_number: Option<String>,
}

impl ProfileUpdateRequest {
    pub fn validate(self) -> AppResult<ProfileUpdate> {
        let update = ProfileUpdate {
            shop_name: optional_text(self.shop_name),
            shop_address: optional_text(self.shop_address),
            maps_link: optional_text(self.maps_link),
            contact_number: optional_text(self.contact_number),
        };
        if update.shop_name.is_none()
            && update.shop_address.is_none()
            && update.maps_link.is_none()
            && update.contact_number.is_none()
        {
            return Err(AppError::BadRequest("Nothing to update".into()));
        }
        Ok(update)
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ShopList {
    #[schema(value_type = Vec<Shop>)]
    pub items: Vec<Shop>,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: User,
    pub shop: Option<Shop>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partner_shop_falls_back_to_placeholders() {
        let shop = ShopRequest {
            mobile_number: Some("9876543210".into()),
            shop_address: Some("Main Road".into()),
            ..Default::default()
        }
        .validate(false)
        .unwrap();
        assert_eq!(shop.name, DEFAULT_SHOP_NAME);
        assert_eq!(shop.mobile, "9876543210");
        assert_eq!(shop.phone, "9876543210");
        assert_eq!(shop.address.as_deref(), Some("Main Road"));
    }

    #[test]
    fn admin_shop_needs_a_name_and_contact() {
        let no_name = ShopRequest {
            mobile: Some("1".into()),
            ..Default::default()
        };
        assert!(no_name.validate(true).is_err());

        let no_contact = ShopRequest {
            name: Some("Sharma Kirana".into()),
            ..Default::default()
        };
        assert!(no_contact.validate(true).is_err());
    }

    #[test]
    fn empty_profile_update_is_rejected() {
        assert!(ProfileUpdateRequest::default().validate().is_err());
        let ok = ProfileUpdateRequest {
            shop_name: Some(" Gupta Stores ".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(ok.shop_name.as_deref(), Some("Gupta Stores"));
    }
}
