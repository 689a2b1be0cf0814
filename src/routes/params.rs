//! Query-string shapes. Everything arrives as text and is parsed here, so a
//! malformed value is a 400 rather than being silently ignored.
//!
//! Pagination fields sit directly on each struct: `serde(flatten)` does not
//! mix with numeric fields under `serde_urlencoded`.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    catalog::{Audience, CatalogQuery},
    dto::{optional_text, parse_flag},
    error::{AppError, AppResult},
    middleware::extract::parse_id,
    models::{OrderStatus, ProductStatus},
    response::Meta,
};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    /// `(page, per_page, offset)`, or `None` when the caller wants the
    /// whole listing.
    pub fn requested(&self) -> Option<(i64, i64, i64)> {
        if self.page.is_none() && self.per_page.is_none() {
            return None;
        }
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        Some((page, per_page, (page - 1) * per_page))
    }

    /// Cut one page out of an already ordered listing.
    pub fn slice<T>(&self, items: Vec<T>) -> (Vec<T>, Meta) {
        let total = items.len() as i64;
        match self.requested() {
            None => (items, Meta::total(total)),
            Some((page, per_page, offset)) => {
                let items = items
                    .into_iter()
                    .skip(offset as usize)
                    .take(per_page as usize)
                    .collect();
                (items, Meta::new(page, per_page, total))
            }
        }
    }
}

fn optional_id(field: &str, raw: Option<String>) -> AppResult<Option<i32>> {
    match optional_text(raw) {
        Some(raw) => parse_id(&raw)
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{field} must be a positive integer"))),
        None => Ok(None),
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CatalogParams {
    /// Restrict to one shop.
    pub shop_id: Option<String>,
    /// Case-insensitive substring over name, category, description and shop name.
    pub search: Option<String>,
    /// Case- and whitespace-insensitive category name.
    pub category: Option<String>,
    /// `true`/`false`; only honoured together with `includeAll`.
    pub approved: Option<String>,
    /// `pending`, `approved`, `out_of_stock` or `deleted`.
    pub status: Option<String>,
    /// Admin view (or the owner's view of their own shop).
    pub include_all: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogRequest {
    pub include_all: bool,
    pub shop_id: Option<i32>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub approved: Option<bool>,
    pub status: Option<ProductStatus>,
    pub pagination: Pagination,
}

impl CatalogParams {
    pub fn validate(self) -> AppResult<CatalogRequest> {
        let status = match optional_text(self.status) {
            Some(raw) => Some(
                ProductStatus::parse(&raw)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown status '{raw}'")))?,
            ),
            None => None,
        };
        Ok(CatalogRequest {
            include_all: parse_flag("includeAll", self.include_all.as_deref())?.unwrap_or(false),
            shop_id: optional_id("shopId", self.shop_id)?,
            search: self.search,
            category: self.category,
            approved: parse_flag("approved", self.approved.as_deref())?,
            status,
            pagination: Pagination::new(self.page, self.per_page),
        })
    }
}

impl CatalogRequest {
    pub fn query(&self, audience: Audience) -> CatalogQuery {
        let mut query = CatalogQuery::new(audience);
        if let Some(shop_id) = self.shop_id {
            query = query.shop(shop_id);
        }
        if let Some(search) = self.search.as_deref() {
            query = query.search(search);
        }
        if let Some(category) = self.category.as_deref() {
            query = query.category(category);
        }
        if let Some(approved) = self.approved {
            query = query.approved(approved);
        }
        if let Some(status) = self.status {
            query = query.status(status);
        }
        query
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct OrderListParams {
    /// Customer phone; required unless `shopId` or `includeAll` is given.
    pub phone: Option<String>,
    pub shop_id: Option<String>,
    pub include_all: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Which orders a listing is scoped to. Exactly one scope applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderScope {
    All,
    Shop(i32),
    Phone(String),
}

#[derive(Debug, Clone)]
pub struct OrderListRequest {
    pub scope: OrderScope,
    pub status: Option<OrderStatus>,
    pub pagination: Pagination,
}

impl OrderListParams {
    pub fn validate(self) -> AppResult<OrderListRequest> {
        let include_all = parse_flag("includeAll", self.include_all.as_deref())?.unwrap_or(false);
        let shop_id = optional_id("shopId", self.shop_id)?;
        let scope = match (include_all, shop_id, optional_text(self.phone)) {
            (true, _, _) => OrderScope::All,
            (false, Some(shop_id), _) => OrderScope::Shop(shop_id),
            (false, None, Some(phone)) => OrderScope::Phone(phone),
            (false, None, None) => {
                return Err(AppError::BadRequest("phone is required".into()));
            }
        };
        let status = match optional_text(self.status) {
            Some(raw) => Some(
                OrderStatus::parse(&raw)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown order status '{raw}'")))?,
            ),
            None => None,
        };
        Ok(OrderListRequest {
            scope,
            status,
            pagination: Pagination::new(self.page, self.per_page),
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct IncludeAllParams {
    pub include_all: Option<String>,
}

impl IncludeAllParams {
    pub fn include_all(&self) -> AppResult<bool> {
        Ok(parse_flag("includeAll", self.include_all.as_deref())?.unwrap_or(false))
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OfferParams {
    /// `true` returns only offers shown in the ticker.
    pub active: Option<String>,
}

impl OfferParams {
    pub fn active_only(&self) -> AppResult<bool> {
        Ok(parse_flag("active", self.active.as_deref())?.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_opt_in_and_clamped() {
        assert_eq!(Pagination::default().requested(), None);
        assert_eq!(Pagination::new(Some(0), None).requested(), Some((1, 20, 0)));
        assert_eq!(Pagination::new(Some(3), Some(500)).requested(), Some((3, 100, 200)));

        let (items, meta) = Pagination::new(Some(2), Some(2)).slice(vec![1, 2, 3, 4, 5]);
        assert_eq!(items, vec![3, 4]);
        assert_eq!(meta.total, Some(5));

        let (all, meta) = Pagination::default().slice(vec![1, 2, 3]);
        assert_eq!(all.len(), 3);
        assert_eq!(meta.page, None);
        assert_eq!(meta.total, Some(3));
    }

    #[test]
    fn catalog_params_parse_or_reject() {
        let ok = CatalogParams {
            shop_id: Some("4".into()),
            include_all: Some("TRUE".into()),
            status: Some("available".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert!(ok.include_all);
        assert_eq!(ok.shop_id, Some(4));
        assert_eq!(ok.status, Some(ProductStatus::Approved));

        let blank_shop = CatalogParams {
            shop_id: Some("".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(blank_shop.shop_id, None);

        for bad in [
            CatalogParams { shop_id: Some("abc".into()), ..Default::default() },
            CatalogParams { status: Some("archived".into()), ..Default::default() },
            CatalogParams { approved: Some("maybe".into()), ..Default::default() },
        ] {
            assert!(bad.validate().is_err());
        }
    }

    #[test]
    fn order_listing_needs_a_scope() {
        assert!(OrderListParams::default().validate().is_err());

        let by_phone = OrderListParams {
            phone: Some(" 9000000001 ".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(by_phone.scope, OrderScope::Phone("9000000001".into()));

        let all = OrderListParams {
            include_all: Some("true".into()),
            phone: Some("1".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(all.scope, OrderScope::All);
    }
}
