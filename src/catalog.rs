//! Catalog filter engine.
//!
//! Decides which products (and shops) a given audience sees. Everything here
//! is pure: callers load rows in creation order (`created_at ASC, id ASC`)
//! and this module only removes rows, so the input order is preserved and
//! pagination over the result is stable.
//!
//! Two visibility axes are combined in exactly one place, [`is_visible`]:
//! the global moderation flag (`approved`) and the per-product deletion
//! marker (`status = deleted`). A product that is approved but still
//! `pending` is visible to customers; the approved flag is authoritative for
//! customer visibility and status only matters for deletion.

use crate::models::{CatalogEntry, ProductStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Audience {
    /// Storefront view: approved and not deleted, whatever the filters say.
    #[default]
    Customer,
    /// Admin or owning seller: filters apply exactly as given.
    Admin,
}

impl Audience {
    pub fn from_include_all(include_all: bool) -> Self {
        if include_all {
            Audience::Admin
        } else {
            Audience::Customer
        }
    }
}

pub fn is_visible(approved: bool, status: ProductStatus, audience: Audience) -> bool {
    match audience {
        Audience::Admin => true,
        Audience::Customer => approved && status != ProductStatus::Deleted,
    }
}

/// Shops go live at creation; the flag still hides a shop an admin pulled.
pub fn shop_is_visible(approved: bool, audience: Audience) -> bool {
    match audience {
        Audience::Admin => true,
        Audience::Customer => approved,
    }
}

/// Whitespace-only search terms are the same as no search.
pub fn normalize_search(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

pub fn normalize_category(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub shop_id: Option<i32>,
    search: Option<String>,
    category: Option<String>,
    pub approved: Option<bool>,
    pub status: Option<ProductStatus>,
    pub audience: Audience,
}

impl CatalogQuery {
    pub fn new(audience: Audience) -> Self {
        Self {
            audience,
            ..Self::default()
        }
    }

    pub fn shop(mut self, shop_id: i32) -> Self {
        self.shop_id = Some(shop_id);
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = normalize_search(Some(term));
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        let normalized = normalize_category(category);
        self.category = (!normalized.is_empty()).then_some(normalized);
        self
    }

    pub fn approved(mut self, approved: bool) -> Self {
        self.approved = Some(approved);
        self
    }

    pub fn status(mut self, status: ProductStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn category_key(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Customers always get `approved = true`; admins get their own filter.
    pub fn effective_approved(&self) -> Option<bool> {
        match self.audience {
            Audience::Admin => self.approved,
            Audience::Customer => Some(true),
        }
    }

    /// Apply the query to rows already in canonical order.
    ///
    /// `known_categories` are the managed category names. A requested
    /// category that matches neither a managed name nor any row is unknown
    /// and does not filter.
    pub fn apply(&self, rows: Vec<CatalogEntry>, known_categories: &[String]) -> Vec<CatalogEntry> {
        let category = self.category.as_deref().filter(|wanted| {
            known_categories
                .iter()
                .any(|known| normalize_category(known) == *wanted)
                || rows
                    .iter()
                    .any(|row| normalize_category(&row.product.category) == *wanted)
        });

        rows.into_iter()
            .filter(|row| self.matches(row, category))
            .collect()
    }

    fn matches(&self, row: &CatalogEntry, category: Option<&str>) -> bool {
        let product = &row.product;

        // Cheap exact matches first.
        if self.shop_id.is_some_and(|id| product.shop_id != id) {
            return false;
        }
        if self.status.is_some_and(|status| product.status != status) {
            return false;
        }
        if category.is_some_and(|wanted| normalize_category(&product.category) != wanted) {
            return false;
        }

        if self
            .effective_approved()
            .is_some_and(|approved| product.approved != approved)
        {
            return false;
        }
        if !is_visible(product.approved, product.status, self.audience) {
            return false;
        }

        match self.search.as_deref() {
            Some(term) => search_matches(row, term),
            None => true,
        }
    }
}

fn search_matches(row: &CatalogEntry, term: &str) -> bool {
    let product = &row.product;
    let fields = [
        Some(product.name.as_str()),
        Some(product.category.as_str()),
        product.description.as_deref(),
        row.shop_name.as_deref(),
    ];
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(term))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::Product;

    fn entry(id: i32, name: &str, category: &str, approved: bool, status: ProductStatus) -> CatalogEntry {
        CatalogEntry {
            product: Product {
                id,
                shop_id: 1,
                seller_id: 7,
                name: name.to_string(),
                price: "100".to_string(),
                image_url: None,
                images: Vec::new(),
                category: category.to_string(),
                description: Some(format!("{name} from the bazaar")),
                approved,
                status,
                created_at: Utc.timestamp_opt(1_700_000_000 + id as i64, 0).unwrap(),
            },
            shop_name: Some("Style Hub".to_string()),
            shop_address: None,
            contact_number: None,
            mobile: None,
        }
    }

    fn ids(rows: &[CatalogEntry]) -> Vec<i32> {
        rows.iter().map(|r| r.product.id).collect()
    }

    fn sample() -> Vec<CatalogEntry> {
        vec![
            entry(1, "Test", "General", false, ProductStatus::Pending),
            entry(2, "Earbuds", "Electronics", true, ProductStatus::Approved),
            entry(3, "Kurti", "Fashion", true, ProductStatus::OutOfStock),
            entry(4, "Old Phone", "Electronics", true, ProductStatus::Deleted),
            entry(5, "Rice", "Grocery", true, ProductStatus::Pending),
        ]
    }

    #[test]
    fn customer_sees_only_approved_and_not_deleted() {
        let rows = CatalogQuery::new(Audience::Customer).apply(sample(), &[]);
        assert_eq!(ids(&rows), vec![2, 3, 5]);
    }

    #[test]
    fn approved_flag_wins_over_pending_status_for_customers() {
        let rows = CatalogQuery::new(Audience::Customer)
            .status(ProductStatus::Pending)
            .apply(sample(), &[]);
        assert_eq!(ids(&rows), vec![5]);
    }

    #[test]
    fn customer_cannot_lift_the_gate_with_filters() {
        let rows = CatalogQuery::new(Audience::Customer)
            .approved(false)
            .apply(sample(), &[]);
        assert_eq!(ids(&rows), vec![2, 3, 5]);

        let deleted = CatalogQuery::new(Audience::Customer)
            .status(ProductStatus::Deleted)
            .apply(sample(), &[]);
        assert!(deleted.is_empty());
    }

    #[test]
    fn admin_filters_apply_as_given() {
        let all = CatalogQuery::new(Audience::Admin).apply(sample(), &[]);
        assert_eq!(ids(&all), vec![1, 2, 3, 4, 5]);

        let pending = CatalogQuery::new(Audience::Admin)
            .status(ProductStatus::Pending)
            .apply(sample(), &[]);
        assert_eq!(ids(&pending), vec![1, 5]);

        let deleted = CatalogQuery::new(Audience::Admin)
            .status(ProductStatus::Deleted)
            .apply(sample(), &[]);
        assert_eq!(ids(&deleted), vec![4]);

        let unapproved = CatalogQuery::new(Audience::Admin)
            .approved(false)
            .apply(sample(), &[]);
        assert_eq!(ids(&unapproved), vec![1]);
    }

    #[test]
    fn category_ignores_case_and_whitespace() {
        for raw in ["Electronics ", "electronics", " ELECTRONICS"] {
            let rows = CatalogQuery::new(Audience::Customer)
                .category(raw)
                .apply(sample(), &[]);
            assert_eq!(ids(&rows), vec![2], "category {raw:?}");
        }
    }

    #[test]
    fn empty_or_unknown_category_does_not_filter() {
        let blank = CatalogQuery::new(Audience::Customer)
            .category("   ")
            .apply(sample(), &[]);
        assert_eq!(ids(&blank), vec![2, 3, 5]);

        let unknown = CatalogQuery::new(Audience::Customer)
            .category("Toys")
            .apply(sample(), &[]);
        assert_eq!(ids(&unknown), vec![2, 3, 5]);
    }

    #[test]
    fn managed_category_without_products_filters_to_empty() {
        let rows = CatalogQuery::new(Audience::Customer)
            .category("toys")
            .apply(sample(), &["Toys".to_string()]);
        assert!(rows.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let by_name = CatalogQuery::new(Audience::Customer)
            .search("EARB")
            .apply(sample(), &[]);
        assert_eq!(ids(&by_name), vec![2]);

        let by_category = CatalogQuery::new(Audience::Customer)
            .search("grocer")
            .apply(sample(), &[]);
        assert_eq!(ids(&by_category), vec![5]);

        let by_description = CatalogQuery::new(Audience::Customer)
            .search("from the BAZAAR")
            .apply(sample(), &[]);
        assert_eq!(ids(&by_description), vec![2, 3, 5]);

        let by_shop = CatalogQuery::new(Audience::Customer)
            .search("style hub")
            .apply(sample(), &[]);
        assert_eq!(ids(&by_shop), vec![2, 3, 5]);
    }

    #[test]
    fn whitespace_search_is_no_search() {
        let plain = CatalogQuery::new(Audience::Customer).apply(sample(), &[]);
        let blank = CatalogQuery::new(Audience::Customer)
            .search("  \t ")
            .apply(sample(), &[]);
        assert_eq!(ids(&plain), ids(&blank));
        assert_eq!(normalize_search(Some("   ")), None);
    }

    #[test]
    fn shop_listing_drops_deleted_unless_admin() {
        let mut rows = sample();
        rows.push({
            let mut other = entry(6, "Other", "General", true, ProductStatus::Approved);
            other.product.shop_id = 2;
            other
        });

        let customer = CatalogQuery::new(Audience::Customer).shop(1).apply(rows.clone(), &[]);
        assert_eq!(ids(&customer), vec![2, 3, 5]);

        let admin = CatalogQuery::new(Audience::Admin).shop(1).apply(rows, &[]);
        assert_eq!(ids(&admin), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn visibility_table() {
        use ProductStatus::*;
        assert!(is_visible(true, Approved, Audience::Customer));
        assert!(is_visible(true, OutOfStock, Audience::Customer));
        assert!(is_visible(true, Pending, Audience::Customer));
        assert!(!is_visible(true, Deleted, Audience::Customer));
        assert!(!is_visible(false, Approved, Audience::Customer));
        assert!(is_visible(false, Deleted, Audience::Admin));
    }

    #[test]
    fn shop_visibility() {
        assert!(shop_is_visible(true, Audience::Customer));
        assert!(!shop_is_visible(false, Audience::Customer));
        assert!(shop_is_visible(false, Audience::Admin));
    }
}
