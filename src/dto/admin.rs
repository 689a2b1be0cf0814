use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub users: i64,
    pub shops: i64,
    pub products: i64,
    pub pending_products: i64,
    pub orders: i64,
    pub pending_reviews: i64,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupSummary {
    pub cart_items: u64,
    pub reviews: u64,
    pub products: u64,
    pub shops: u64,
    pub users: u64,
}
