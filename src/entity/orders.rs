use sea_orm::entity::prelude::*;

/// Orders reference products and shops loosely: no foreign key, so an
/// order outlives edits and soft-deletes of what it points at.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_id: i32,
    pub shop_id: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub quantity: i32,
    pub total_price: String,
    pub status: String,
    pub payment_method: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
