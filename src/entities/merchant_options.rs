use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 商家报价
/// net_price_cents 为叠加优惠后的到手价, 每次写入 stack 时重新计算
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "merchant_options")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub product_option_id: i64,
    pub merchant: String,
    pub price_cents: i64,
    pub net_price_cents: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
