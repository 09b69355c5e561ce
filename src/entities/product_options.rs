use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 计划下的候选商品
/// - list_price_cents: 标价, 没有任何商家报价时作为兜底价格
/// - specs: JSON object 文本 (规格参数)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "product_options")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub plan_id: i64,
    pub name: String,
    pub list_price_cents: i64,
    #[sea_orm(column_type = "Text")]
    pub specs: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
