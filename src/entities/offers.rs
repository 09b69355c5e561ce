use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

/// 限时优惠, 生效区间为 [starts_on, ends_on] (含两端)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub card_id: Option<i64>,
    pub merchant: String,
    pub title: String,
    pub value_cents: i64,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
