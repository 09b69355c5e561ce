use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

/// 信用卡
/// - annual_fee_cents: 年费(美分)
/// - base_reward_bp: 基础返现比例 (basis points) 1% = 100bp
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "credit_cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub issuer: String,
    pub name: String,
    pub last_four: Option<String>,
    pub network: Option<String>,
    pub annual_fee_cents: i64,
    pub base_reward_bp: i32,
    pub opened_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
