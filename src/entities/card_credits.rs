use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 报销额度的重置周期
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum CreditFrequency {
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    #[sea_orm(string_value = "semiannual")]
    Semiannual,
    #[sea_orm(string_value = "annual")]
    Annual,
}

impl std::fmt::Display for CreditFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreditFrequency::Monthly => write!(f, "monthly"),
            CreditFrequency::Quarterly => write!(f, "quarterly"),
            CreditFrequency::Semiannual => write!(f, "semiannual"),
            CreditFrequency::Annual => write!(f, "annual"),
        }
    }
}

/// 卡片周期性报销额度 (statement credit / benefit)
/// - amount_cents: 每个周期的额度
/// - used_cents: 当前周期已使用, 0 <= used_cents <= amount_cents
/// - period_start: 当前周期起始日, 周期滚动时重置 used_cents
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "card_credits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub card_id: i64,
    pub user_id: i64,
    pub name: String,
    pub amount_cents: i64,
    pub frequency: CreditFrequency,
    pub used_cents: i64,
    pub period_start: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// 当前周期剩余额度
    pub fn remaining_cents(&self) -> i64 {
        (self.amount_cents - self.used_cents).max(0)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
